use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// Name
// ────────────────────────────────────────────────────────────────────────────

/// Display name of an [`Entity`].
///
/// A name is either read from the element's own `entityName` attribute, or
/// composed once from a resolved `href`. Keeping the origin in the variant
/// means "has own name" cannot drift from the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Name {
    /// Taken from the element's `entityName` attribute.
    Own(String),
    /// Composed from a cross-file reference after the element was read.
    Resolved(String),
    #[default]
    Absent,
}

impl Name {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Name::Own(s) | Name::Resolved(s) => Some(s),
            Name::Absent => None,
        }
    }

    pub fn is_own(&self) -> bool {
        matches!(self, Name::Own(_))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entity
// ────────────────────────────────────────────────────────────────────────────

/// One element of a model view.
///
/// Every element becomes an entity, but only those carrying an `id` can be
/// the target of an href or part of an affected-entity selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    id: Option<String>,
    /// File name of the model view this entity was read from.
    view: String,
    /// Local XML tag name, e.g. `components__Repository`.
    element_name: String,
    name: Name,
    /// Value of the `xsi:type` attribute.
    #[serde(rename = "type")]
    entity_type: Option<String>,
}

impl Entity {
    pub fn new(
        view: impl Into<String>,
        element_name: impl Into<String>,
        id: Option<String>,
        own_name: Option<String>,
        entity_type: Option<String>,
    ) -> Self {
        Self {
            id,
            view: view.into(),
            element_name: element_name.into(),
            name: own_name.map_or(Name::Absent, Name::Own),
            entity_type,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn name_source(&self) -> &Name {
        &self.name
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn has_own_name(&self) -> bool {
        self.name.is_own()
    }

    /// Assign a name composed from a resolved reference. Only an absent name
    /// can be replaced; returns whether the assignment happened.
    pub(crate) fn resolve_name(&mut self, name: String) -> bool {
        if self.name != Name::Absent {
            return false;
        }
        self.name = Name::Resolved(name);
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tree
// ────────────────────────────────────────────────────────────────────────────

/// Index of a node inside its [`ModelTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree node. Children are owned by index; `parent` is a plain back-link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    entity: Entity,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(entity: Entity, parent: Option<NodeId>) -> Self {
        Self {
            entity,
            parent,
            children: Vec::new(),
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// The parsed tree of one model view.
///
/// Nodes are stored in pre-order over the sorted children, so the root is
/// always the first node and iterating `nodes` is a depth-first walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTree {
    view: String,
    nodes: Vec<Node>,
}

impl ModelTree {
    /// Build a compact tree from a builder arena, keeping only the nodes
    /// reachable from `root`.
    pub(crate) fn from_arena(view: String, arena: Vec<Node>, root: NodeId) -> Self {
        let mut slots: Vec<Option<Node>> = arena.into_iter().map(Some).collect();
        let mut nodes: Vec<Node> = Vec::with_capacity(slots.len());
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(root, None)];
        while let Some((old_id, new_parent)) = stack.pop() {
            let Some(mut node) = slots.get_mut(old_id.0).and_then(Option::take) else {
                continue;
            };
            let new_id = NodeId(nodes.len());
            if let Some(parent) = new_parent {
                nodes[parent.0].children.push(new_id);
            }
            let old_children = std::mem::take(&mut node.children);
            node.parent = new_parent;
            nodes.push(node);
            for child in old_children.into_iter().rev() {
                stack.push((child, Some(new_id)));
            }
        }
        Self { view, nodes }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Entity of a node, or `None` if `id` is not a node of this tree.
    pub fn entity(&self, id: NodeId) -> Option<&Entity> {
        self.get(id).map(Node::entity)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Number of ancestors between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Depth-first walk: a node first, then its children in sorted order.
    pub fn preorder(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First node in pre-order whose entity carries `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.entity.id() == Some(id))
            .map(NodeId)
    }

    /// Entities that can be referenced or selected, i.e. those with an id.
    pub fn referenceable(&self) -> impl Iterator<Item = &Entity> {
        self.nodes
            .iter()
            .map(Node::entity)
            .filter(|e| e.id().is_some())
    }

    /// Nested, serializable copy of the tree.
    pub fn to_nested(&self) -> EntityNode {
        self.nested_from(self.root())
    }

    fn nested_from(&self, id: NodeId) -> EntityNode {
        EntityNode {
            entity: self.nodes[id.0].entity.clone(),
            children: self
                .children(id)
                .iter()
                .map(|&child| self.nested_from(child))
                .collect(),
        }
    }
}

/// Owned nested form of a [`ModelTree`], used for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityNode {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityNode>,
}
