//! Streaming tree construction for one model view.

use super::events::{XSI_NAMESPACE, XmlAttribute, XmlEvent};
use crate::model::{Entity, ModelTree, Node, NodeId};
use crate::ordering::compare_entities;
use anyhow::Result;
use tracing::warn;

/// Turns an href into a display name while a view is being built.
///
/// Implementations may parse other views to answer; they must not touch the
/// state of the build that called them.
pub trait HrefResolver {
    /// Name for the referring entity, composed from its current name and the
    /// referenced entity. `None` leaves the referrer unchanged.
    fn resolve_href(&mut self, href: &str, current_name: Option<&str>) -> Option<String>;
}

/// Resolver that never resolves anything.
pub struct NoResolver;

impl HrefResolver for NoResolver {
    fn resolve_href(&mut self, _href: &str, _current_name: Option<&str>) -> Option<String> {
        None
    }
}

/// Build the entity tree of `view` from a stream of element events.
///
/// Stream errors end the build early; whatever was read so far is kept and
/// the still-open elements are closed as if their end tags had been seen.
/// Returns `None` when no element was read.
pub fn build_tree<I, R>(view: &str, events: I, resolver: &mut R) -> Option<ModelTree>
where
    I: IntoIterator<Item = Result<XmlEvent>>,
    R: HrefResolver + ?Sized,
{
    let mut arena: Vec<Node> = Vec::new();
    let mut open: Option<NodeId> = None;
    let mut root: Option<NodeId> = None;

    for event in events {
        match event {
            Ok(XmlEvent::Start {
                local_name,
                attributes,
                xsi_namespace,
            }) => {
                let entity = read_entity(
                    view,
                    &local_name,
                    &attributes,
                    xsi_namespace.as_deref(),
                    resolver,
                );
                let id = NodeId::new(arena.len());
                arena.push(Node::new(entity, open));
                if let Some(parent) = open {
                    arena[parent.index()].children_mut().push(id);
                }
                open = Some(id);
            }
            Ok(XmlEvent::End) => {
                if let Some(current) = open {
                    open = close_node(&mut arena, current, &mut root);
                }
            }
            Err(err) => {
                warn!(view, error = %format!("{err:#}"), "stopped reading model view early");
                break;
            }
        }
    }
    while let Some(current) = open {
        open = close_node(&mut arena, current, &mut root);
    }

    let root = root?;
    Some(ModelTree::from_arena(view.to_string(), arena, root))
}

/// Entity fields come from unprefixed `id`, `entityName` and `href`, and from
/// `type` in the xsi namespace, whichever URI the document binds `xsi` to.
fn read_entity<R>(
    view: &str,
    local_name: &str,
    attributes: &[XmlAttribute],
    xsi_namespace: Option<&str>,
    resolver: &mut R,
) -> Entity
where
    R: HrefResolver + ?Sized,
{
    let mut entity_type = None;
    let mut id = None;
    let mut name = None;
    let mut href = None;
    for attr in attributes {
        match (attr.namespace.as_deref(), attr.local_name.as_str()) {
            (Some(ns), "type") if ns == XSI_NAMESPACE || Some(ns) == xsi_namespace => {
                entity_type = Some(attr.value.clone())
            }
            (None, "id") => id = Some(attr.value.clone()),
            (None, "entityName") => name = Some(attr.value.clone()),
            (None, "href") => href = Some(attr.value.as_str()),
            _ => {}
        }
    }

    let mut entity = Entity::new(view, local_name, id, name, entity_type);
    if let Some(href) = href {
        if !entity.has_own_name() {
            if let Some(resolved) = resolver.resolve_href(href, entity.name()) {
                entity.resolve_name(resolved);
            }
        }
    }
    entity
}

/// Sort the children of `current` and step out to its parent. A node without
/// parent becomes the root.
fn close_node(arena: &mut [Node], current: NodeId, root: &mut Option<NodeId>) -> Option<NodeId> {
    let mut children = std::mem::take(arena[current.index()].children_mut());
    children.sort_by(|a, b| compare_entities(arena[a.index()].entity(), arena[b.index()].entity()));
    *arena[current.index()].children_mut() = children;

    let parent = arena[current.index()].parent();
    if parent.is_none() {
        if let Some(previous) = root.replace(current) {
            warn!(
                element = arena[previous.index()].entity().element_name(),
                "model view has more than one top-level element, keeping the last one"
            );
        }
    }
    parent
}
