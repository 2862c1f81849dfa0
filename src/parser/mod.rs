//! Model view reader.
//!
//! Provides [`ModelReader`] to index a folder of model-view XML files and
//! parse them on demand into [`ModelTree`]s. Sub-modules split the reader into
//! focused areas:
//!
//! - [`source`] – File I/O abstraction
//! - [`events`] – Start/end element events over quick-xml
//! - [`builder`] – Tree construction from an event stream
//! - [`helpers`] – href parsing and reference name composition
//! - [`shared`] – Lock-protected reader for multi-threaded callers

pub mod builder;
pub mod events;
pub mod helpers;
pub mod shared;
pub mod source;

pub use builder::{HrefResolver, NoResolver, build_tree};
pub use events::{XSI_NAMESPACE, XmlAttribute, XmlEvent, XmlEvents};
pub use helpers::{compose_reference_name, parse_href};
pub use shared::SharedModelReader;
pub use source::*;

use crate::config::ReaderOptions;
use crate::error::ModelError;
use crate::model::{Entity, ModelTree};
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Parse state of one indexed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Unparsed,
    /// The file is being parsed further up the call stack.
    Parsing,
    /// Parsed; `None` when the file held no element.
    Parsed(Option<Arc<ModelTree>>),
}

#[derive(Debug)]
struct IndexedFile {
    path: Utf8PathBuf,
    state: FileState,
}

/// Index and cache over one model folder. Generic over [`ContentSource`] so
/// it can read from the filesystem ([`FsSource`]) or any other source.
///
/// The folder listing is taken once at construction. Each file is parsed at
/// most once; later requests are answered from the cache, including when the
/// first parse yielded nothing.
pub struct ModelReader<S: ContentSource> {
    folder: Utf8PathBuf,
    source: S,
    options: ReaderOptions,
    files: IndexMap<String, IndexedFile>,
}

impl<S: ContentSource> ModelReader<S> {
    pub fn new(folder: impl AsRef<Utf8Path>, source: S) -> Result<Self> {
        Self::with_options(folder, source, ReaderOptions::default())
    }

    pub fn with_options(
        folder: impl AsRef<Utf8Path>,
        mut source: S,
        options: ReaderOptions,
    ) -> Result<Self> {
        let folder = folder.as_ref().to_path_buf();
        let mut entries: Vec<(String, Utf8PathBuf)> = source
            .list_dir(&folder)?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string();
                (!options.is_hidden(&name)).then_some((name, path))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let files: IndexMap<String, IndexedFile> = entries
            .into_iter()
            .map(|(name, path)| {
                let file = IndexedFile {
                    path,
                    state: FileState::Unparsed,
                };
                (name, file)
            })
            .collect();
        debug!(folder = %folder, files = files.len(), "indexed model folder");
        Ok(Self {
            folder,
            source,
            options,
            files,
        })
    }

    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Names of the indexed files, sorted.
    pub fn list_files(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    pub fn path_of(&self, file: &str) -> Option<&Utf8Path> {
        self.files.get(file).map(|f| f.path.as_path())
    }

    pub fn state(&self, file: &str) -> Option<&FileState> {
        self.files.get(file).map(|f| &f.state)
    }

    /// Parsed tree of `file`, parsing it on first access.
    ///
    /// `Ok(None)` means the file holds no element, or is still being parsed
    /// further up the stack. Files outside the index are an error.
    pub fn read_file(&mut self, file: &str) -> Result<Option<Arc<ModelTree>>, ModelError> {
        let entry = self
            .files
            .get_mut(file)
            .ok_or_else(|| ModelError::NotIndexed {
                file: file.to_string(),
            })?;
        match &entry.state {
            FileState::Parsed(tree) => {
                trace!(file, "model view served from cache");
                return Ok(tree.clone());
            }
            FileState::Parsing => {
                debug!(file, "model view is already being parsed");
                return Ok(None);
            }
            FileState::Unparsed => {}
        }
        entry.state = FileState::Parsing;
        let path = entry.path.clone();

        let tree = self.parse(file, &path).map(Arc::new);
        if let Some(entry) = self.files.get_mut(file) {
            entry.state = FileState::Parsed(tree.clone());
        }
        Ok(tree)
    }

    /// Parse every indexed file in name order and return the non-empty trees.
    pub fn read_all(&mut self) -> Vec<Arc<ModelTree>> {
        let names: Vec<String> = self.files.keys().cloned().collect();
        names
            .iter()
            .filter_map(|name| self.read_file(name).ok().flatten())
            .collect()
    }

    /// Entity with `id` in `view`, if any.
    pub fn find_entity(&mut self, view: &str, id: &str) -> Result<Option<Entity>, ModelError> {
        let Some(tree) = self.read_file(view)? else {
            return Ok(None);
        };
        Ok(tree.find_by_id(id).and_then(|node| tree.entity(node)).cloned())
    }

    /// Entities matching `predicate` across all views: views in name order,
    /// entities in pre-order within each view.
    pub fn search<F>(&mut self, mut predicate: F) -> Vec<Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.read_all()
            .iter()
            .flat_map(|tree| {
                tree.preorder()
                    .map(|(_, node)| node.entity())
                    .filter(|&e| predicate(e))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn parse(&mut self, file: &str, path: &Utf8Path) -> Option<ModelTree> {
        let text = match self.source.read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %path, error = %format!("{err:#}"), "cannot read model view");
                return None;
            }
        };
        debug!(file, "parsing model view");
        let tree = build_tree(file, XmlEvents::new(&text), self);
        debug!(file, nodes = tree.as_ref().map_or(0, ModelTree::len), "parsed model view");
        tree
    }
}

impl<S: ContentSource> HrefResolver for ModelReader<S> {
    fn resolve_href(&mut self, href: &str, current_name: Option<&str>) -> Option<String> {
        let Some((file, local_id)) = parse_href(href) else {
            debug!(href, "ignoring malformed href");
            return None;
        };
        let tree = match self.read_file(file) {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                debug!(href, "referenced view is empty or still being parsed");
                return None;
            }
            Err(err) => {
                debug!(href, error = %err, "ignoring href into unknown view");
                return None;
            }
        };
        let Some(target) = tree.find_by_id(local_id).and_then(|node| tree.entity(node)) else {
            debug!(href, "no entity with the referenced id");
            return None;
        };
        if !target.has_own_name() {
            return None;
        }
        let target_name = target.name()?;
        Some(compose_reference_name(
            current_name,
            self.options.unnamed_reference_prefix.as_deref(),
            file,
            target_name,
        ))
    }
}
