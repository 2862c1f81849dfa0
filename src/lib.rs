//! Model-view reader.
//!
//! This crate indexes a folder of architecture model-view XML files and reads
//! each of them, on demand and at most once, into a tree of [`model::Entity`]
//! values. Cross-file `href` references are turned into readable names while
//! reading.
//!
//! The binary `modelview` prints the trees of a model folder.

pub mod config;
pub mod error;
pub mod model;
pub mod ordering;
pub mod parser;

pub use config::ReaderOptions;
pub use error::ModelError;
pub use model::{Entity, EntityNode, ModelTree, Name, Node, NodeId};
pub use parser::{FsSource, ModelReader, SharedModelReader};
