//! Contract of the content repository the importer writes into.
//!
//! A store keeps a ledger of everything created during the current run, so
//! that [`EntityStore::rollback`] can undo a failed import and the run summary
//! can be computed from it.

use std::fmt;

use serde::Serialize;

use crate::mapping::records::{NodeRecord, ReferenceKind, TagParents};
use crate::Result;

pub mod ledger;
pub mod memory;

pub use ledger::Ledger;
pub use memory::InMemoryEntityStore;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(NodeId);
entity_id!(TagId);
entity_id!(FileId);
entity_id!(PathId);

/// Result of a node write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedNode {
    pub id: NodeId,
    /// Fields the node's bundle does not define; their values were dropped.
    pub skipped_fields: Vec<String>,
}

/// Identifiers of the targets of one deferred reference field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedReferenceWrite {
    pub node: NodeId,
    pub field_name: String,
    pub kind: ReferenceKind,
    /// `None` for targets that did not resolve.
    pub target_ids: Vec<Option<u64>>,
}

pub trait EntityStore {
    /// Creates a vocabulary unless it exists. With overwrite enabled an
    /// existing vocabulary loses its tags instead.
    fn create_vocabulary(&mut self, id: &str, name: &str) -> Result<()>;

    fn create_tag(&mut self, vocabulary_id: &str, name: &str) -> Result<()>;

    fn tag_exists(&self, vocabulary_id: &str, name: &str) -> bool;

    fn tag_id(&self, vocabulary_id: &str, name: &str) -> Option<TagId>;

    /// Replaces the parents of the named tags. Parents are looked up by name
    /// in the same vocabulary.
    fn set_tag_parents(&mut self, vocabulary_id: &str, tags: &[TagParents]) -> Result<()>;

    /// Writes a node with its literal and file fields. Node and taxonomy term
    /// references are written later through
    /// [`EntityStore::insert_node_references`].
    ///
    /// Fails with `DuplicateEntity` when the uuid exists and overwrite is
    /// disabled, and with `RepositoryWrite` when the bundle is unknown.
    fn create_node(&mut self, node: &NodeRecord) -> Result<CreatedNode>;

    /// Id of a node created during this run.
    fn created_node_id(&self, uuid: &str) -> Option<NodeId>;

    fn insert_node_references(&mut self, writes: &[ResolvedReferenceWrite]) -> Result<()>;

    /// Deletes everything created during this run: paths, nodes, files, tags,
    /// then vocabularies.
    fn rollback(&mut self);

    /// Ends a successful run and forgets its ledger.
    fn commit(&mut self);

    fn count_created_nodes(&self) -> usize;

    fn count_created_vocabularies(&self) -> usize;

    fn count_created_tags(&self) -> usize;

    fn count_created_files(&self) -> usize;
}
