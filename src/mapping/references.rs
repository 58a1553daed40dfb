//! Second import phase: node and taxonomy term references.
//!
//! A node may reference nodes that are created later in the same run, so
//! those fields are collected while nodes are written and resolved once
//! everything exists.

use tracing::{debug, info};

use super::records::{FieldItem, NodeRecord, ReferenceKind};
use crate::store::{CreatedNode, EntityStore, NodeId, ResolvedReferenceWrite};
use crate::warnings::Warnings;
use crate::Result;

/// A reference field waiting for its targets to exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeferredReference {
    pub owning_node: NodeId,
    pub field_name: String,
    pub kind: ReferenceKind,
    pub targets: Vec<FieldItem>,
}

/// Collects the deferred fields of a node the store accepted.
#[must_use]
pub fn split_deferred(record: &NodeRecord, created: &CreatedNode) -> Vec<DeferredReference> {
    record
        .fields
        .iter()
        .filter(|field| !created.skipped_fields.contains(&field.field_name))
        .filter_map(|field| {
            let targets = field.deferred_targets()?;
            Some(DeferredReference {
                owning_node: created.id,
                field_name: field.field_name.clone(),
                kind: field.references?,
                targets: targets.to_vec(),
            })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ReferenceResolver {
    pending: Vec<DeferredReference>,
}

impl ReferenceResolver {
    pub fn defer(&mut self, references: impl IntoIterator<Item = DeferredReference>) {
        self.pending.extend(references);
    }

    #[must_use]
    pub fn pending(&self) -> &[DeferredReference] {
        &self.pending
    }

    /// Maps every pending target to an identifier and writes the results.
    ///
    /// Targets that cannot be found become `None` entries. Returns the number
    /// of fields written.
    pub fn resolve<S: EntityStore + ?Sized>(&mut self, store: &mut S) -> Result<usize> {
        let writes: Vec<ResolvedReferenceWrite> = self
            .pending
            .drain(..)
            .map(|reference| ResolvedReferenceWrite {
                target_ids: reference
                    .targets
                    .iter()
                    .map(|target| resolve_target(&*store, target))
                    .collect(),
                node: reference.owning_node,
                field_name: reference.field_name,
                kind: reference.kind,
            })
            .collect();

        store.insert_node_references(&writes)?;
        info!(fields = writes.len(), "node references inserted");
        Ok(writes.len())
    }
}

fn resolve_target<S: EntityStore + ?Sized>(store: &S, target: &FieldItem) -> Option<u64> {
    let resolved = match target {
        FieldItem::Node(uuid) => store.created_node_id(uuid).map(|id| id.0),
        FieldItem::Tag(tag) => store
            .tag_id(&tag.vocabulary_id, &tag.name)
            .map(|id| id.0),
        FieldItem::File(_) | FieldItem::Literal(_) => None,
    };
    if resolved.is_none() {
        debug!(?target, "reference target did not resolve");
    }
    resolved
}

/// Writes one node and queues its deferred references.
///
/// A store rejection that only affects this node is logged and the node is
/// skipped; every other error is returned.
pub fn store_node<S: EntityStore + ?Sized>(
    store: &mut S,
    record: &NodeRecord,
    resolver: &mut ReferenceResolver,
    warnings: &Warnings,
) -> Result<()> {
    let created = match store.create_node(record) {
        Ok(created) => created,
        Err(err) if !err.is_fatal() => {
            warnings.warn(err.to_string());
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    for field in &created.skipped_fields {
        warnings.warn(format!(
            "field \"{field}\" does not exist in \"{}\".",
            record.bundle
        ));
    }
    resolver.defer(split_deferred(record, &created));
    Ok(())
}
