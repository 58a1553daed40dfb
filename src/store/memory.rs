use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::ledger::Ledger;
use super::{
    CreatedNode, EntityStore, FileId, NodeId, PathId, ResolvedReferenceWrite, TagId,
};
use crate::mapping::records::{FieldItem, FieldRecord, FieldValue, NodeRecord, TagParents};
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredTag {
    pub vocabulary_id: String,
    pub name: String,
    pub parents: Vec<TagId>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredNode {
    pub uuid: String,
    pub title: String,
    pub bundle: String,
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathAlias {
    pub source: String,
    pub alias: String,
}

/// Repository contents that outlive a run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Repository {
    pub vocabularies: BTreeMap<String, String>,
    pub tags: BTreeMap<TagId, StoredTag>,
    pub nodes: BTreeMap<NodeId, StoredNode>,
    pub files: BTreeMap<FileId, String>,
    pub paths: BTreeMap<PathId, PathAlias>,
}

/// Entity store over process memory.
///
/// The repository persists across runs on the same instance, so replacing
/// and re-importing content can be observed. An optional content model lists
/// the fields of each bundle; without one every bundle and field is accepted.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    overwrite: bool,
    content_model: BTreeMap<String, BTreeSet<String>>,
    repository: Repository,
    ledger: Ledger,
    next_id: u64,
}

impl InMemoryEntityStore {
    #[must_use]
    pub fn new(overwrite: bool) -> Self {
        Self {
            overwrite,
            ..Self::default()
        }
    }

    /// Declares a bundle and the fields it accepts.
    #[must_use]
    pub fn with_bundle<I, F>(mut self, bundle: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.content_model.insert(
            bundle.to_string(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }

    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    #[must_use]
    pub fn node_by_uuid(&self, uuid: &str) -> Option<(NodeId, &StoredNode)> {
        self.repository
            .nodes
            .iter()
            .find(|(_, node)| node.uuid == uuid)
            .map(|(id, node)| (*id, node))
    }

    /// Tags of a vocabulary, by id.
    #[must_use]
    pub fn tags_of(&self, vocabulary_id: &str) -> Vec<(TagId, &StoredTag)> {
        self.repository
            .tags
            .iter()
            .filter(|(_, tag)| tag.vocabulary_id == vocabulary_id)
            .map(|(id, tag)| (*id, tag))
            .collect()
    }

    #[must_use]
    pub fn alias_of(&self, node: NodeId) -> Option<&str> {
        let source = node_path(node);
        self.repository
            .paths
            .values()
            .find(|path| path.source == source)
            .map(|path| path.alias.as_str())
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn bundle_fields(&self, bundle: &str) -> Result<Option<&BTreeSet<String>>> {
        if self.content_model.is_empty() {
            return Ok(None);
        }
        self.content_model
            .get(bundle)
            .map(Some)
            .ok_or_else(|| {
                Error::RepositoryWrite(format!("Content type '{bundle}' does not exist."))
            })
    }

    /// Deletes a node that exists under `uuid`, or fails without overwrite.
    fn delete_node_if_exists(&mut self, uuid: &str) -> Result<()> {
        let Some((id, _)) = self.node_by_uuid(uuid) else {
            return Ok(());
        };
        if !self.overwrite {
            return Err(Error::DuplicateEntity {
                uuid: uuid.to_string(),
            });
        }
        let paths = self.remove_node(id);
        self.ledger.forget_node(id, &paths);
        info!(node = %id, uuid, "deleted existing node because overwrite is enabled");
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) -> Vec<PathId> {
        let source = node_path(id);
        let paths: Vec<PathId> = self
            .repository
            .paths
            .iter()
            .filter(|(_, path)| path.source == source)
            .map(|(path_id, _)| *path_id)
            .collect();
        for path in &paths {
            self.repository.paths.remove(path);
        }
        self.repository.nodes.remove(&id);
        paths
    }

    fn file_for(&mut self, uri: &str) -> FileId {
        if let Some((id, _)) = self
            .repository
            .files
            .iter()
            .find(|(_, existing)| existing.as_str() == uri)
        {
            debug!(file = %id, uri, "reusing existing file");
            return *id;
        }
        let id = FileId(self.allocate());
        self.repository.files.insert(id, uri.to_string());
        self.ledger.record_file(id);
        id
    }

    fn field_value(&mut self, field: &FieldRecord) -> Result<Option<Value>> {
        if field.deferred_targets().is_some() {
            return Ok(None);
        }
        let value = match &field.value {
            FieldValue::References(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        FieldItem::File(file) => {
                            let id = self.file_for(&file.uri);
                            json!({ "uri": file.uri, "target_id": id })
                        }
                        other => json!(other),
                    })
                    .collect(),
            ),
            other => serde_json::to_value(other)?,
        };
        Ok(Some(value))
    }
}

fn node_path(id: NodeId) -> String {
    format!("/node/{id}")
}

impl EntityStore for InMemoryEntityStore {
    fn create_vocabulary(&mut self, id: &str, name: &str) -> Result<()> {
        if self.repository.vocabularies.contains_key(id) {
            if self.overwrite {
                let cleared: Vec<TagId> = self.tags_of(id).into_iter().map(|(tag, _)| tag).collect();
                for tag in &cleared {
                    self.repository.tags.remove(tag);
                }
                self.ledger.forget_tags(&cleared);
                info!(vocabulary = id, tags = cleared.len(), "cleared existing vocabulary");
            }
            return Ok(());
        }
        self.repository
            .vocabularies
            .insert(id.to_string(), name.to_string());
        self.ledger.record_vocabulary(id);
        Ok(())
    }

    fn create_tag(&mut self, vocabulary_id: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        if !self.repository.vocabularies.contains_key(vocabulary_id) {
            return Err(Error::RepositoryWrite(format!(
                "Vocabulary '{vocabulary_id}' does not exist."
            )));
        }
        let id = TagId(self.allocate());
        self.repository.tags.insert(
            id,
            StoredTag {
                vocabulary_id: vocabulary_id.to_string(),
                name: name.to_string(),
                parents: Vec::new(),
            },
        );
        self.ledger.record_tag(id);
        Ok(())
    }

    fn tag_exists(&self, vocabulary_id: &str, name: &str) -> bool {
        self.tag_id(vocabulary_id, name).is_some()
    }

    fn tag_id(&self, vocabulary_id: &str, name: &str) -> Option<TagId> {
        self.repository
            .tags
            .iter()
            .find(|(_, tag)| tag.vocabulary_id == vocabulary_id && tag.name == name)
            .map(|(id, _)| *id)
    }

    fn set_tag_parents(&mut self, vocabulary_id: &str, tags: &[TagParents]) -> Result<()> {
        for link in tags {
            if link.parents.is_empty() {
                continue;
            }
            let Some(id) = self.tag_id(vocabulary_id, &link.name) else {
                debug!(vocabulary = vocabulary_id, tag = %link.name, "no tag to link parents to");
                continue;
            };
            let parents: Vec<TagId> = link
                .parents
                .iter()
                .filter_map(|parent| self.tag_id(vocabulary_id, parent))
                .collect();
            if let Some(tag) = self.repository.tags.get_mut(&id) {
                tag.parents = parents;
            }
        }
        Ok(())
    }

    fn create_node(&mut self, node: &NodeRecord) -> Result<CreatedNode> {
        if node.title.is_empty() {
            return Err(Error::RepositoryWrite(format!(
                "Node '{}' has no title.",
                node.uuid
            )));
        }
        self.delete_node_if_exists(&node.uuid)?;
        let accepted = self.bundle_fields(&node.bundle)?.cloned();

        let mut fields = BTreeMap::new();
        let mut skipped_fields = Vec::new();
        for field in &node.fields {
            if accepted
                .as_ref()
                .is_some_and(|accepted| !accepted.contains(&field.field_name))
            {
                skipped_fields.push(field.field_name.clone());
                continue;
            }
            if let Some(value) = self.field_value(field)? {
                fields.insert(field.field_name.clone(), value);
            }
        }

        let id = NodeId(self.allocate());
        self.repository.nodes.insert(
            id,
            StoredNode {
                uuid: node.uuid.clone(),
                title: node.title.clone(),
                bundle: node.bundle.clone(),
                fields,
            },
        );
        if let Some(alias) = &node.alias {
            let path = PathId(self.allocate());
            self.repository.paths.insert(
                path,
                PathAlias {
                    source: node_path(id),
                    alias: format!("/{alias}"),
                },
            );
            self.ledger.record_path(path);
        }
        self.ledger.record_node(id, &node.uuid);

        Ok(CreatedNode { id, skipped_fields })
    }

    fn created_node_id(&self, uuid: &str) -> Option<NodeId> {
        self.ledger.node_id(uuid)
    }

    fn insert_node_references(&mut self, writes: &[ResolvedReferenceWrite]) -> Result<()> {
        for write in writes {
            let Some(node) = self.repository.nodes.get_mut(&write.node) else {
                debug!(node = %write.node, "reference write for a deleted node");
                continue;
            };
            node.fields
                .insert(write.field_name.clone(), json!(write.target_ids));
        }
        Ok(())
    }

    fn rollback(&mut self) {
        let plan = self.ledger.take_rollback_plan();
        for path in &plan.paths {
            self.repository.paths.remove(path);
        }
        for node in &plan.nodes {
            self.remove_node(*node);
        }
        for file in &plan.files {
            self.repository.files.remove(file);
        }
        for tag in &plan.tags {
            self.repository.tags.remove(tag);
        }
        for vocabulary in &plan.vocabularies {
            self.repository.vocabularies.remove(vocabulary);
        }
        info!(
            paths = plan.paths.len(),
            nodes = plan.nodes.len(),
            files = plan.files.len(),
            tags = plan.tags.len(),
            vocabularies = plan.vocabularies.len(),
            "rolled back created entities"
        );
    }

    fn commit(&mut self) {
        self.ledger.clear();
    }

    fn count_created_nodes(&self) -> usize {
        self.ledger.count_nodes()
    }

    fn count_created_vocabularies(&self) -> usize {
        self.ledger.count_vocabularies()
    }

    fn count_created_tags(&self) -> usize {
        self.ledger.count_tags()
    }

    fn count_created_files(&self) -> usize {
        self.ledger.count_files()
    }
}
