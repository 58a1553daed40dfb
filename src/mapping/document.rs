//! Tagged JSON documents.
//!
//! ```json
//! {
//!   "vocabularies": [{ "vid": "Color", "tags": [{ "name": "Red", "parents": ["Warm"] }] }],
//!   "nodes": [{ "title": "Hello", "type": "article", "fields": [] }]
//! }
//! ```
//!
//! The document already carries records, so mapping is structural.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::records::{
    FieldItem, FieldRecord, FieldValue, FileRef, NodeRecord, ReferenceKind, TagRecord, TagRef,
    VocabularyRecord,
};
use super::references::{store_node, ReferenceResolver};
use crate::store::EntityStore;
use crate::warnings::Warnings;
use crate::{Error, Result};

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    vocabularies: Vec<RawVocabulary>,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawVocabulary {
    vid: String,
    name: Option<String>,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    title: String,
    #[serde(rename = "type")]
    bundle: String,
    alias: Option<String>,
    uuid: Option<String>,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    field_name: String,
    #[serde(default)]
    value: Value,
    references: Option<ReferenceKind>,
}

#[derive(Clone, Debug, Default)]
pub struct DocumentSource {
    vocabularies: Vec<VocabularyRecord>,
    nodes: Vec<NodeRecord>,
}

impl DocumentSource {
    /// Reads and converts the whole document.
    ///
    /// # Errors
    ///
    /// `Parse` when the document is not valid JSON or a field value does not
    /// match its `references` kind.
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(path, &content)
    }

    pub fn from_json(path: &Path, content: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(content)
            .map_err(|err| Error::parse(path, format!("could not decode the json file: {err}")))?;

        let vocabularies = raw.vocabularies.into_iter().map(vocabulary_record).collect();
        let nodes = raw
            .nodes
            .into_iter()
            .map(|node| node_record(node).map_err(|message| Error::parse(path, message)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vocabularies,
            nodes,
        })
    }

    #[must_use]
    pub fn vocabularies(&self) -> &[VocabularyRecord] {
        &self.vocabularies
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn import_nodes<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        warnings: &Warnings,
    ) -> Result<()> {
        info!("Found {} nodes.", self.nodes.len());
        let mut resolver = ReferenceResolver::default();
        for node in &self.nodes {
            store_node(store, node, &mut resolver, warnings)?;
        }
        info!("Adding node references...");
        resolver.resolve(store)?;
        Ok(())
    }
}

fn vocabulary_record(raw: RawVocabulary) -> VocabularyRecord {
    let tags = raw
        .tags
        .into_iter()
        .map(|tag| TagRecord {
            vocabulary_id: raw.vid.clone(),
            name: tag.name,
            parent_names: tag.parents,
        })
        .collect();
    VocabularyRecord {
        name: raw.name.unwrap_or_else(|| raw.vid.clone()),
        vocabulary_id: raw.vid,
        tags,
    }
}

fn node_record(raw: RawNode) -> std::result::Result<NodeRecord, String> {
    let mut fields = Vec::new();
    for field in raw.fields {
        if is_empty_value(&field.value) {
            continue;
        }
        let value = field_value(field.value, field.references)
            .map_err(|err| format!("field `{}` of `{}`: {err}", field.field_name, raw.title))?;
        fields.push(FieldRecord::new(field.field_name, value, field.references));
    }
    Ok(NodeRecord::new(raw.title, raw.bundle, raw.uuid)
        .with_alias(raw.alias)
        .with_fields(fields))
}

/// `null` and `{"value": null}` leave the field unset.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.get("value").is_some_and(Value::is_null),
        _ => false,
    }
}

fn field_value(value: Value, references: Option<ReferenceKind>) -> serde_json::Result<FieldValue> {
    let items = match references {
        None => return Ok(FieldValue::Json(value)),
        Some(ReferenceKind::Node) => one_or_many::<String>(value)?
            .into_iter()
            .map(FieldItem::Node)
            .collect(),
        Some(ReferenceKind::TaxonomyTerm) => one_or_many::<TagRef>(value)?
            .into_iter()
            .map(FieldItem::Tag)
            .collect(),
        Some(ReferenceKind::File) => one_or_many::<FileRef>(value)?
            .into_iter()
            .map(FieldItem::File)
            .collect(),
    };
    Ok(FieldValue::References(items))
}

fn one_or_many<T: serde::de::DeserializeOwned>(value: Value) -> serde_json::Result<Vec<T>> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}
