//! Records handed to the entity store.
//!
//! They serialize to the same shapes the tagged JSON document uses, so a dump
//! of an ontology import can be fed back in as a document.

use serde::{Deserialize, Serialize};

/// Longest field name the repository accepts.
pub const MAX_FIELD_NAME_LENGTH: usize = 32;

/// Entity type a reference field points at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Node,
    TaxonomyTerm,
    File,
}

impl ReferenceKind {
    /// Node and taxonomy term targets only exist once every entity is created.
    #[must_use]
    pub fn is_deferred(self) -> bool {
        matches!(self, Self::Node | Self::TaxonomyTerm)
    }
}

/// A tag addressed by vocabulary and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(rename = "vid")]
    pub vocabulary_id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub uri: String,
}

/// One entry of a multi-valued field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldItem {
    /// Uuid of the referenced node.
    Node(String),
    Tag(TagRef),
    File(FileRef),
    /// Value read from a generic entity through an axiom `field` annotation.
    Literal(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BodyValue {
    pub value: Option<String>,
    pub summary: Option<String>,
    pub format: String,
}

impl BodyValue {
    #[must_use]
    pub fn full_html(value: Option<String>, summary: Option<String>) -> Self {
        Self {
            value,
            summary,
            format: "full_html".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Body(BodyValue),
    Literals(Vec<String>),
    References(Vec<FieldItem>),
    /// Value taken verbatim from a tagged document.
    Json(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldRecord {
    pub field_name: String,
    pub value: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ReferenceKind>,
}

impl FieldRecord {
    /// Builds a field, truncating the name to [`MAX_FIELD_NAME_LENGTH`].
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        value: FieldValue,
        references: Option<ReferenceKind>,
    ) -> Self {
        let mut field_name = field_name.into();
        if let Some((at, _)) = field_name.char_indices().nth(MAX_FIELD_NAME_LENGTH) {
            field_name.truncate(at);
        }
        Self {
            field_name,
            value,
            references,
        }
    }

    /// Reference targets of a deferred field, or `None` for any other field.
    #[must_use]
    pub fn deferred_targets(&self) -> Option<&[FieldItem]> {
        match (&self.value, self.references) {
            (FieldValue::References(items), Some(kind)) if kind.is_deferred() => Some(items),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeRecord {
    pub title: String,
    #[serde(rename = "type")]
    pub bundle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub uuid: String,
    pub fields: Vec<FieldRecord>,
}

impl NodeRecord {
    /// The uuid falls back to the title when absent.
    #[must_use]
    pub fn new(title: impl Into<String>, bundle: impl Into<String>, uuid: Option<String>) -> Self {
        let title = title.into();
        Self {
            uuid: uuid
                .filter(|uuid| !uuid.is_empty())
                .unwrap_or_else(|| title.clone()),
            title,
            bundle: bundle.into(),
            alias: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias.filter(|alias| !alias.is_empty());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldRecord>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|field| field.field_name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub vocabulary_id: String,
    pub name: String,
    pub parent_names: Vec<String>,
}

/// Parent linkage of one tag, as passed to `set_tag_parents`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagParents {
    pub name: String,
    pub parents: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VocabularyRecord {
    pub vocabulary_id: String,
    pub name: String,
    pub tags: Vec<TagRecord>,
}

impl VocabularyRecord {
    /// Links for every tag that has parents.
    #[must_use]
    pub fn tag_parents(&self) -> Vec<TagParents> {
        self.tags
            .iter()
            .filter(|tag| !tag.parent_names.is_empty())
            .map(|tag| TagParents {
                name: tag.name.clone(),
                parents: tag.parent_names.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn field_names_are_truncated() {
        let field = FieldRecord::new(
            "field_an_unreasonably_long_property_name",
            FieldValue::Literals(vec![]),
            None,
        );
        assert_eq!(field.field_name, "field_an_unreasonably_long_prope");
        assert_eq!(field.field_name.len(), MAX_FIELD_NAME_LENGTH);
    }

    #[test]
    fn uuid_defaults_to_title() {
        let node = NodeRecord::new("Hello", "article", None);
        assert_eq!(node.uuid, "Hello");
        let node = NodeRecord::new("Hello", "article", Some("ex:Thing1".into()));
        assert_eq!(node.uuid, "ex:Thing1");
    }

    #[test]
    fn records_serialize_to_document_shapes() {
        let node = NodeRecord::new("Hello", "article", Some("ex:Thing1".into())).with_fields(vec![
            FieldRecord::new(
                "body",
                FieldValue::Body(BodyValue::full_html(Some("<p>Hi</p>".into()), None)),
                None,
            ),
            FieldRecord::new(
                "field_tags",
                FieldValue::References(vec![FieldItem::Tag(TagRef {
                    vocabulary_id: "Color".into(),
                    name: "Red".into(),
                })]),
                Some(ReferenceKind::TaxonomyTerm),
            ),
        ]);

        assert_eq!(
            serde_json::to_value(&node).expect("serializable"),
            json!({
                "title": "Hello",
                "type": "article",
                "uuid": "ex:Thing1",
                "fields": [
                    {
                        "field_name": "body",
                        "value": {"value": "<p>Hi</p>", "summary": null, "format": "full_html"}
                    },
                    {
                        "field_name": "field_tags",
                        "value": [{"vid": "Color", "name": "Red"}],
                        "references": "taxonomy_term"
                    }
                ]
            })
        );
    }

    #[test]
    fn only_node_and_term_references_are_deferred() {
        let file = FieldRecord::new(
            "field_image",
            FieldValue::References(vec![FieldItem::File(FileRef { uri: "a.png".into() })]),
            Some(ReferenceKind::File),
        );
        let node = FieldRecord::new(
            "field_author",
            FieldValue::References(vec![FieldItem::Node("ex:Person1".into())]),
            Some(ReferenceKind::Node),
        );
        assert!(file.deferred_targets().is_none());
        assert_eq!(node.deferred_targets().map(<[FieldItem]>::len), Some(1));
    }
}
