//! Mapping of a source file onto vocabulary, tag and node records.
//!
//! [`SourceHandler::open`] picks the mapper from the file extension and, for
//! ontologies, the graph access strategy from the file size. Both mappers
//! produce the same record types and feed the same store calls.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::ImportSettings;
use crate::graph::{self, AccessStrategy, GraphAccessor};
use crate::ontology::{ClassHierarchy, Duo, FieldProperty, Iri};
use crate::store::EntityStore;
use crate::warnings::Warnings;
use crate::{Error, Result};

pub mod document;
pub mod fields;
pub mod nodes;
pub mod records;
pub mod references;
pub mod vocabularies;

pub use document::DocumentSource;
pub use records::{
    FieldItem, FieldRecord, FieldValue, NodeRecord, ReferenceKind, TagParents, TagRecord,
    VocabularyRecord,
};
pub use references::{DeferredReference, ReferenceResolver};

/// Input format, decided by file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Tagged JSON document, mapped one to one.
    Document,
    /// OWL ontology in RDF/XML.
    Ontology,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Document),
            Some("owl" | "rdf") => Ok(Self::Ontology),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Ontology => f.write_str("ontology"),
        }
    }
}

/// Which ontology entities become nodes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeOptions {
    pub classes_as_nodes: bool,
    pub only_leaf_classes: bool,
}

impl NodeOptions {
    /// `field_parent` and `field_child` are only built when whole class trees
    /// become nodes.
    #[must_use]
    pub fn links_class_tree(self) -> bool {
        self.classes_as_nodes && !self.only_leaf_classes
    }
}

/// An ontology opened for mapping.
pub struct OntologySource {
    hierarchy: ClassHierarchy,
    duo: Duo,
    options: NodeOptions,
    field_properties: Vec<FieldProperty>,
}

impl OntologySource {
    pub fn new(graph: Box<dyn GraphAccessor>, duo: Duo, options: NodeOptions) -> Result<Self> {
        let field_properties = graph.field_properties()?;
        Ok(Self {
            hierarchy: ClassHierarchy::new(graph),
            duo,
            options,
            field_properties,
        })
    }

    #[must_use]
    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn strategy(&self) -> AccessStrategy {
        self.graph().strategy()
    }

    /// Statements of the source that were dropped while reading it.
    #[must_use]
    pub fn skipped_statements(&self) -> &[String] {
        self.graph().skipped_statements()
    }

    fn graph(&self) -> &dyn GraphAccessor {
        self.hierarchy.graph()
    }

    /// `true` for individuals typed below `root` and for classes below it.
    fn descends_from(&self, entity: &Iri, root: &Iri) -> Result<bool> {
        Ok(self.hierarchy.is_transitive_instance_of(entity, root)?
            || self.hierarchy.has_transitive_superclass(entity, root)?)
    }

    /// Label or local name.
    fn display_name(&self, iri: &Iri) -> Result<String> {
        self.graph().display_name(iri)
    }
}

pub enum SourceHandler {
    Document(DocumentSource),
    Ontology(OntologySource),
}

impl SourceHandler {
    /// Opens and fully validates the source. Nothing is written to a store
    /// before this succeeds.
    pub fn open(path: &Path, settings: &ImportSettings) -> Result<Self> {
        let format = SourceFormat::from_path(path)?;
        let metadata =
            fs::metadata(path).map_err(|_| Error::UnsupportedFormat(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }

        match format {
            SourceFormat::Document => {
                info!(path = %path.display(), "reading tagged document");
                Ok(Self::Document(DocumentSource::open(path)?))
            }
            SourceFormat::Ontology => {
                let strategy =
                    AccessStrategy::for_size(metadata.len(), settings.threshold_bytes()?);
                info!(
                    path = %path.display(),
                    size = metadata.len(),
                    %strategy,
                    "opening ontology"
                );
                let duo = settings.duo()?;
                let graph = graph::open(path, strategy, duo.clone())?;
                let options = NodeOptions {
                    classes_as_nodes: settings.classes_as_nodes,
                    only_leaf_classes: settings.only_leaf_classes_as_nodes,
                };
                Ok(Self::Ontology(OntologySource::new(graph, duo, options)?))
            }
        }
    }

    #[must_use]
    pub fn format(&self) -> SourceFormat {
        match self {
            Self::Document(_) => SourceFormat::Document,
            Self::Ontology(_) => SourceFormat::Ontology,
        }
    }

    /// Access strategy of an ontology source.
    #[must_use]
    pub fn strategy(&self) -> Option<AccessStrategy> {
        match self {
            Self::Document(_) => None,
            Self::Ontology(source) => Some(source.strategy()),
        }
    }

    /// Notices raised while opening the source.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        match self {
            Self::Document(_) => &[],
            Self::Ontology(source) => source.skipped_statements(),
        }
    }

    pub fn vocabulary_records(&self) -> Result<Vec<VocabularyRecord>> {
        match self {
            Self::Document(document) => Ok(document.vocabularies().to_vec()),
            Self::Ontology(source) => source.vocabulary_records(),
        }
    }

    pub fn node_records(&self, warnings: &Warnings) -> Result<Vec<NodeRecord>> {
        match self {
            Self::Document(document) => Ok(document.nodes().to_vec()),
            Self::Ontology(source) => source.node_records(warnings),
        }
    }

    pub fn import_vocabularies<S: EntityStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        match self {
            Self::Document(document) => {
                vocabularies::import_vocabularies(document.vocabularies(), store)
            }
            Self::Ontology(source) => source.import_vocabularies(store),
        }
    }

    pub fn import_nodes<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        warnings: &Warnings,
    ) -> Result<()> {
        match self {
            Self::Document(document) => document.import_nodes(store, warnings),
            Self::Ontology(source) => source.import_nodes(store, warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::SourceFormat;
    use crate::Error;

    #[rstest]
    #[case("data/import.json", SourceFormat::Document)]
    #[case("data/duo.owl", SourceFormat::Ontology)]
    #[case("data/DUO.OWL", SourceFormat::Ontology)]
    #[case("data/duo.rdf", SourceFormat::Ontology)]
    fn format_follows_extension(#[case] path: &str, #[case] expected: SourceFormat) {
        assert_eq!(
            SourceFormat::from_path(Path::new(path)).expect("supported"),
            expected
        );
    }

    #[rstest]
    #[case("data/import.csv")]
    #[case("data/import")]
    fn other_extensions_are_unsupported(#[case] path: &str) {
        let err = SourceFormat::from_path(Path::new(path)).expect_err("unsupported");
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
