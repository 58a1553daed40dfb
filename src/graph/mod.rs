//! Uniform query surface over an ontology source.
//!
//! Two implementations exist: [`InMemoryGraph`] parses the document once and
//! answers from indexes, [`StreamingGraph`] re-scans the file for every query
//! and never holds more than one top-level element. The mapping code only
//! sees [`GraphAccessor`].

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::ontology::vocabulary::RDFS_SUBPROPERTY_OF;
use crate::ontology::{Axiom, Duo, Element, ElementKind, FieldProperty, Iri};
use crate::Result;

pub mod memory;
pub mod rdfxml;
pub mod streaming;

pub use memory::InMemoryGraph;
pub use streaming::StreamingGraph;

/// How a graph accessor reaches the source document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStrategy {
    InMemory,
    Streaming,
}

impl AccessStrategy {
    /// Sources strictly larger than `threshold` bytes are streamed.
    #[must_use]
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size > threshold {
            Self::Streaming
        } else {
            Self::InMemory
        }
    }
}

impl fmt::Display for AccessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("in-memory"),
            Self::Streaming => f.write_str("streaming"),
        }
    }
}

/// Read access to classes, individuals, properties and axioms.
///
/// Lists are returned in document order without duplicates, so both
/// implementations produce identical answers for the same source.
pub trait GraphAccessor {
    fn strategy(&self) -> AccessStrategy;

    /// All statements about a resource, merged over every element describing it.
    fn element(&self, iri: &Iri) -> Result<Option<Cow<'_, Element>>>;

    /// Classes declaring `rdfs:subClassOf class`.
    fn direct_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>>;

    /// Named resources declared with the given OWL kind.
    fn all_of_kind(&self, kind: ElementKind) -> Result<Vec<Iri>>;

    /// Named individuals with `rdf:type class`.
    fn instances_of(&self, class: &Iri) -> Result<Vec<Iri>>;

    /// Axioms whose `owl:annotatedSource` is `source`, in discovery order.
    fn axioms_for(&self, source: &Iri) -> Result<Vec<Axiom>>;

    /// Property declarations below one of the three field markers, annotation
    /// fields first, then datatype fields, then object fields.
    fn field_properties(&self) -> Result<Vec<FieldProperty>>;

    /// Statements the reader dropped while loading the source.
    fn skipped_statements(&self) -> &[String];

    fn direct_superclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        Ok(self
            .element(class)?
            .map(|element| element.superclasses())
            .unwrap_or_default())
    }

    fn types_of(&self, resource: &Iri) -> Result<Vec<Iri>> {
        Ok(self
            .element(resource)?
            .map(|element| element.types())
            .unwrap_or_default())
    }

    /// `rdfs:label` of the resource, or its local name.
    fn display_name(&self, iri: &Iri) -> Result<String> {
        let label = self
            .element(iri)?
            .and_then(|element| element.label().map(str::to_string));
        Ok(label.unwrap_or_else(|| iri.local_name().to_string()))
    }
}

/// Opens the source with the requested strategy.
pub fn open(path: &Path, strategy: AccessStrategy, duo: Duo) -> Result<Box<dyn GraphAccessor>> {
    Ok(match strategy {
        AccessStrategy::InMemory => Box::new(InMemoryGraph::open(path, duo)?),
        AccessStrategy::Streaming => Box::new(StreamingGraph::open(path, duo)?),
    })
}

/// IRIs in first-seen order, without duplicates.
#[derive(Clone, Debug, Default)]
pub(crate) struct OrderedSet {
    items: Vec<Iri>,
    seen: HashSet<Iri>,
}

impl OrderedSet {
    pub(crate) fn insert(&mut self, iri: &Iri) {
        if self.seen.insert(iri.clone()) {
            self.items.push(iri.clone());
        }
    }

    pub(crate) fn contains(&self, iri: &Iri) -> bool {
        self.seen.contains(iri)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Iri> {
        self.items.iter()
    }

    pub(crate) fn into_vec(self) -> Vec<Iri> {
        self.items
    }
}

/// Elements that may declare a field property once merged.
pub(crate) fn is_property_candidate(element: &Element) -> bool {
    element.has_value(RDFS_SUBPROPERTY_OF)
        || [
            ElementKind::AnnotationProperty,
            ElementKind::DatatypeProperty,
            ElementKind::ObjectProperty,
        ]
        .into_iter()
        .any(|kind| element.has_kind(kind))
}
