use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::rdfxml::ElementReader;
use super::{is_property_candidate, AccessStrategy, GraphAccessor, OrderedSet};
use crate::ontology::{Axiom, Duo, Element, ElementKind, FieldCategory, FieldProperty, Iri};
use crate::Result;

/// Whole-document graph, parsed once and indexed for direct lookups.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    duo: Duo,
    elements: Vec<Element>,
    by_iri: HashMap<Iri, usize>,
    subclasses: HashMap<Iri, OrderedSet>,
    typed: HashMap<Iri, OrderedSet>,
    kinds: HashMap<ElementKind, OrderedSet>,
    axioms: HashMap<Iri, Vec<Axiom>>,
    property_candidates: OrderedSet,
    skipped: Vec<String>,
}

impl InMemoryGraph {
    pub fn open(path: &Path, duo: Duo) -> Result<Self> {
        let mut graph = Self::new(duo);
        let mut reader = ElementReader::open(path)?;
        while let Some(element) = reader.next_element()? {
            graph.insert(element);
        }
        graph.skipped = reader.into_skipped();
        info!(
            path = %path.display(),
            resources = graph.elements.len(),
            skipped = graph.skipped.len(),
            "ontology loaded into memory"
        );
        Ok(graph)
    }

    #[must_use]
    pub fn new(duo: Duo) -> Self {
        Self {
            duo,
            ..Self::default()
        }
    }

    /// Builds a graph from already parsed elements, in document order.
    #[must_use]
    pub fn from_elements(elements: impl IntoIterator<Item = Element>, duo: Duo) -> Self {
        let mut graph = Self::new(duo);
        for element in elements {
            graph.insert(element);
        }
        graph
    }

    /// Indexes one top-level element. Edges are indexed per element so that
    /// list order matches a sequential scan of the document.
    pub fn insert(&mut self, element: Element) {
        if let Some(axiom) = Axiom::from_element(&element, &self.duo) {
            self.axioms
                .entry(axiom.source.clone())
                .or_default()
                .push(axiom);
        }
        let Some(iri) = element.iri().cloned() else {
            return;
        };

        for class in element.superclasses() {
            self.subclasses.entry(class).or_default().insert(&iri);
        }
        for class in element.types() {
            self.typed.entry(class).or_default().insert(&iri);
        }
        for kind in ElementKind::ALL {
            if element.has_kind(kind) {
                self.kinds.entry(kind).or_default().insert(&iri);
            }
        }
        if is_property_candidate(&element) {
            self.property_candidates.insert(&iri);
        }

        match self.by_iri.get(&iri) {
            Some(&at) => self.elements[at].merge(element),
            None => {
                self.by_iri.insert(iri, self.elements.len());
                self.elements.push(element);
            }
        }
    }

    fn merged(&self, iri: &Iri) -> Option<&Element> {
        self.by_iri.get(iri).map(|&at| &self.elements[at])
    }

    fn listed(index: &HashMap<Iri, OrderedSet>, key: &Iri) -> Vec<Iri> {
        index
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl GraphAccessor for InMemoryGraph {
    fn strategy(&self) -> AccessStrategy {
        AccessStrategy::InMemory
    }

    fn skipped_statements(&self) -> &[String] {
        &self.skipped
    }

    fn element(&self, iri: &Iri) -> Result<Option<Cow<'_, Element>>> {
        Ok(self.merged(iri).map(Cow::Borrowed))
    }

    fn direct_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        Ok(Self::listed(&self.subclasses, class))
    }

    fn all_of_kind(&self, kind: ElementKind) -> Result<Vec<Iri>> {
        Ok(self
            .kinds
            .get(&kind)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn instances_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        let Some(typed) = self.typed.get(class) else {
            return Ok(Vec::new());
        };
        Ok(typed
            .iter()
            .filter(|iri| {
                self.merged(iri)
                    .is_some_and(|element| element.has_kind(ElementKind::NamedIndividual))
            })
            .cloned()
            .collect())
    }

    fn axioms_for(&self, source: &Iri) -> Result<Vec<Axiom>> {
        Ok(self.axioms.get(source).cloned().unwrap_or_default())
    }

    fn field_properties(&self) -> Result<Vec<FieldProperty>> {
        let mut result = Vec::new();
        for category in FieldCategory::ALL {
            for iri in self.property_candidates.iter() {
                if let Some(element) = self.merged(iri) {
                    result.extend(FieldProperty::classify(element, category, &self.duo));
                }
            }
        }
        Ok(result)
    }
}
