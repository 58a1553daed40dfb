use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::rdfxml::ElementReader;
use super::{is_property_candidate, AccessStrategy, GraphAccessor, OrderedSet};
use crate::ontology::{Axiom, Duo, Element, ElementKind, FieldCategory, FieldProperty, Iri};
use crate::Result;

/// Graph that keeps nothing but the path and re-reads the document for every
/// query.
///
/// Peak memory is one top-level element plus the answer being collected. Each
/// query costs a full pass over the file.
#[derive(Debug)]
pub struct StreamingGraph {
    path: PathBuf,
    duo: Duo,
    skipped: Vec<String>,
}

impl StreamingGraph {
    /// Checks that the whole document parses, so that a malformed source
    /// fails before any entity is created.
    pub fn open(path: &Path, duo: Duo) -> Result<Self> {
        let mut elements = 0usize;
        let mut reader = ElementReader::open(path)?;
        while reader.next_element()?.is_some() {
            elements += 1;
        }
        let skipped = reader.into_skipped();
        info!(
            path = %path.display(),
            elements,
            skipped = skipped.len(),
            "ontology will be streamed"
        );
        Ok(Self {
            path: path.to_path_buf(),
            duo,
            skipped,
        })
    }

    fn scan(&self, query: &str, mut visit: impl FnMut(Element)) -> Result<()> {
        debug!(path = %self.path.display(), query, "scanning ontology");
        for element in ElementReader::open(&self.path)? {
            visit(element?);
        }
        Ok(())
    }

    /// Merged descriptions of a set of resources, from a single pass.
    fn merged(&self, query: &str, wanted: &OrderedSet) -> Result<HashMap<Iri, Element>> {
        let mut merged: HashMap<Iri, Element> = HashMap::new();
        self.scan(query, |element| {
            let Some(iri) = element.iri().filter(|iri| wanted.contains(iri)).cloned() else {
                return;
            };
            match merged.get_mut(&iri) {
                Some(existing) => existing.merge(element),
                None => {
                    merged.insert(iri, element);
                }
            }
        })?;
        Ok(merged)
    }
}

impl GraphAccessor for StreamingGraph {
    fn strategy(&self) -> AccessStrategy {
        AccessStrategy::Streaming
    }

    fn skipped_statements(&self) -> &[String] {
        &self.skipped
    }

    fn element(&self, iri: &Iri) -> Result<Option<Cow<'_, Element>>> {
        let mut found: Option<Element> = None;
        self.scan("element", |element| {
            if element.iri() != Some(iri) {
                return;
            }
            match found.as_mut() {
                Some(existing) => existing.merge(element),
                None => found = Some(element),
            }
        })?;
        Ok(found.map(Cow::Owned))
    }

    fn direct_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        let mut result = OrderedSet::default();
        self.scan("direct_subclasses_of", |element| {
            if let Some(iri) = element.iri() {
                if element.superclasses().contains(class) {
                    result.insert(iri);
                }
            }
        })?;
        Ok(result.into_vec())
    }

    fn all_of_kind(&self, kind: ElementKind) -> Result<Vec<Iri>> {
        let mut result = OrderedSet::default();
        self.scan("all_of_kind", |element| {
            if let Some(iri) = element.iri() {
                if element.has_kind(kind) {
                    result.insert(iri);
                }
            }
        })?;
        Ok(result.into_vec())
    }

    fn instances_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        let mut candidates = OrderedSet::default();
        self.scan("instances_of", |element| {
            if let Some(iri) = element.iri() {
                if element.types().contains(class) {
                    candidates.insert(iri);
                }
            }
        })?;
        if candidates.iter().next().is_none() {
            return Ok(Vec::new());
        }

        let merged = self.merged("instances_of", &candidates)?;
        Ok(candidates
            .into_vec()
            .into_iter()
            .filter(|iri| {
                merged
                    .get(iri)
                    .is_some_and(|element| element.has_kind(ElementKind::NamedIndividual))
            })
            .collect())
    }

    fn axioms_for(&self, source: &Iri) -> Result<Vec<Axiom>> {
        let mut result = Vec::new();
        self.scan("axioms_for", |element| {
            if let Some(axiom) = Axiom::from_element(&element, &self.duo) {
                if &axiom.source == source {
                    result.push(axiom);
                }
            }
        })?;
        Ok(result)
    }

    fn field_properties(&self) -> Result<Vec<FieldProperty>> {
        let mut candidates = OrderedSet::default();
        self.scan("field_properties", |element| {
            if let Some(iri) = element.iri() {
                if is_property_candidate(&element) {
                    candidates.insert(iri);
                }
            }
        })?;

        let merged = self.merged("field_properties", &candidates)?;
        let mut result = Vec::new();
        for category in FieldCategory::ALL {
            for iri in candidates.iter() {
                if let Some(element) = merged.get(iri) {
                    result.extend(FieldProperty::classify(element, category, &self.duo));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::StreamingGraph;
    use crate::graph::{GraphAccessor, InMemoryGraph};
    use crate::ontology::{Duo, ElementKind, Iri};
    use crate::tests_cfg::write_fixture;
    use crate::Error;

    const DOCUMENT: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
    <owl:Class rdf:about="http://www.lha.org/duo#Node"/>
    <owl:Class rdf:about="http://www.lha.org/duo#Article">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Node"/>
    </owl:Class>
    <owl:NamedIndividual rdf:about="ex:Thing1">
        <rdf:type rdf:resource="http://www.lha.org/duo#Article"/>
    </owl:NamedIndividual>
    <rdf:Description rdf:about="ex:Thing1">
        <rdfs:label>Thing one</rdfs:label>
    </rdf:Description>
</rdf:RDF>"#;

    fn write(content: &str) -> tempfile::NamedTempFile {
        write_fixture(content, ".owl")
    }

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    #[test]
    fn answers_match_the_in_memory_graph() {
        let file = write(DOCUMENT);
        let streaming = StreamingGraph::open(file.path(), Duo::default()).expect("open");
        let memory = InMemoryGraph::open(file.path(), Duo::default()).expect("open");

        let node = iri("http://www.lha.org/duo#Node");
        let article = iri("http://www.lha.org/duo#Article");
        assert_eq!(
            streaming.direct_subclasses_of(&node).expect("query"),
            memory.direct_subclasses_of(&node).expect("query")
        );
        assert_eq!(
            streaming.instances_of(&article).expect("query"),
            vec![iri("ex:Thing1")]
        );
        assert_eq!(
            streaming.all_of_kind(ElementKind::Class).expect("query"),
            memory.all_of_kind(ElementKind::Class).expect("query")
        );
        assert_eq!(
            streaming.display_name(&iri("ex:Thing1")).expect("query"),
            "Thing one"
        );
    }

    #[test]
    fn malformed_document_fails_on_open() {
        let file = write("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"><owl:Class>");
        let err = StreamingGraph::open(file.path(), Duo::default()).expect_err("malformed");
        assert!(matches!(err, Error::Parse { .. }));
    }
}
