//! Well-known identifiers of the RDF/OWL vocabularies and of the DUO anchor
//! ontology that drives the mapping.

use super::value_objects::{Iri, IriError};

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_DESCRIPTION: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Description";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUBPROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const OWL_ANNOTATED_SOURCE: &str = "http://www.w3.org/2002/07/owl#annotatedSource";
pub const OWL_ANNOTATED_PROPERTY: &str = "http://www.w3.org/2002/07/owl#annotatedProperty";
pub const OWL_ANNOTATED_TARGET: &str = "http://www.w3.org/2002/07/owl#annotatedTarget";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Namespace of the DUO anchor ontology.
pub const DUO_NAMESPACE: &str = "http://www.lha.org/duo#";

/// Returns `true` for IRIs defined by RDF, RDFS, OWL or XSD themselves.
#[must_use]
pub fn is_builtin(iri: &str) -> bool {
    [RDF, RDFS, OWL, XSD]
        .iter()
        .any(|namespace| iri.starts_with(namespace))
}

/// The fixed anchor classes and marker properties of the DUO ontology.
///
/// Everything under [`Duo::node`] becomes content, everything under
/// [`Duo::vocabulary`] becomes taxonomy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Duo {
    pub node: Iri,
    pub vocabulary: Iri,
    pub file: Iri,
    pub entity: Iri,
    pub title: Iri,
    pub alias: Iri,
    pub content: Iri,
    pub summary: Iri,
    pub ref_num: Iri,
    pub uri: Iri,
    /// Marker for annotation fields; also names the target property on axioms.
    pub annotation_field: Iri,
    pub datatype_field: Iri,
    pub object_field: Iri,
}

impl Duo {
    /// Builds the identifiers relative to the given namespace.
    pub fn with_namespace(namespace: &str) -> Result<Self, IriError> {
        let iri = |local: &str| Iri::in_namespace(namespace, local);
        Ok(Self {
            node: iri("Node")?,
            vocabulary: iri("Vocabulary")?,
            file: iri("File")?,
            entity: iri("Entity")?,
            title: iri("title")?,
            alias: iri("alias")?,
            content: iri("content")?,
            summary: iri("summary")?,
            ref_num: iri("ref_num")?,
            uri: iri("uri")?,
            annotation_field: iri("field")?,
            datatype_field: iri("literal_field")?,
            object_field: iri("reference_field")?,
        })
    }
}

impl Default for Duo {
    fn default() -> Self {
        Self::with_namespace(DUO_NAMESPACE).expect("DUO namespace is a valid IRI")
    }
}

#[cfg(test)]
mod tests {
    use super::{is_builtin, Duo, OWL};

    #[test]
    fn default_identifiers_use_duo_namespace() {
        let duo = Duo::default();
        assert_eq!(duo.node.as_str(), "http://www.lha.org/duo#Node");
        assert_eq!(duo.annotation_field.as_str(), "http://www.lha.org/duo#field");
        assert_eq!(
            duo.object_field.as_str(),
            "http://www.lha.org/duo#reference_field"
        );
    }

    #[test]
    fn custom_namespace_is_applied() {
        let duo = Duo::with_namespace("https://example.org/anchors/").expect("namespace");
        assert_eq!(duo.vocabulary.as_str(), "https://example.org/anchors/Vocabulary");
    }

    #[test]
    fn builtin_vocabularies_are_detected() {
        assert!(is_builtin(&format!("{OWL}NamedIndividual")));
        assert!(!is_builtin("http://www.lha.org/duo#Node"));
    }
}
