//! Ontology domain primitives.
//!
//! The module holds the value objects and element model read from an OWL
//! source, the fixed DUO identifiers that anchor the mapping, and the class
//! hierarchy resolver. Nothing here knows about the content repository.

pub mod axioms;
pub mod entities;
pub mod hierarchy;
pub mod value_objects;
pub mod vocabulary;

pub use axioms::AxiomIndex;
pub use entities::{
    Axiom, Element, ElementKind, FieldCategory, FieldProperty, Literal, Statement, Term,
};
pub use hierarchy::ClassHierarchy;
pub use value_objects::{Iri, IriError};
pub use vocabulary::Duo;
