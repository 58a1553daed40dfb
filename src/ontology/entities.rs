use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::value_objects::Iri;
use super::vocabulary::{
    is_builtin, Duo, OWL, OWL_ANNOTATED_PROPERTY, OWL_ANNOTATED_SOURCE, OWL_ANNOTATED_TARGET,
    RDFS_LABEL, RDFS_SUBCLASS_OF, RDFS_SUBPROPERTY_OF, RDF_TYPE, XSD_DATE_TIME,
};

/// A literal value with its optional datatype and language tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    value: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    #[must_use]
    pub fn with_datatype(mut self, datatype: Iri) -> Self {
        self.datatype = Some(datatype);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Renders the literal the way it is stored in a field.
    ///
    /// `xsd:dateTime` values keep only their date part; everything else loses
    /// a trailing `^^datatype` suffix if the source carried one inline.
    #[must_use]
    pub fn to_field_string(&self) -> String {
        if self.datatype.as_ref().map(Iri::as_str) == Some(XSD_DATE_TIME) {
            if let Some(date) = parse_date(self.value.trim()) {
                return date.format("%Y-%m-%d").to_string();
            }
        }
        strip_type_suffix(&self.value)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|date_time| date_time.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Removes an inline `"^^xsd:type` suffix from a lexical value.
#[must_use]
pub fn strip_type_suffix(value: &str) -> String {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| Regex::new(r#""?\^\^.*$"#).expect("valid regex"));
    suffix.replace(value, "").into_owned()
}

/// Object of a statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Resource(Iri),
    Literal(Literal),
}

impl Term {
    #[must_use]
    pub fn as_resource(&self) -> Option<&Iri> {
        match self {
            Self::Resource(iri) => Some(iri),
            Self::Literal(_) => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::Resource(_) => None,
        }
    }

    /// Lexical form: the IRI for resources, the value for literals.
    #[must_use]
    pub fn lexical(&self) -> &str {
        match self {
            Self::Resource(iri) => iri.as_str(),
            Self::Literal(literal) => literal.value(),
        }
    }

    /// Compares resources by IRI and literals by lexical value only.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Resource(a), Self::Resource(b)) => a == b,
            (Self::Literal(a), Self::Literal(b)) => a.value() == b.value(),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub predicate: Iri,
    pub object: Term,
}

/// OWL declarations a top-level element can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Class,
    NamedIndividual,
    AnnotationProperty,
    DatatypeProperty,
    ObjectProperty,
    Axiom,
}

impl ElementKind {
    pub const ALL: [Self; 6] = [
        Self::Class,
        Self::NamedIndividual,
        Self::AnnotationProperty,
        Self::DatatypeProperty,
        Self::ObjectProperty,
        Self::Axiom,
    ];

    /// Local name of the declaring OWL class.
    #[must_use]
    pub fn owl_name(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::NamedIndividual => "NamedIndividual",
            Self::AnnotationProperty => "AnnotationProperty",
            Self::DatatypeProperty => "DatatypeProperty",
            Self::ObjectProperty => "ObjectProperty",
            Self::Axiom => "Axiom",
        }
    }

    fn matches(self, iri: &str) -> bool {
        iri.strip_prefix(OWL) == Some(self.owl_name())
    }
}

/// One top-level description of a resource, with the statements made about it.
///
/// Elements without an IRI are blank nodes, such as reified `owl:Axiom`s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    iri: Option<Iri>,
    declared: Vec<Iri>,
    statements: Vec<Statement>,
}

impl Element {
    #[must_use]
    pub fn new(iri: Option<Iri>) -> Self {
        Self {
            iri,
            declared: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Records the element tag (`owl:Class`, a typed-node class, ...).
    pub fn declare(&mut self, tag: Iri) {
        if !self.declared.contains(&tag) {
            self.declared.push(tag);
        }
    }

    pub fn push(&mut self, predicate: Iri, object: Term) {
        self.statements.push(Statement { predicate, object });
    }

    /// Appends the declarations and statements of another description of the
    /// same resource.
    pub fn merge(&mut self, other: Self) {
        for tag in other.declared {
            self.declare(tag);
        }
        self.statements.extend(other.statements);
    }

    #[must_use]
    pub fn iri(&self) -> Option<&Iri> {
        self.iri.as_ref()
    }

    #[must_use]
    pub fn has_kind(&self, kind: ElementKind) -> bool {
        self.declared.iter().any(|tag| kind.matches(tag.as_str()))
            || self
                .values(RDF_TYPE)
                .filter_map(Term::as_resource)
                .any(|class| kind.matches(class.as_str()))
    }

    pub fn values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.statements
            .iter()
            .filter(move |statement| statement.predicate.as_str() == predicate)
            .map(|statement| &statement.object)
    }

    #[must_use]
    pub fn has_value(&self, predicate: &str) -> bool {
        self.values(predicate).next().is_some()
    }

    /// Resource values of a predicate, deduplicated in document order.
    #[must_use]
    pub fn resources(&self, predicate: &str) -> Vec<Iri> {
        let mut result: Vec<Iri> = Vec::new();
        for iri in self.values(predicate).filter_map(Term::as_resource) {
            if !result.contains(iri) {
                result.push(iri.clone());
            }
        }
        result
    }

    #[must_use]
    pub fn first_literal<'a>(&'a self, predicate: &'a str) -> Option<&'a Literal> {
        self.values(predicate).find_map(Term::as_literal)
    }

    /// Direct classes of the resource, excluding OWL/RDF bookkeeping types.
    #[must_use]
    pub fn types(&self) -> Vec<Iri> {
        let mut result: Vec<Iri> = Vec::new();
        let declared = self.declared.iter().cloned();
        for class in declared.chain(self.resources(RDF_TYPE)) {
            if !is_builtin(class.as_str()) && !result.contains(&class) {
                result.push(class);
            }
        }
        result
    }

    #[must_use]
    pub fn superclasses(&self) -> Vec<Iri> {
        self.resources(RDFS_SUBCLASS_OF)
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.first_literal(RDFS_LABEL)
            .map(Literal::value)
            .filter(|label| !label.is_empty())
    }

    /// First value of the property named by `field`, compared by full IRI and
    /// then by local name.
    #[must_use]
    pub fn value_of_field(&self, field: &str) -> Option<&Term> {
        let local = field.rsplit(['#', '/']).next().unwrap_or(field);
        self.statements
            .iter()
            .find(|statement| statement.predicate.as_str() == field)
            .or_else(|| {
                self.statements
                    .iter()
                    .find(|statement| statement.predicate.local_name() == local)
            })
            .map(|statement| &statement.object)
    }
}

/// A reified `(source, property, target)` statement with its annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Axiom {
    pub source: Iri,
    pub property: Iri,
    pub target: Term,
    pub ref_num: Option<i64>,
    /// Property of the target that holds the actual value.
    pub field: Option<String>,
}

impl Axiom {
    /// Reads an `owl:Axiom` element, or returns `None` if it is incomplete.
    #[must_use]
    pub fn from_element(element: &Element, duo: &Duo) -> Option<Self> {
        if !element.has_kind(ElementKind::Axiom) {
            return None;
        }
        let source = element
            .values(OWL_ANNOTATED_SOURCE)
            .find_map(Term::as_resource)?
            .clone();
        let property = element
            .values(OWL_ANNOTATED_PROPERTY)
            .find_map(Term::as_resource)?
            .clone();
        let target = element.values(OWL_ANNOTATED_TARGET).next()?.clone();
        let ref_num = element
            .first_literal(duo.ref_num.as_str())
            .and_then(|literal| strip_type_suffix(literal.value()).trim().parse().ok());
        let field = element
            .values(duo.annotation_field.as_str())
            .next()
            .map(|term| strip_type_suffix(term.lexical()))
            .filter(|field| !field.is_empty());

        Some(Self {
            source,
            property,
            target,
            ref_num,
            field,
        })
    }
}

/// Which kind of node field a declared property produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldCategory {
    /// Annotation property below the `field` marker.
    Annotation,
    /// Datatype property below the `literal_field` marker.
    Datatype,
    /// Object property below the `reference_field` marker.
    Object,
}

impl FieldCategory {
    /// Categories in the order their fields are built.
    pub const ALL: [Self; 3] = [Self::Annotation, Self::Datatype, Self::Object];

    #[must_use]
    pub fn declaring_kind(self) -> ElementKind {
        match self {
            Self::Annotation => ElementKind::AnnotationProperty,
            Self::Datatype => ElementKind::DatatypeProperty,
            Self::Object => ElementKind::ObjectProperty,
        }
    }

    fn marker(self, duo: &Duo) -> &Iri {
        match self {
            Self::Annotation => &duo.annotation_field,
            Self::Datatype => &duo.datatype_field,
            Self::Object => &duo.object_field,
        }
    }
}

/// A property declaration that maps to a node field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldProperty {
    pub iri: Iri,
    pub category: FieldCategory,
}

impl FieldProperty {
    /// Classifies a property declaration by its `subPropertyOf` marker.
    #[must_use]
    pub fn classify(element: &Element, category: FieldCategory, duo: &Duo) -> Option<Self> {
        let iri = element.iri()?;
        if !element.has_kind(category.declaring_kind()) {
            return None;
        }
        element
            .resources(RDFS_SUBPROPERTY_OF)
            .contains(category.marker(duo))
            .then(|| Self {
                iri: iri.clone(),
                category,
            })
    }
}
