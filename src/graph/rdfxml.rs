//! Pull reader for OWL ontologies serialized as RDF/XML.
//!
//! The reader yields one top-level description at a time, so a caller can
//! decide whether to keep it (in-memory graph) or look at it and drop it
//! (streaming graph). Internal DTD entities are expanded in attribute values
//! and text. `rdf:parseType="Literal"` content is kept as an XML literal;
//! any other nested description inside a property element is not mapped and
//! is reported through [`ElementReader::into_skipped`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};
use regex::Regex;

use crate::ontology::vocabulary::{RDF, RDF_DESCRIPTION, RDF_TYPE};
use crate::ontology::{Element, Iri, Literal, Term};
use crate::{Error, Result};

const RDF_ROOT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#RDF";
const RDF_ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
const RDF_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#ID";
const RDF_NODE_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nodeID";
const RDF_RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";
const RDF_DATATYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#datatype";
const RDF_PARSE_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#parseType";
const RDF_XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";
const XML_BASE: &str = "xml:base";
const XML_LANG: &str = "xml:lang";

/// Start tag with namespace-resolved names.
#[derive(Debug)]
struct OpenTag {
    name: String,
    attributes: Vec<(String, String)>,
}

impl OpenTag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

enum Step {
    Open(OpenTag, bool),
    Close,
    Text(String),
    Skip,
    Eof,
}

pub struct ElementReader<R: BufRead> {
    reader: NsReader<R>,
    path: PathBuf,
    buf: Vec<u8>,
    base: Option<String>,
    in_root: bool,
    done: bool,
    entities: HashMap<String, String>,
    skipped: Vec<String>,
}

impl ElementReader<BufReader<File>> {
    /// Opens a file for a single pass over its top-level elements.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> ElementReader<R> {
    pub fn new(source: R, path: impl Into<PathBuf>) -> Self {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            path: path.into(),
            buf: Vec::new(),
            base: None,
            in_root: false,
            done: false,
            entities: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Statements dropped because their content could not be mapped, one
    /// message per predicate and subject.
    #[must_use]
    pub fn into_skipped(self) -> Vec<String> {
        self.skipped
    }

    /// Returns the next top-level description, or `None` at the end of the
    /// document.
    pub fn next_element(&mut self) -> Result<Option<Element>> {
        while !self.done {
            match self.step()? {
                Step::Open(tag, empty) if !self.in_root => {
                    if tag.name == RDF_ROOT {
                        self.base = tag.attr(XML_BASE).map(str::to_string);
                        self.in_root = !empty;
                        self.done = empty;
                    } else {
                        // A bare node element is a document with one description.
                        self.done = true;
                        return self.read_description(&tag, empty).map(Some);
                    }
                }
                Step::Open(tag, empty) => return self.read_description(&tag, empty).map(Some),
                Step::Close => {
                    self.in_root = false;
                    self.done = true;
                }
                Step::Eof => {
                    if self.in_root {
                        return Err(self.unexpected_eof());
                    }
                    self.done = true;
                }
                Step::Text(_) | Step::Skip => {}
            }
        }
        Ok(None)
    }

    fn step(&mut self) -> Result<Step> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf);
        let entities = &self.entities;
        let step = match event {
            Ok(Event::Start(start)) => Step::Open(
                open_tag(&self.reader, &start, entities)
                    .map_err(|err| parse_error(&self.path, &err))?,
                false,
            ),
            Ok(Event::Empty(start)) => Step::Open(
                open_tag(&self.reader, &start, entities)
                    .map_err(|err| parse_error(&self.path, &err))?,
                true,
            ),
            Ok(Event::End(_)) => Step::Close,
            Ok(Event::Text(text)) => Step::Text(
                text.unescape_with(|name| resolve_entity(entities, name))
                    .map_err(|err| parse_error(&self.path, &err))?
                    .into_owned(),
            ),
            Ok(Event::CData(data)) => Step::Text(String::from_utf8_lossy(&data).into_owned()),
            Ok(Event::DocType(doctype)) => {
                let declarations = entity_declarations(&String::from_utf8_lossy(&doctype));
                self.entities.extend(declarations);
                Step::Skip
            }
            Ok(Event::Eof) => Step::Eof,
            Ok(_) => Step::Skip,
            Err(err) => return Err(parse_error(&self.path, &err)),
        };
        Ok(step)
    }

    fn read_description(&mut self, tag: &OpenTag, empty: bool) -> Result<Element> {
        let mut element = self.start_element(tag)?;
        if empty {
            return Ok(element);
        }
        loop {
            match self.step()? {
                Step::Open(child, child_empty) => {
                    self.read_property(&mut element, &child, child_empty)?;
                }
                Step::Close => return Ok(element),
                Step::Eof => return Err(self.unexpected_eof()),
                Step::Text(_) | Step::Skip => {}
            }
        }
    }

    fn start_element(&self, tag: &OpenTag) -> Result<Element> {
        let subject = if let Some(about) = tag.attr(RDF_ABOUT) {
            Some(self.resolve(about)?)
        } else if let Some(id) = tag.attr(RDF_ID) {
            Some(self.resolve(&format!("#{id}"))?)
        } else {
            None
        };

        let mut element = Element::new(subject);
        if tag.name != RDF_DESCRIPTION {
            element.declare(self.iri(&tag.name)?);
        }

        for (key, value) in &tag.attributes {
            if key.starts_with("xml:") || (key.starts_with(RDF) && key != RDF_TYPE) {
                continue;
            }
            if !key.contains(':') {
                continue;
            }
            let predicate = self.iri(key)?;
            let object = if key == RDF_TYPE {
                Term::Resource(self.resolve(value)?)
            } else {
                Term::Literal(Literal::new(value.clone()))
            };
            element.push(predicate, object);
        }
        Ok(element)
    }

    fn read_property(&mut self, element: &mut Element, tag: &OpenTag, empty: bool) -> Result<()> {
        let predicate = self.iri(&tag.name)?;

        if let Some(resource) = tag.attr(RDF_RESOURCE) {
            let resource = self.resolve(resource)?;
            if !empty {
                self.skip_to_close()?;
            }
            element.push(predicate, Term::Resource(resource));
            return Ok(());
        }
        if tag.attr(RDF_NODE_ID).is_some() {
            if !empty {
                self.skip_to_close()?;
            }
            return Ok(());
        }

        if tag.attr(RDF_PARSE_TYPE) == Some("Literal") {
            let markup = if empty { String::new() } else { self.read_markup()? };
            let literal = Literal::new(markup).with_datatype(self.iri(RDF_XML_LITERAL)?);
            element.push(predicate, Term::Literal(literal));
            return Ok(());
        }

        let mut text = String::new();
        let mut nested = false;
        if !empty {
            loop {
                match self.step()? {
                    Step::Text(chunk) => text.push_str(&chunk),
                    Step::Open(_, child_empty) => {
                        nested = true;
                        if !child_empty {
                            self.skip_to_close()?;
                        }
                    }
                    Step::Close => break,
                    Step::Eof => return Err(self.unexpected_eof()),
                    Step::Skip => {}
                }
            }
        }
        if nested || tag.attr(RDF_PARSE_TYPE).is_some() {
            self.skip_statement(element, &predicate);
            return Ok(());
        }

        let mut literal = Literal::new(text);
        if let Some(datatype) = tag.attr(RDF_DATATYPE) {
            literal = literal.with_datatype(self.resolve(datatype)?);
        }
        if let Some(language) = tag.attr(XML_LANG) {
            literal = literal.with_language(language);
        }
        element.push(predicate, Term::Literal(literal));
        Ok(())
    }

    fn skip_statement(&mut self, element: &Element, predicate: &Iri) {
        let subject = element
            .iri()
            .map_or_else(|| "a blank node".to_string(), |iri| format!("'{}'", iri.local_name()));
        let message = format!(
            "Statement '{}' of {subject} has nested content and was skipped.",
            predicate.local_name()
        );
        if !self.skipped.contains(&message) {
            self.skipped.push(message);
        }
    }

    /// Copies the markup up to the end tag of the current element verbatim.
    fn read_markup(&mut self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let mut depth = 0usize;
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|err| parse_error(&self.path, &err))?;
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => break,
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(Error::parse(&self.path, "unexpected end of document"));
                }
                _ => {}
            }
            writer
                .write_event(event)
                .map_err(|err| parse_error(&self.path, &err))?;
        }
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Consumes events up to and including the end tag of the current element.
    fn skip_to_close(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.step()? {
                Step::Open(_, false) => depth += 1,
                Step::Close if depth == 0 => return Ok(()),
                Step::Close => depth -= 1,
                Step::Eof => return Err(self.unexpected_eof()),
                Step::Open(_, true) | Step::Text(_) | Step::Skip => {}
            }
        }
    }

    /// Resolves a possibly relative reference against `xml:base`.
    fn resolve(&self, reference: &str) -> Result<Iri> {
        let reference = reference.trim();
        let absolute = match (&self.base, reference.chars().next()) {
            (Some(base), Some('#')) => {
                let base = base.split('#').next().unwrap_or(base);
                format!("{base}{reference}")
            }
            (Some(base), _) if !has_scheme(reference) => {
                let directory = base.rfind('/').map_or(base.as_str(), |at| &base[..=at]);
                format!("{directory}{reference}")
            }
            _ => reference.to_string(),
        };
        self.iri(&absolute)
    }

    fn iri(&self, value: &str) -> Result<Iri> {
        Iri::new(value).map_err(|err| Error::parse(&self.path, err.to_string()))
    }

    fn unexpected_eof(&self) -> Error {
        Error::parse(&self.path, "unexpected end of document")
    }
}

impl<R: BufRead> Iterator for ElementReader<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_element() {
            Ok(element) => element.map(Ok),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn has_scheme(reference: &str) -> bool {
    reference.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn parse_error(path: &Path, err: &dyn std::fmt::Display) -> Error {
    Error::parse(path, err.to_string())
}

/// `<!ENTITY name "value">` declarations of an internal DTD subset.
fn entity_declarations(doctype: &str) -> Vec<(String, String)> {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY.get_or_init(|| {
        Regex::new(r#"<!ENTITY\s+([A-Za-z_][\w.-]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
            .expect("valid regex")
    });
    entity
        .captures_iter(doctype)
        .map(|captures| {
            let value = captures.get(2).or_else(|| captures.get(3));
            (
                captures[1].to_string(),
                value.map_or_else(String::new, |value| value.as_str().to_string()),
            )
        })
        .collect()
}

fn resolve_entity<'a>(entities: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

fn open_tag<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> quick_xml::Result<OpenTag> {
    let (namespace, local) = reader.resolve_element(start.name());
    let name = qualified(namespace, local.as_ref());

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let raw = attribute.key.as_ref();
        if raw.starts_with(b"xmlns") {
            continue;
        }
        let key = if raw.starts_with(b"xml:") {
            String::from_utf8_lossy(raw).into_owned()
        } else {
            let (namespace, local) = reader.resolve_attribute(attribute.key);
            qualified(namespace, local.as_ref())
        };
        let value = attribute
            .unescape_value_with(|name| resolve_entity(entities, name))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(OpenTag { name, attributes })
}

fn qualified(namespace: ResolveResult<'_>, local: &[u8]) -> String {
    let local = String::from_utf8_lossy(local);
    match namespace {
        ResolveResult::Bound(namespace) => {
            format!("{}{local}", String::from_utf8_lossy(namespace.as_ref()))
        }
        ResolveResult::Unbound | ResolveResult::Unknown(_) => local.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::ElementReader;
    use crate::ontology::vocabulary::{RDFS_LABEL, RDFS_SUBCLASS_OF, RDF_TYPE, XSD_DATE_TIME};
    use crate::ontology::{ElementKind, Iri, Term};
    use crate::Error;

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn read(document: &str) -> crate::Result<Vec<crate::ontology::Element>> {
        ElementReader::new(document.as_bytes(), "inline.owl").collect()
    }

    const DOCUMENT: &str = r##"<?xml version="1.0"?>
<rdf:RDF xmlns="http://www.lha.org/duo#"
     xml:base="http://www.lha.org/duo"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:duo="http://www.lha.org/duo#">
    <owl:Ontology rdf:about="http://www.lha.org/duo"/>
    <!-- classes -->
    <owl:Class rdf:about="#Red">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Warm"/>
        <rdfs:label>Red &amp; bright</rdfs:label>
        <rdfs:subClassOf>
            <owl:Restriction>
                <owl:onProperty rdf:resource="#tone"/>
            </owl:Restriction>
        </rdfs:subClassOf>
    </owl:Class>
    <owl:NamedIndividual rdf:about="ex:Thing1">
        <rdf:type rdf:resource="http://www.lha.org/duo#Article"/>
        <duo:title xml:lang="en">Hello</duo:title>
        <duo:published rdf:datatype="http://www.w3.org/2001/XMLSchema#dateTime">2017-03-04T10:00:00</duo:published>
    </owl:NamedIndividual>
    <Article rdf:ID="Thing2" rdfs:label="Second"/>
</rdf:RDF>"##;

    #[test]
    fn reads_top_level_descriptions() {
        let elements = read(DOCUMENT).expect("document parses");
        assert_eq!(elements.len(), 4);

        let red = &elements[1];
        assert_eq!(red.iri(), Some(&iri("http://www.lha.org/duo#Red")));
        assert!(red.has_kind(ElementKind::Class));
        assert_eq!(red.superclasses(), vec![iri("http://www.lha.org/duo#Warm")]);
        assert_eq!(red.label(), Some("Red & bright"));
        assert_eq!(red.resources(RDFS_SUBCLASS_OF).len(), 1);
    }

    #[test]
    fn literals_carry_datatype_and_language() {
        let elements = read(DOCUMENT).expect("document parses");
        let thing = &elements[2];
        assert_eq!(thing.types(), vec![iri("http://www.lha.org/duo#Article")]);

        let title = thing
            .first_literal("http://www.lha.org/duo#title")
            .expect("title");
        assert_eq!(title.value(), "Hello");
        assert_eq!(title.language(), Some("en"));

        let published = thing
            .first_literal("http://www.lha.org/duo#published")
            .expect("published");
        assert_eq!(published.datatype(), Some(&iri(XSD_DATE_TIME)));
        assert_eq!(published.to_field_string(), "2017-03-04");
    }

    #[test]
    fn typed_node_elements_declare_their_class() {
        let elements = read(DOCUMENT).expect("document parses");
        let second = &elements[3];
        assert_eq!(second.iri(), Some(&iri("http://www.lha.org/duo#Thing2")));
        assert_eq!(second.types(), vec![iri("http://www.lha.org/duo#Article")]);
        assert_eq!(second.label(), Some("Second"));
        assert!(!second.has_value(RDF_TYPE));
        assert!(second
            .values(RDFS_LABEL)
            .all(|term| matches!(term, Term::Literal(_))));
    }

    #[test]
    fn nested_descriptions_are_reported_once() {
        let mut reader = ElementReader::new(DOCUMENT.as_bytes(), "inline.owl");
        while reader.next_element().expect("document parses").is_some() {}
        assert_eq!(
            reader.into_skipped(),
            vec!["Statement 'subClassOf' of 'Red' has nested content and was skipped.".to_string()]
        );
    }

    const ENTITY_DOCUMENT: &str = r##"<?xml version="1.0"?>
<!DOCTYPE rdf:RDF [
    <!ENTITY duo "http://www.lha.org/duo#" >
    <!ENTITY xsd 'http://www.w3.org/2001/XMLSchema#' >
]>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:duo="http://www.lha.org/duo#">
    <owl:NamedIndividual rdf:about="&duo;Thing1">
        <rdf:type rdf:resource="&duo;Article"/>
        <rdfs:label>Tom &amp; Jerry at &duo;</rdfs:label>
        <duo:published rdf:datatype="&xsd;dateTime">2017-03-04T10:00:00</duo:published>
        <duo:content rdf:parseType="Literal"><p class="lead">Body &amp; text</p><br/></duo:content>
    </owl:NamedIndividual>
</rdf:RDF>"##;

    #[test]
    fn dtd_entities_expand_in_attributes_and_text() {
        let elements = read(ENTITY_DOCUMENT).expect("document parses");
        assert_eq!(elements.len(), 1);

        let thing = &elements[0];
        assert_eq!(thing.iri(), Some(&iri("http://www.lha.org/duo#Thing1")));
        assert_eq!(thing.types(), vec![iri("http://www.lha.org/duo#Article")]);
        assert_eq!(thing.label(), Some("Tom & Jerry at http://www.lha.org/duo#"));
        let published = thing
            .first_literal("http://www.lha.org/duo#published")
            .expect("published");
        assert_eq!(published.datatype(), Some(&iri(XSD_DATE_TIME)));
    }

    #[test]
    fn literal_parse_type_keeps_the_markup() {
        let elements = read(ENTITY_DOCUMENT).expect("document parses");
        let content = elements[0]
            .first_literal("http://www.lha.org/duo#content")
            .expect("content");
        assert_eq!(content.value(), r#"<p class="lead">Body &amp; text</p><br/>"#);
        assert_eq!(
            content.datatype(),
            Some(&iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral"))
        );
    }

    #[test]
    fn undeclared_entities_are_parse_errors() {
        let document = ENTITY_DOCUMENT.replace("&duo;Article", "&foo;Article");
        let err = read(&document).expect_err("unknown entity");
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn truncated_document_is_a_parse_error() {
        let err = read(&DOCUMENT[..DOCUMENT.len() - 12]).expect_err("truncated");
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn empty_root_has_no_elements() {
        let elements =
            read(r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>"#)
                .expect("document parses");
        assert!(elements.is_empty());
    }
}
