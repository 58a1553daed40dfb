//! Fixture sources shared by unit and integration tests.

use std::io::Write;

use tempfile::NamedTempFile;

pub const EX: &str = "http://example.org/ns#";

/// Full IRI of a fixture resource.
#[must_use]
pub fn ex(local: &str) -> String {
    format!("{EX}{local}")
}

/// Sample ontology over the DUO anchors.
///
/// - vocabulary `Color` with `Red` (parent `Warm`) and `Warm`
/// - bundle class `Article` with subclasses `News` and `Breaking`
/// - `Thing1`: an article with a title and nothing else
/// - `Thing2`: an article with ordered keywords, a date, a forward reference
///   to `Thing3`, a tag, a file, a generic entity and a dangling reference;
///   its `reviewer` entity has no `field` axiom and its `attachment` file has
///   no `uri`, so both fields are dropped with a warning
/// - `Thing3`: an article that is also tagged `Red`
pub const SAMPLE_ONTOLOGY: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns="http://example.org/ns#"
     xml:base="http://example.org/ns"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:duo="http://www.lha.org/duo#">
    <owl:Ontology rdf:about="http://example.org/ns"/>

    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#title"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#alias"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#content"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#summary"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#ref_num"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#uri"/>
    <owl:AnnotationProperty rdf:about="http://www.lha.org/duo#field"/>
    <owl:DatatypeProperty rdf:about="http://www.lha.org/duo#literal_field"/>
    <owl:ObjectProperty rdf:about="http://www.lha.org/duo#reference_field"/>

    <owl:AnnotationProperty rdf:about="http://example.org/ns#subtitle">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#field"/>
    </owl:AnnotationProperty>
    <owl:DatatypeProperty rdf:about="http://example.org/ns#keyword">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#literal_field"/>
    </owl:DatatypeProperty>
    <owl:DatatypeProperty rdf:about="http://example.org/ns#published">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#literal_field"/>
    </owl:DatatypeProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#related">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#color">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#mentions">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#author">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#image">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#reviewer">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:ObjectProperty rdf:about="http://example.org/ns#attachment">
        <rdfs:subPropertyOf rdf:resource="http://www.lha.org/duo#reference_field"/>
    </owl:ObjectProperty>
    <owl:DatatypeProperty rdf:about="http://example.org/ns#name"/>

    <owl:Class rdf:about="http://www.lha.org/duo#Node"/>
    <owl:Class rdf:about="http://www.lha.org/duo#Vocabulary"/>
    <owl:Class rdf:about="http://www.lha.org/duo#File"/>
    <owl:Class rdf:about="http://www.lha.org/duo#Entity"/>

    <owl:Class rdf:about="http://example.org/ns#Color">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Vocabulary"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Red">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Color"/>
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Warm"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Warm">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Color"/>
    </owl:Class>

    <owl:Class rdf:about="http://example.org/ns#Article">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Node"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#News">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Article"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Breaking">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#News"/>
    </owl:Class>

    <owl:Class rdf:about="http://example.org/ns#Media">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#File"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Image">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Media"/>
        <rdfs:label>images</rdfs:label>
    </owl:Class>

    <owl:Class rdf:about="http://example.org/ns#Person">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Entity"/>
    </owl:Class>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Thing1">
        <rdf:type rdf:resource="http://example.org/ns#Article"/>
        <duo:title>Hello</duo:title>
    </owl:NamedIndividual>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Thing2">
        <rdf:type rdf:resource="http://example.org/ns#Article"/>
        <duo:title>Second</duo:title>
        <duo:alias>thing-two</duo:alias>
        <duo:content>Body text</duo:content>
        <duo:summary>Short</duo:summary>
        <subtitle>More of it</subtitle>
        <keyword>beta</keyword>
        <keyword>delta</keyword>
        <keyword>alpha</keyword>
        <keyword>gamma</keyword>
        <published rdf:datatype="http://www.w3.org/2001/XMLSchema#dateTime">2017-03-04T10:11:12</published>
        <related rdf:resource="http://example.org/ns#Thing3"/>
        <related rdf:resource="http://example.org/ns#Ghost"/>
        <color rdf:resource="http://example.org/ns#Red"/>
        <mentions rdf:resource="http://example.org/ns#Ghost"/>
        <author rdf:resource="http://example.org/ns#Alice"/>
        <image rdf:resource="http://example.org/ns#Photo1"/>
        <reviewer rdf:resource="http://example.org/ns#Bob"/>
        <attachment rdf:resource="http://example.org/ns#Photo2"/>
    </owl:NamedIndividual>

    <owl:Axiom>
        <owl:annotatedSource rdf:resource="http://example.org/ns#Thing2"/>
        <owl:annotatedProperty rdf:resource="http://example.org/ns#keyword"/>
        <owl:annotatedTarget>gamma</owl:annotatedTarget>
        <duo:ref_num>3</duo:ref_num>
    </owl:Axiom>
    <owl:Axiom>
        <owl:annotatedSource rdf:resource="http://example.org/ns#Thing2"/>
        <owl:annotatedProperty rdf:resource="http://example.org/ns#keyword"/>
        <owl:annotatedTarget>beta</owl:annotatedTarget>
        <duo:ref_num>2</duo:ref_num>
    </owl:Axiom>
    <owl:Axiom>
        <owl:annotatedSource rdf:resource="http://example.org/ns#Thing2"/>
        <owl:annotatedProperty rdf:resource="http://example.org/ns#keyword"/>
        <owl:annotatedTarget>alpha</owl:annotatedTarget>
        <duo:ref_num>1</duo:ref_num>
    </owl:Axiom>
    <owl:Axiom>
        <owl:annotatedSource rdf:resource="http://example.org/ns#Thing2"/>
        <owl:annotatedProperty rdf:resource="http://example.org/ns#author"/>
        <owl:annotatedTarget rdf:resource="http://example.org/ns#Alice"/>
        <duo:field>http://example.org/ns#name</duo:field>
    </owl:Axiom>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Thing3">
        <rdf:type rdf:resource="http://example.org/ns#Article"/>
        <rdf:type rdf:resource="http://example.org/ns#Red"/>
        <rdfs:label>Third</rdfs:label>
        <duo:title>Third</duo:title>
    </owl:NamedIndividual>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Alice">
        <rdf:type rdf:resource="http://example.org/ns#Person"/>
        <name>Alice Smith</name>
    </owl:NamedIndividual>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Bob">
        <rdf:type rdf:resource="http://example.org/ns#Person"/>
        <name>Bob Jones</name>
    </owl:NamedIndividual>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Photo1">
        <rdf:type rdf:resource="http://example.org/ns#Image"/>
        <duo:uri>photo.png</duo:uri>
    </owl:NamedIndividual>

    <owl:NamedIndividual rdf:about="http://example.org/ns#Photo2">
        <rdf:type rdf:resource="http://example.org/ns#Image"/>
    </owl:NamedIndividual>
</rdf:RDF>
"#;

/// Ontology written with DTD entities, an XML literal body and an anonymous
/// restriction that cannot be mapped.
pub const ENTITY_ONTOLOGY: &str = r#"<?xml version="1.0"?>
<!DOCTYPE rdf:RDF [
    <!ENTITY duo "http://www.lha.org/duo#" >
    <!ENTITY ex "http://example.org/ns#" >
]>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:duo="http://www.lha.org/duo#">
    <owl:Class rdf:about="&duo;Node"/>
    <owl:Class rdf:about="&ex;Article">
        <rdfs:subClassOf rdf:resource="&duo;Node"/>
        <rdfs:subClassOf>
            <owl:Restriction>
                <owl:onProperty rdf:resource="&duo;title"/>
            </owl:Restriction>
        </rdfs:subClassOf>
    </owl:Class>
    <owl:NamedIndividual rdf:about="&ex;Thing1">
        <rdf:type rdf:resource="&ex;Article"/>
        <duo:title>Hello &amp; welcome</duo:title>
        <duo:content rdf:parseType="Literal"><p>Body text</p></duo:content>
    </owl:NamedIndividual>
</rdf:RDF>
"#;

/// One vocabulary and one node. Importing it into a store that already holds
/// `Thing1` fails without overwrite after the vocabulary was written.
pub const SMALL_ONTOLOGY: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:duo="http://www.lha.org/duo#">
    <owl:Class rdf:about="http://www.lha.org/duo#Node"/>
    <owl:Class rdf:about="http://www.lha.org/duo#Vocabulary"/>
    <owl:Class rdf:about="http://example.org/ns#Color">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Vocabulary"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Red">
        <rdfs:subClassOf rdf:resource="http://example.org/ns#Color"/>
    </owl:Class>
    <owl:Class rdf:about="http://example.org/ns#Article">
        <rdfs:subClassOf rdf:resource="http://www.lha.org/duo#Node"/>
    </owl:Class>
    <owl:NamedIndividual rdf:about="http://example.org/ns#Thing1">
        <rdf:type rdf:resource="http://example.org/ns#Article"/>
        <duo:title>Hello</duo:title>
    </owl:NamedIndividual>
</rdf:RDF>
"#;

/// Truncated ontology.
pub const MALFORMED_ONTOLOGY: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:owl="http://www.w3.org/2002/07/owl#">
    <owl:Class rdf:about="http://www.lha.org/duo#Node">
"#;

/// Tagged document with one vocabulary and two nodes, the first referencing
/// the second.
pub const SAMPLE_DOCUMENT: &str = r#"{
  "vocabularies": [
    {
      "vid": "Color",
      "tags": [
        { "name": "Red", "parents": ["Warm"] },
        { "name": "Warm", "parents": [] }
      ]
    }
  ],
  "nodes": [
    {
      "title": "Hello",
      "type": "article",
      "uuid": "doc-1",
      "alias": "hello",
      "fields": [
        { "field_name": "body", "value": { "value": "Body text", "summary": null, "format": "full_html" } },
        { "field_name": "field_related", "value": ["doc-2"], "references": "node" },
        { "field_name": "field_tags", "value": [{ "vid": "Color", "name": "Red" }], "references": "taxonomy_term" },
        { "field_name": "field_image", "value": { "uri": "public://photo.png" }, "references": "file" }
      ]
    },
    {
      "title": "World",
      "type": "article",
      "uuid": "doc-2",
      "fields": []
    }
  ]
}
"#;

/// Writes `content` to a temporary file ending in `suffix`, e.g. `.owl`.
///
/// # Panics
///
/// When the temporary file cannot be written.
#[must_use]
pub fn write_fixture(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("ontology-importer-")
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(content.as_bytes()).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}
