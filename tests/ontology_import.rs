use ontology_importer::{
    config::ImportSettings,
    graph::AccessStrategy,
    importer::Importer,
    mapping::{FieldItem, FieldValue, NodeRecord, ReferenceKind, SourceFormat},
    store::{EntityStore, InMemoryEntityStore},
    tests_cfg::{
        ex, write_fixture, ENTITY_ONTOLOGY, MALFORMED_ONTOLOGY, SAMPLE_ONTOLOGY, SMALL_ONTOLOGY,
    },
    Error,
};
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::NamedTempFile;

#[fixture]
fn sample() -> NamedTempFile {
    write_fixture(SAMPLE_ONTOLOGY, ".owl")
}

fn settings(threshold: &str) -> ImportSettings {
    ImportSettings {
        streaming_threshold: threshold.to_string(),
        ..ImportSettings::default()
    }
}

fn node<'a>(nodes: &'a [NodeRecord], local: &str) -> &'a NodeRecord {
    nodes
        .iter()
        .find(|node| node.uuid == ex(local))
        .unwrap_or_else(|| panic!("node {local}"))
}

#[rstest]
#[case("100MB", AccessStrategy::InMemory)]
#[case("0", AccessStrategy::Streaming)]
fn imports_vocabularies_tags_and_nodes(
    sample: NamedTempFile,
    #[case] threshold: &str,
    #[case] strategy: AccessStrategy,
) {
    let mut store = InMemoryEntityStore::new(false);
    let summary = Importer::new(settings(threshold))
        .run(sample.path(), &mut store)
        .expect("import");

    assert_eq!(summary.format, SourceFormat::Ontology);
    assert_eq!(summary.strategy, Some(strategy));
    assert_eq!(
        summary.message(),
        "Success! 1 vocabularies with 2 terms and 3 nodes imported."
    );
    assert_eq!(summary.files, 1);
    assert_eq!(store.count_created_nodes(), 0, "ledger is cleared on commit");

    let tags = store.tags_of("Color");
    let red = store.tag_id("Color", "Red").expect("red");
    let warm = store.tag_id("Color", "Warm").expect("warm");
    assert_eq!(tags.len(), 2);
    let (_, red_tag) = tags.iter().find(|(id, _)| *id == red).expect("red tag");
    assert_eq!(red_tag.parents, vec![warm]);

    let (_, thing1) = store.node_by_uuid(&ex("Thing1")).expect("thing1");
    assert_eq!(thing1.title, "Hello");
    assert_eq!(thing1.bundle, "article");
    assert_eq!(
        thing1.fields["body"],
        json!({ "value": null, "summary": null, "format": "full_html" })
    );

    let (thing3_id, thing3) = store.node_by_uuid(&ex("Thing3")).expect("thing3");
    assert_eq!(thing3.fields["field_tags"], json!([red.0]));

    let (thing2_id, thing2) = store.node_by_uuid(&ex("Thing2")).expect("thing2");
    assert_eq!(store.alias_of(thing2_id), Some("/thing-two"));
    assert_eq!(
        thing2.fields["body"],
        json!({ "value": "Body text", "summary": "Short", "format": "full_html" })
    );
    assert_eq!(thing2.fields["subtitle"], json!(["More of it"]));
    assert_eq!(
        thing2.fields["keyword"],
        json!(["alpha", "beta", "gamma", "delta"])
    );
    assert_eq!(thing2.fields["published"], json!(["2017-03-04"]));
    assert_eq!(thing2.fields["related"], json!([thing3_id.0]));
    assert_eq!(thing2.fields["color"], json!([red.0]));
    assert_eq!(thing2.fields["author"], json!(["Alice Smith"]));
    assert_eq!(thing2.fields["image"][0]["uri"], json!("Media/images/photo.png"));
    assert!(!thing2.fields.contains_key("mentions"));
    assert!(!thing2.fields.contains_key("reviewer"));
    assert!(!thing2.fields.contains_key("attachment"));
}

#[rstest]
fn unmappable_references_warn_once_and_drop_the_field(sample: NamedTempFile) {
    let mut store = InMemoryEntityStore::new(false);
    let summary = Importer::new(ImportSettings::default())
        .run(sample.path(), &mut store)
        .expect("import");

    assert_eq!(
        summary.warnings,
        vec![
            format!(
                "Nonexistent entity 'Ghost' referenced by 'Thing2' and property '{}'",
                ex("related")
            ),
            format!(
                "Nonexistent entity 'Ghost' referenced by 'Thing2' and property '{}'",
                ex("mentions")
            ),
            "Entity 'Bob' by 'Thing2' referenced but no field given. ('reviewer')".to_string(),
            "File 'Photo2' referenced by 'Thing2' has no uri.".to_string(),
        ]
    );
}

#[rstest]
#[case("100MB")]
#[case("0")]
fn dtd_entities_and_xml_literals_are_imported(#[case] threshold: &str) {
    let source = write_fixture(ENTITY_ONTOLOGY, ".owl");
    let mut store = InMemoryEntityStore::new(false);

    let summary = Importer::new(settings(threshold))
        .run(source.path(), &mut store)
        .expect("import");

    assert_eq!(summary.nodes, 1);
    let (_, thing1) = store.node_by_uuid(&ex("Thing1")).expect("thing1");
    assert_eq!(thing1.title, "Hello & welcome");
    assert_eq!(thing1.bundle, "article");
    assert_eq!(thing1.fields["body"]["value"], json!("<p>Body text</p>"));
    assert_eq!(
        summary.warnings,
        vec!["Statement 'subClassOf' of 'Article' has nested content and was skipped.".to_string()]
    );
}

#[rstest]
fn both_strategies_map_identical_records(sample: NamedTempFile) {
    let in_memory = Importer::new(settings("100MB"))
        .records(sample.path())
        .expect("in-memory records");
    let streaming = Importer::new(settings("0"))
        .records(sample.path())
        .expect("streaming records");

    assert_eq!(in_memory.vocabularies, streaming.vocabularies);
    assert_eq!(in_memory.nodes, streaming.nodes);
    assert_eq!(in_memory.warnings, streaming.warnings);
}

#[rstest]
fn plain_article_maps_to_a_body_only_node(sample: NamedTempFile) {
    let dump = Importer::new(ImportSettings::default())
        .records(sample.path())
        .expect("records");

    let thing1 = node(&dump.nodes, "Thing1");
    assert_eq!(thing1.title, "Hello");
    assert_eq!(thing1.bundle, "article");
    assert_eq!(thing1.alias, None);
    let names: Vec<&str> = thing1
        .fields
        .iter()
        .map(|field| field.field_name.as_str())
        .collect();
    assert_eq!(names, vec!["body"]);
}

#[rstest]
fn class_trees_become_linked_nodes(sample: NamedTempFile) {
    let dump = Importer::new(ImportSettings {
        classes_as_nodes: true,
        ..ImportSettings::default()
    })
    .records(sample.path())
    .expect("records");

    let uuids: Vec<&str> = dump.nodes.iter().map(|node| node.uuid.as_str()).collect();
    assert_eq!(
        uuids,
        vec![
            ex("News").as_str(),
            ex("Breaking").as_str(),
            ex("Thing1").as_str(),
            ex("Thing2").as_str(),
            ex("Thing3").as_str(),
        ]
    );

    let news = node(&dump.nodes, "News");
    assert_eq!(news.title, "News");
    let parent = news.field("field_parent").expect("parent");
    assert_eq!(parent.value, FieldValue::References(vec![]));
    let child = news.field("field_child").expect("child");
    assert_eq!(child.references, Some(ReferenceKind::Node));
    assert_eq!(
        child.value,
        FieldValue::References(vec![FieldItem::Node(ex("Breaking"))])
    );

    let breaking = node(&dump.nodes, "Breaking");
    assert_eq!(
        breaking.field("field_parent").expect("parent").value,
        FieldValue::References(vec![FieldItem::Node(ex("News"))])
    );

    let thing1 = node(&dump.nodes, "Thing1");
    assert!(thing1.field("field_parent").is_some());
    assert!(thing1.field("field_child").is_none());
}

#[rstest]
fn only_leaf_classes_skip_tree_links(sample: NamedTempFile) {
    let dump = Importer::new(ImportSettings {
        classes_as_nodes: true,
        only_leaf_classes_as_nodes: true,
        ..ImportSettings::default()
    })
    .records(sample.path())
    .expect("records");

    assert!(dump.nodes.iter().all(|node| node.uuid != ex("News")));
    let breaking = node(&dump.nodes, "Breaking");
    assert!(breaking.field("field_parent").is_none());
    assert!(breaking.field("field_child").is_none());
}

#[rstest]
fn overwrite_makes_imports_idempotent(sample: NamedTempFile) {
    let importer = Importer::new(ImportSettings {
        overwrite: true,
        ..ImportSettings::default()
    });
    let mut store = InMemoryEntityStore::new(true);

    importer.run(sample.path(), &mut store).expect("first run");
    let nodes = store.repository().nodes.len();
    let tags = store.repository().tags.len();
    let files = store.repository().files.len();

    importer.run(sample.path(), &mut store).expect("second run");
    assert_eq!(store.repository().nodes.len(), nodes);
    assert_eq!(store.repository().tags.len(), tags);
    assert_eq!(store.repository().files.len(), files);
    assert_eq!(store.repository().vocabularies.len(), 1);
}

#[test]
fn duplicate_nodes_roll_back_the_run() {
    let source = write_fixture(SMALL_ONTOLOGY, ".owl");
    let mut store = InMemoryEntityStore::new(false);
    store
        .create_node(&NodeRecord::new("Hello", "article", Some(ex("Thing1"))))
        .expect("seed node");
    store.commit();

    let err = Importer::new(ImportSettings::default())
        .run(source.path(), &mut store)
        .expect_err("duplicate");

    assert!(matches!(err, Error::DuplicateEntity { ref uuid } if *uuid == ex("Thing1")));
    assert!(store.repository().vocabularies.is_empty());
    assert!(store.repository().tags.is_empty());
    assert_eq!(store.repository().nodes.len(), 1);
}

#[test]
fn malformed_sources_fail_before_anything_is_written() {
    let source = write_fixture(MALFORMED_ONTOLOGY, ".owl");
    let mut store = InMemoryEntityStore::new(false);

    let err = Importer::new(ImportSettings::default())
        .run(source.path(), &mut store)
        .expect_err("malformed");

    assert!(matches!(err, Error::Parse { .. }));
    assert!(store.repository().vocabularies.is_empty());
    assert!(store.repository().nodes.is_empty());
}

#[rstest]
#[case(".csv")]
#[case(".txt")]
fn unsupported_extensions_are_rejected(#[case] suffix: &str) {
    let source = write_fixture(SAMPLE_ONTOLOGY, suffix);
    let err = Importer::new(ImportSettings::default())
        .run(source.path(), &mut InMemoryEntityStore::new(false))
        .expect_err("unsupported");
    assert!(matches!(err, Error::UnsupportedFormat(_)));
}

#[test]
fn phase_switches_limit_the_run() {
    let source = write_fixture(SAMPLE_ONTOLOGY, ".owl");
    let mut store = InMemoryEntityStore::new(false);

    let summary = Importer::new(ImportSettings {
        import_nodes: false,
        ..ImportSettings::default()
    })
    .run(source.path(), &mut store)
    .expect("import");

    assert_eq!(summary.vocabularies, 1);
    assert_eq!(summary.nodes, 0);
    assert!(store.repository().nodes.is_empty());
}

#[test]
fn fields_outside_the_content_model_are_skipped() {
    let source = write_fixture(SAMPLE_ONTOLOGY, ".owl");
    let mut store = InMemoryEntityStore::new(false).with_bundle("article", ["body", "related"]);

    let summary = Importer::new(ImportSettings::default())
        .run(source.path(), &mut store)
        .expect("import");

    assert!(summary
        .warnings
        .contains(&"field \"keyword\" does not exist in \"article\".".to_string()));
    let (thing3_id, _) = store.node_by_uuid(&ex("Thing3")).expect("thing3");
    let (_, thing2) = store.node_by_uuid(&ex("Thing2")).expect("thing2");
    assert!(!thing2.fields.contains_key("keyword"));
    assert_eq!(thing2.fields["related"], json!([thing3_id.0]));
}
