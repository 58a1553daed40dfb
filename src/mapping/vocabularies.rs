use tracing::info;

use super::records::{TagRecord, VocabularyRecord};
use super::OntologySource;
use crate::ontology::Iri;
use crate::store::EntityStore;
use crate::Result;

impl OntologySource {
    /// Direct subclasses of the vocabulary root.
    pub(crate) fn vocabulary_classes(&self) -> Result<Vec<Iri>> {
        self.hierarchy.direct_subclasses_of(&self.duo.vocabulary)
    }

    /// The vocabulary class a tag class belongs to, if any.
    pub(crate) fn vocabulary_for_tag(&self, tag: &Iri) -> Result<Option<Iri>> {
        for vocabulary in self.vocabulary_classes()? {
            if self.hierarchy.all_subclasses_of(&vocabulary)?.contains(tag) {
                return Ok(Some(vocabulary));
            }
        }
        Ok(None)
    }

    /// One record per vocabulary class, with every class below it as a tag.
    pub fn vocabulary_records(&self) -> Result<Vec<VocabularyRecord>> {
        let mut records = Vec::new();
        for class in self.vocabulary_classes()? {
            let vocabulary_id = class.local_name().to_string();
            info!(vocabulary = %vocabulary_id, "collecting terms");

            let mut tags = Vec::new();
            for tag in self.hierarchy.all_subclasses_of(&class)? {
                tags.push(TagRecord {
                    vocabulary_id: vocabulary_id.clone(),
                    name: self.display_name(&tag)?,
                    parent_names: self.parent_tag_names(&tag)?,
                });
            }
            info!(vocabulary = %vocabulary_id, terms = tags.len(), "found terms");

            records.push(VocabularyRecord {
                name: vocabulary_id.clone(),
                vocabulary_id,
                tags,
            });
        }
        Ok(records)
    }

    /// Direct superclasses of a tag, minus the vocabulary root and the
    /// vocabulary classes themselves.
    fn parent_tag_names(&self, tag: &Iri) -> Result<Vec<String>> {
        let root = &self.duo.vocabulary;
        let mut names = Vec::new();
        for parent in self.hierarchy.direct_superclasses_of(tag)? {
            if &parent == root || self.hierarchy.has_direct_superclass(&parent, root)? {
                continue;
            }
            names.push(self.display_name(&parent)?);
        }
        Ok(names)
    }

    pub fn import_vocabularies<S: EntityStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        import_vocabularies(&self.vocabulary_records()?, store)
    }
}

/// Creates every vocabulary and its tags, then links tag parents. Parents
/// are linked by name, so all tags of a vocabulary must exist first.
pub fn import_vocabularies<S: EntityStore + ?Sized>(
    records: &[VocabularyRecord],
    store: &mut S,
) -> Result<()> {
    for vocabulary in records {
        let id = vocabulary.vocabulary_id.as_str();
        info!(vocabulary = id, "handling vocabulary");
        store.create_vocabulary(id, &vocabulary.name)?;

        for tag in &vocabulary.tags {
            if store.tag_exists(id, &tag.name) {
                info!(
                    "Tag '{}' already exists in vocabulary '{id}', enable overwrite if you want \
                     to replace it.",
                    tag.name
                );
                continue;
            }
            store.create_tag(id, &tag.name)?;
        }

        let links = vocabulary.tag_parents();
        if !links.is_empty() {
            info!(vocabulary = id, links = links.len(), "adding parent linkages to terms");
            store.set_tag_parents(id, &links)?;
        }
    }
    Ok(())
}
