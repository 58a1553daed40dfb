//! Field construction for ontology nodes.

use super::nodes::annotation;
use super::records::{
    BodyValue, FieldItem, FieldRecord, FieldValue, FileRef, ReferenceKind, TagRef,
};
use super::OntologySource;
use crate::ontology::entities::strip_type_suffix;
use crate::ontology::{AxiomIndex, Element, ElementKind, Iri, Term};
use crate::warnings::Warnings;
use crate::Result;

impl OntologySource {
    /// `body`, the class tree links, `field_tags`, then one field per declared
    /// field property the entity has values for.
    pub(crate) fn node_fields(
        &self,
        entity: &Iri,
        element: &Element,
        warnings: &Warnings,
    ) -> Result<Vec<FieldRecord>> {
        let mut fields = vec![self.body_field(element)];

        if self.options.links_class_tree() {
            fields.push(self.parent_field(entity, element)?);
            if element.has_kind(ElementKind::Class) {
                fields.push(self.child_field(entity)?);
            }
        }

        if self.descends_from(entity, &self.duo.vocabulary)? {
            fields.push(FieldRecord::new(
                "field_tags",
                FieldValue::References(self.tag_items(entity)?),
                Some(ReferenceKind::TaxonomyTerm),
            ));
        }

        let axioms = AxiomIndex::build(self.graph().axioms_for(entity)?);
        for property in &self.field_properties {
            if !element.has_value(property.iri.as_str()) {
                continue;
            }
            if let Some(field) = self.node_field(entity, element, &property.iri, &axioms, warnings)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    fn body_field(&self, element: &Element) -> FieldRecord {
        FieldRecord::new(
            "body",
            FieldValue::Body(BodyValue::full_html(
                annotation(element, &self.duo.content),
                annotation(element, &self.duo.summary),
            )),
            None,
        )
    }

    /// Nearest node ancestors: superclasses of a class, or types of an
    /// individual, that lie below a bundle class.
    fn parent_field(&self, entity: &Iri, element: &Element) -> Result<FieldRecord> {
        let candidates = if element.has_kind(ElementKind::Class) {
            self.hierarchy.direct_superclasses_of(entity)?
        } else {
            self.graph().types_of(entity)?
        };
        let root = &self.duo.node;
        let mut parents = Vec::new();
        for candidate in candidates {
            if self.hierarchy.has_transitive_superclass(&candidate, root)?
                && !self.hierarchy.has_direct_superclass(&candidate, root)?
            {
                parents.push(FieldItem::Node(candidate.as_str().to_string()));
            }
        }
        Ok(FieldRecord::new(
            "field_parent",
            FieldValue::References(parents),
            Some(ReferenceKind::Node),
        ))
    }

    fn child_field(&self, class: &Iri) -> Result<FieldRecord> {
        let mut children = self.hierarchy.direct_subclasses_of(class)?;
        children.extend(self.graph().instances_of(class)?);
        Ok(FieldRecord::new(
            "field_child",
            FieldValue::References(
                children
                    .into_iter()
                    .map(|child| FieldItem::Node(child.as_str().to_string()))
                    .collect(),
            ),
            Some(ReferenceKind::Node),
        ))
    }

    /// Tags for the types and superclasses of an entity that belong to a
    /// vocabulary.
    fn tag_items(&self, entity: &Iri) -> Result<Vec<FieldItem>> {
        let mut candidates = self.graph().types_of(entity)?;
        candidates.extend(self.hierarchy.direct_superclasses_of(entity)?);

        let mut items = Vec::new();
        for candidate in candidates {
            if !self
                .hierarchy
                .has_transitive_superclass(&candidate, &self.duo.vocabulary)?
            {
                continue;
            }
            if let Some(item) = self.tag_item(&candidate)? {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        Ok(items)
    }

    fn tag_item(&self, tag: &Iri) -> Result<Option<FieldItem>> {
        let Some(vocabulary) = self.vocabulary_for_tag(tag)? else {
            return Ok(None);
        };
        Ok(Some(FieldItem::Tag(TagRef {
            vocabulary_id: vocabulary.local_name().to_string(),
            name: self.display_name(tag)?,
        })))
    }

    /// Literal values win over resource values. Values are ordered by their
    /// axioms; targets that cannot be mapped are skipped with a warning and a
    /// field without any remaining target is omitted.
    fn node_field(
        &self,
        entity: &Iri,
        element: &Element,
        property: &Iri,
        axioms: &AxiomIndex,
        warnings: &Warnings,
    ) -> Result<Option<FieldRecord>> {
        let field_name = property.local_name();
        let (literals, resources): (Vec<Term>, Vec<Term>) = element
            .values(property.as_str())
            .cloned()
            .partition(|term| matches!(term, Term::Literal(_)));

        if !literals.is_empty() {
            let values = axioms
                .order_values(property, literals)
                .iter()
                .filter_map(Term::as_literal)
                .map(|literal| literal.to_field_string())
                .collect();
            return Ok(Some(FieldRecord::new(
                field_name,
                FieldValue::Literals(values),
                None,
            )));
        }

        let mut items = Vec::new();
        let mut kind = None;
        for target in axioms.order_values(property, resources) {
            let Term::Resource(target) = target else {
                continue;
            };
            if let Some((item, item_kind)) =
                self.target_item(entity, property, &target, axioms, warnings)?
            {
                items.push(item);
                kind = item_kind.or(kind);
            }
        }
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(FieldRecord::new(
            field_name,
            FieldValue::References(items),
            kind,
        )))
    }

    /// Classifies one resource target: node, file, tag, or generic entity.
    fn target_item(
        &self,
        entity: &Iri,
        property: &Iri,
        target: &Iri,
        axioms: &AxiomIndex,
        warnings: &Warnings,
    ) -> Result<Option<(FieldItem, Option<ReferenceKind>)>> {
        if self.descends_from(target, &self.duo.node)? {
            return Ok(Some((
                FieldItem::Node(target.as_str().to_string()),
                Some(ReferenceKind::Node),
            )));
        }

        if self.descends_from(target, &self.duo.file)? {
            let Some(uri) = self.file_path(target)? else {
                warnings.warn(format!(
                    "File '{}' referenced by '{}' has no uri.",
                    target.local_name(),
                    entity.local_name()
                ));
                return Ok(None);
            };
            return Ok(Some((
                FieldItem::File(FileRef { uri }),
                Some(ReferenceKind::File),
            )));
        }

        if let Some(item) = self.tag_item(target)? {
            return Ok(Some((item, Some(ReferenceKind::TaxonomyTerm))));
        }

        if self
            .hierarchy
            .is_transitive_instance_of(target, &self.duo.entity)?
        {
            return Ok(self
                .entity_value(entity, property, target, axioms, warnings)?
                .map(|value| (FieldItem::Literal(value), None)));
        }

        warnings.warn(format!(
            "Nonexistent entity '{}' referenced by '{}' and property '{property}'",
            target.local_name(),
            entity.local_name()
        ));
        Ok(None)
    }

    /// Value of a generic entity, read from the property its axiom names.
    fn entity_value(
        &self,
        entity: &Iri,
        property: &Iri,
        target: &Iri,
        axioms: &AxiomIndex,
        warnings: &Warnings,
    ) -> Result<Option<String>> {
        let field = axioms
            .with_target(property, &Term::Resource(target.clone()))
            .and_then(|axiom| axiom.field.as_deref());
        let Some(field) = field else {
            warnings.warn(format!(
                "Entity '{}' by '{}' referenced but no field given. ('{}')",
                target.local_name(),
                entity.local_name(),
                property.local_name()
            ));
            return Ok(None);
        };

        let value = self.graph().element(target)?.and_then(|element| {
            element
                .value_of_field(field)
                .map(|term| strip_type_suffix(term.lexical()))
        });
        if value.is_none() {
            warnings.warn(format!(
                "Entity '{}' has no value for field '{field}'.",
                target.local_name()
            ));
        }
        Ok(value)
    }

    /// `uri` annotation of a file, prefixed by the labels of its file
    /// ancestors, outermost first.
    fn file_path(&self, file: &Iri) -> Result<Option<String>> {
        let Some(element) = self.graph().element(file)? else {
            return Ok(None);
        };
        let Some(uri) = annotation(&element, &self.duo.uri) else {
            return Ok(None);
        };

        let superclasses = self.hierarchy.direct_superclasses_of(file)?;
        let classes = if superclasses.is_empty() {
            self.graph().types_of(file)?
        } else {
            superclasses
        };

        let root = &self.duo.file;
        for class in classes {
            if !self.hierarchy.has_transitive_superclass(&class, root)? {
                continue;
            }
            let mut path = self.display_name(&class)?;
            for ancestor in self.hierarchy.all_superclasses_of(&class)? {
                if self.hierarchy.has_transitive_superclass(&ancestor, root)? {
                    path = format!("{}/{path}", self.display_name(&ancestor)?);
                }
            }
            return Ok(Some(format!("{path}/{uri}")));
        }
        Ok(Some(uri))
    }
}
