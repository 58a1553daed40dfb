use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use super::records::NodeRecord;
use super::references::{store_node, ReferenceResolver};
use super::OntologySource;
use crate::ontology::entities::strip_type_suffix;
use crate::ontology::{Element, ElementKind, Iri, Term};
use crate::store::EntityStore;
use crate::warnings::Warnings;
use crate::Result;

/// Bundle machine name for a class local name: lower case, every character
/// outside `[A-Za-z0-9]` replaced by `_`.
#[must_use]
pub fn bundle_name(local_name: &str) -> String {
    static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
    let pattern =
        NON_ALPHANUMERIC.get_or_init(|| Regex::new("[^A-Za-z0-9]").expect("valid regex"));
    pattern.replace_all(local_name, "_").to_lowercase()
}

impl OntologySource {
    /// Entities that become nodes: classes below the bundle classes when
    /// enabled, then every named individual below the node root except
    /// direct members of the root.
    pub fn node_entities(&self) -> Result<Vec<Iri>> {
        let root = &self.duo.node;
        let mut seen = HashSet::new();
        let mut entities = Vec::new();
        let mut select = |iri: Iri| {
            if seen.insert(iri.clone()) {
                entities.push(iri);
            }
        };

        if self.options.classes_as_nodes {
            for bundle_class in self.hierarchy.direct_subclasses_of(root)? {
                let classes = if self.options.only_leaf_classes {
                    self.hierarchy.leaf_subclasses_of(&bundle_class)?
                } else {
                    self.hierarchy.all_subclasses_of(&bundle_class)?
                };
                classes.into_iter().for_each(&mut select);
            }
        }

        for individual in self.graph().all_of_kind(ElementKind::NamedIndividual)? {
            if !self.hierarchy.is_transitive_instance_of(&individual, root)?
                || self.graph().types_of(&individual)?.contains(root)
            {
                continue;
            }
            select(individual);
        }
        Ok(entities)
    }

    /// Bundle of the first bundle class the entity descends from.
    pub fn bundle_of(&self, entity: &Iri) -> Result<Option<String>> {
        for bundle_class in self.hierarchy.direct_subclasses_of(&self.duo.node)? {
            if self.descends_from(entity, &bundle_class)? {
                return Ok(Some(bundle_name(bundle_class.local_name())));
            }
        }
        Ok(None)
    }

    /// Builds the record of one entity, or `None` when it has no bundle.
    pub fn node_record(&self, entity: &Iri, warnings: &Warnings) -> Result<Option<NodeRecord>> {
        let Some(bundle) = self.bundle_of(entity)? else {
            warnings.warn(format!(
                "Content type of '{}' could not be resolved, node skipped.",
                entity.local_name()
            ));
            return Ok(None);
        };
        let element = self
            .graph()
            .element(entity)?
            .map(|element| element.into_owned())
            .unwrap_or_else(|| Element::new(Some(entity.clone())));

        let title = annotation(&element, &self.duo.title)
            .unwrap_or_else(|| entity.local_name().to_string());
        let fields = self.node_fields(entity, &element, warnings)?;

        Ok(Some(
            NodeRecord::new(title, bundle, Some(entity.as_str().to_string()))
                .with_alias(annotation(&element, &self.duo.alias))
                .with_fields(fields),
        ))
    }

    pub fn node_records(&self, warnings: &Warnings) -> Result<Vec<NodeRecord>> {
        let mut records = Vec::new();
        for entity in self.node_entities()? {
            records.extend(self.node_record(&entity, warnings)?);
        }
        Ok(records)
    }

    /// Writes one node per entity, then resolves their references.
    pub fn import_nodes<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        warnings: &Warnings,
    ) -> Result<()> {
        info!("Collecting nodes...");
        let entities = self.node_entities()?;
        info!("Found {} nodes.", entities.len());

        let mut resolver = ReferenceResolver::default();
        for entity in &entities {
            if let Some(record) = self.node_record(entity, warnings)? {
                store_node(store, &record, &mut resolver, warnings)?;
            }
        }

        info!("Adding node references...");
        resolver.resolve(store)?;
        Ok(())
    }
}

/// First value of an annotation property, without inline type suffix.
pub(crate) fn annotation(element: &Element, property: &Iri) -> Option<String> {
    element
        .values(property.as_str())
        .next()
        .map(|term| match term {
            Term::Literal(literal) => literal.to_field_string(),
            Term::Resource(iri) => strip_type_suffix(iri.as_str()),
        })
        .filter(|value| !value.is_empty())
}
