use std::collections::BTreeMap;

use super::entities::{Axiom, Term};
use super::value_objects::Iri;

/// Axioms about one source resource, grouped by annotated property.
///
/// Built once per entity so that ordering and disambiguation lookups for all
/// of its properties share a single pass over the axioms.
#[derive(Clone, Debug, Default)]
pub struct AxiomIndex {
    by_property: BTreeMap<Iri, Vec<Axiom>>,
}

impl AxiomIndex {
    /// Groups axioms (in discovery order) by property and orders each group.
    #[must_use]
    pub fn build(axioms: impl IntoIterator<Item = Axiom>) -> Self {
        let mut by_property: BTreeMap<Iri, Vec<Axiom>> = BTreeMap::new();
        for axiom in axioms {
            by_property
                .entry(axiom.property.clone())
                .or_default()
                .push(axiom);
        }
        for group in by_property.values_mut() {
            order_axioms(group);
        }
        Self { by_property }
    }

    /// Axioms for a property, ordered by `ref_num`.
    #[must_use]
    pub fn for_property(&self, property: &Iri) -> &[Axiom] {
        self.by_property
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn with_target(&self, property: &Iri, target: &Term) -> Option<&Axiom> {
        self.for_property(property)
            .iter()
            .find(|axiom| axiom.target.same_value(target))
    }

    /// Orders asserted values by their axioms: axiom targets first, in axiom
    /// order, then the remaining values in encounter order.
    #[must_use]
    pub fn order_values(&self, property: &Iri, values: Vec<Term>) -> Vec<Term> {
        let mut remaining: Vec<Option<Term>> = values.into_iter().map(Some).collect();
        let mut result = Vec::with_capacity(remaining.len());

        for axiom in self.for_property(property) {
            let matched = remaining.iter_mut().find(|slot| {
                slot.as_ref()
                    .is_some_and(|value| value.same_value(&axiom.target))
            });
            if let Some(value) = matched.and_then(Option::take) {
                result.push(value);
            }
        }
        result.extend(remaining.into_iter().flatten());
        result
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_property.is_empty()
    }
}

/// Sorts annotated axioms by ascending `ref_num`; un-annotated ones follow in
/// discovery order.
pub fn order_axioms(axioms: &mut [Axiom]) {
    axioms.sort_by_key(|axiom| match axiom.ref_num {
        Some(index) => (0, index),
        None => (1, 0),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::entities::Literal;

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn literal(value: &str) -> Term {
        Term::Literal(Literal::new(value))
    }

    fn axiom(target: &str, ref_num: Option<i64>) -> Axiom {
        Axiom {
            source: iri("ex:Thing1"),
            property: iri("http://www.lha.org/duo#step"),
            target: literal(target),
            ref_num,
            field: None,
        }
    }

    #[test]
    fn values_follow_ref_num_and_unannotated_values_come_last() {
        let property = iri("http://www.lha.org/duo#step");
        let index = AxiomIndex::build(vec![
            axiom("second", Some(2)),
            axiom("first", Some(1)),
            axiom("third", Some(3)),
        ]);

        let ordered = index.order_values(
            &property,
            vec![
                literal("loose"),
                literal("third"),
                literal("first"),
                literal("second"),
            ],
        );

        let lexical: Vec<&str> = ordered.iter().map(Term::lexical).collect();
        assert_eq!(lexical, vec!["first", "second", "third", "loose"]);
    }

    #[test]
    fn unannotated_axioms_keep_discovery_order_after_annotated_ones() {
        let mut axioms = vec![
            axiom("b", None),
            axiom("z", Some(5)),
            axiom("a", None),
            axiom("y", Some(1)),
        ];
        order_axioms(&mut axioms);
        let targets: Vec<&str> = axioms.iter().map(|axiom| axiom.target.lexical()).collect();
        assert_eq!(targets, vec!["y", "z", "b", "a"]);
    }

    #[test]
    fn axioms_without_asserted_values_are_ignored() {
        let property = iri("http://www.lha.org/duo#step");
        let index = AxiomIndex::build(vec![axiom("ghost", Some(1))]);
        let ordered = index.order_values(&property, vec![literal("real")]);
        assert_eq!(ordered, vec![literal("real")]);
    }

    #[test]
    fn lookup_by_target() {
        let property = iri("http://www.lha.org/duo#step");
        let index = AxiomIndex::build(vec![axiom("first", Some(1))]);
        assert!(index.with_target(&property, &literal("first")).is_some());
        assert!(index
            .with_target(&iri("http://www.lha.org/duo#other"), &literal("first"))
            .is_none());
    }
}
