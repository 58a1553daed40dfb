//! Class hierarchy closures over a [`GraphAccessor`].
//!
//! Traversals keep a visited set keyed by IRI, so redundant paths and cycles
//! in the subclass graph terminate and never yield duplicates. Closures are
//! recomputed per call for streamed sources and memoized for in-memory ones,
//! whose graph cannot change during a run.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{AccessStrategy, GraphAccessor};
use crate::ontology::Iri;
use crate::Result;

type Memo = RefCell<HashMap<Iri, Vec<Iri>>>;

pub struct ClassHierarchy {
    graph: Box<dyn GraphAccessor>,
    memoize: bool,
    subclasses: Memo,
    superclasses: Memo,
}

impl ClassHierarchy {
    #[must_use]
    pub fn new(graph: Box<dyn GraphAccessor>) -> Self {
        let memoize = graph.strategy() == AccessStrategy::InMemory;
        Self {
            graph,
            memoize,
            subclasses: RefCell::default(),
            superclasses: RefCell::default(),
        }
    }

    /// The accessor the closures are computed over.
    #[must_use]
    pub fn graph(&self) -> &dyn GraphAccessor {
        self.graph.as_ref()
    }

    pub fn direct_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        self.graph.direct_subclasses_of(class)
    }

    pub fn direct_superclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        self.graph.direct_superclasses_of(class)
    }

    /// Every class below `class`, in depth-first pre-order.
    pub fn all_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        self.memoized(&self.subclasses, class, |class| {
            let mut visited = HashSet::from([class.clone()]);
            let mut stack: Vec<Iri> = self.direct_subclasses_of(class)?;
            stack.reverse();
            let mut result = Vec::new();

            while let Some(current) = stack.pop() {
                if !visited.insert(current.clone()) {
                    continue;
                }
                let mut children = self.direct_subclasses_of(&current)?;
                children.reverse();
                stack.extend(children);
                result.push(current);
            }
            Ok(result)
        })
    }

    /// Every class above `class`, nearest first.
    pub fn all_superclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        self.memoized(&self.superclasses, class, |class| {
            let mut visited = HashSet::from([class.clone()]);
            let mut to_visit: VecDeque<Iri> = self.direct_superclasses_of(class)?.into();
            let mut result = Vec::new();

            while let Some(current) = to_visit.pop_front() {
                if visited.insert(current.clone()) {
                    to_visit.extend(self.direct_superclasses_of(&current)?);
                    result.push(current);
                }
            }
            Ok(result)
        })
    }

    /// `true` if a direct type of `individual` is `class` or lies below it.
    pub fn is_transitive_instance_of(&self, individual: &Iri, class: &Iri) -> Result<bool> {
        for kind in self.graph.types_of(individual)? {
            if &kind == class || self.has_transitive_superclass(&kind, class)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn has_transitive_superclass(&self, class: &Iri, target: &Iri) -> Result<bool> {
        Ok(self.all_superclasses_of(class)?.contains(target))
    }

    pub fn has_direct_superclass(&self, class: &Iri, target: &Iri) -> Result<bool> {
        Ok(self.direct_superclasses_of(class)?.contains(target))
    }

    /// Subclasses of `class` that have no subclasses themselves.
    pub fn leaf_subclasses_of(&self, class: &Iri) -> Result<Vec<Iri>> {
        let mut leaves = Vec::new();
        for candidate in self.all_subclasses_of(class)? {
            if self.direct_subclasses_of(&candidate)?.is_empty() {
                leaves.push(candidate);
            }
        }
        Ok(leaves)
    }

    fn memoized(
        &self,
        memo: &Memo,
        class: &Iri,
        compute: impl FnOnce(&Iri) -> Result<Vec<Iri>>,
    ) -> Result<Vec<Iri>> {
        if !self.memoize {
            return compute(class);
        }
        if let Some(cached) = memo.borrow().get(class) {
            return Ok(cached.clone());
        }
        let computed = compute(class)?;
        memo.borrow_mut().insert(class.clone(), computed.clone());
        Ok(computed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::ClassHierarchy;
    use crate::graph::InMemoryGraph;
    use crate::ontology::vocabulary::{OWL, RDFS_SUBCLASS_OF, RDF_TYPE};
    use crate::ontology::{Duo, Element, Iri, Term};

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn class(name: &str, parents: &[&str]) -> Element {
        let mut element = Element::new(Some(iri(name)));
        element.declare(iri(&format!("{OWL}Class")));
        for parent in parents {
            element.push(iri(RDFS_SUBCLASS_OF), Term::Resource(iri(parent)));
        }
        element
    }

    /// Node > {Page, Media > {Image, Video}}, Image also below Page (diamond),
    /// plus a Loop <-> Knot cycle.
    #[fixture]
    fn hierarchy() -> ClassHierarchy {
        let mut thing = Element::new(Some(iri("ex:Thing1")));
        thing.declare(iri(&format!("{OWL}NamedIndividual")));
        thing.push(iri(RDF_TYPE), Term::Resource(iri("ex:Image")));

        let graph = InMemoryGraph::from_elements(
            vec![
                class("ex:Node", &[]),
                class("ex:Page", &["ex:Node"]),
                class("ex:Media", &["ex:Node"]),
                class("ex:Image", &["ex:Media", "ex:Page"]),
                class("ex:Video", &["ex:Media"]),
                class("ex:Loop", &["ex:Knot"]),
                class("ex:Knot", &["ex:Loop"]),
                thing,
            ],
            Duo::default(),
        );
        ClassHierarchy::new(Box::new(graph))
    }

    fn names(iris: &[Iri]) -> Vec<&str> {
        iris.iter().map(Iri::as_str).collect()
    }

    #[rstest]
    fn subclass_closure_has_no_duplicates(hierarchy: ClassHierarchy) {
        let all = hierarchy.all_subclasses_of(&iri("ex:Node")).expect("query");
        assert_eq!(
            names(&all),
            vec!["ex:Page", "ex:Image", "ex:Media", "ex:Video"]
        );
        for direct in hierarchy.direct_subclasses_of(&iri("ex:Node")).expect("query") {
            assert!(all.contains(&direct));
        }
    }

    #[rstest]
    fn superclass_closure_is_nearest_first(hierarchy: ClassHierarchy) {
        let all = hierarchy.all_superclasses_of(&iri("ex:Image")).expect("query");
        assert_eq!(names(&all), vec!["ex:Media", "ex:Page", "ex:Node"]);
    }

    #[rstest]
    fn cycles_terminate(hierarchy: ClassHierarchy) {
        assert_eq!(
            names(&hierarchy.all_subclasses_of(&iri("ex:Loop")).expect("query")),
            vec!["ex:Knot"]
        );
        assert!(hierarchy
            .has_transitive_superclass(&iri("ex:Loop"), &iri("ex:Knot"))
            .expect("query"));
    }

    #[rstest]
    #[case("ex:Node", true)]
    #[case("ex:Media", true)]
    #[case("ex:Image", true)]
    #[case("ex:Video", false)]
    fn transitive_instance_checks(
        hierarchy: ClassHierarchy,
        #[case] class: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            hierarchy
                .is_transitive_instance_of(&iri("ex:Thing1"), &iri(class))
                .expect("query"),
            expected
        );
    }

    #[rstest]
    fn leaves_have_no_subclasses(hierarchy: ClassHierarchy) {
        let leaves = hierarchy.leaf_subclasses_of(&iri("ex:Node")).expect("query");
        assert_eq!(names(&leaves), vec!["ex:Image", "ex:Video"]);
        assert!(hierarchy
            .has_direct_superclass(&iri("ex:Video"), &iri("ex:Media"))
            .expect("query"));
    }
}
