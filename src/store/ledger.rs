use super::{FileId, NodeId, PathId, TagId};

/// Entities created during one run, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    paths: Vec<PathId>,
    nodes: Vec<(NodeId, String)>,
    files: Vec<FileId>,
    tags: Vec<TagId>,
    vocabularies: Vec<String>,
}

/// What a rollback has to delete, in deletion order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RollbackPlan {
    pub paths: Vec<PathId>,
    pub nodes: Vec<NodeId>,
    pub files: Vec<FileId>,
    pub tags: Vec<TagId>,
    pub vocabularies: Vec<String>,
}

impl Ledger {
    pub fn record_path(&mut self, id: PathId) {
        self.paths.push(id);
    }

    pub fn record_node(&mut self, id: NodeId, uuid: &str) {
        self.nodes.push((id, uuid.to_string()));
    }

    pub fn record_file(&mut self, id: FileId) {
        self.files.push(id);
    }

    pub fn record_tag(&mut self, id: TagId) {
        self.tags.push(id);
    }

    pub fn record_vocabulary(&mut self, id: &str) {
        self.vocabularies.push(id.to_string());
    }

    /// Drops a node replaced within the same run, together with its paths.
    pub fn forget_node(&mut self, id: NodeId, paths: &[PathId]) {
        self.nodes.retain(|(node, _)| *node != id);
        self.paths.retain(|path| !paths.contains(path));
    }

    pub fn forget_tags(&mut self, ids: &[TagId]) {
        self.tags.retain(|tag| !ids.contains(tag));
    }

    /// Looks a uuid up among nodes created in this run only.
    #[must_use]
    pub fn node_id(&self, uuid: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, created)| created == uuid)
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn count_files(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn count_tags(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn count_vocabularies(&self) -> usize {
        self.vocabularies.len()
    }

    /// Empties the ledger and returns its entries in reverse dependency order,
    /// newest first within each kind.
    pub fn take_rollback_plan(&mut self) -> RollbackPlan {
        let ledger = std::mem::take(self);
        RollbackPlan {
            paths: ledger.paths.into_iter().rev().collect(),
            nodes: ledger.nodes.into_iter().rev().map(|(id, _)| id).collect(),
            files: ledger.files.into_iter().rev().collect(),
            tags: ledger.tags.into_iter().rev().collect(),
            vocabularies: ledger.vocabularies.into_iter().rev().collect(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_plan_lists_newest_first_and_empties_the_ledger() {
        let mut ledger = Ledger::default();
        ledger.record_vocabulary("Color");
        ledger.record_tag(TagId(1));
        ledger.record_tag(TagId(2));
        ledger.record_node(NodeId(3), "ex:Thing1");
        ledger.record_path(PathId(4));

        let plan = ledger.take_rollback_plan();
        assert_eq!(plan.tags, vec![TagId(2), TagId(1)]);
        assert_eq!(plan.nodes, vec![NodeId(3)]);
        assert_eq!(plan.paths, vec![PathId(4)]);
        assert_eq!(ledger, Ledger::default());
    }

    #[test]
    fn nodes_are_found_by_uuid() {
        let mut ledger = Ledger::default();
        ledger.record_node(NodeId(7), "ex:Thing1");
        assert_eq!(ledger.node_id("ex:Thing1"), Some(NodeId(7)));
        assert_eq!(ledger.node_id("ex:Thing2"), None);

        ledger.forget_node(NodeId(7), &[]);
        assert_eq!(ledger.count_nodes(), 0);
    }
}
