//! One import run: open the source, write vocabularies and nodes, and either
//! commit or roll back everything the run created.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use crate::config::ImportSettings;
use crate::graph::AccessStrategy;
use crate::mapping::{NodeRecord, SourceFormat, SourceHandler, VocabularyRecord};
use crate::store::EntityStore;
use crate::warnings::Warnings;
use crate::Result;

/// Counters of a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub format: SourceFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AccessStrategy>,
    pub vocabularies: usize,
    pub tags: usize,
    pub nodes: usize,
    pub files: usize,
    /// Distinct warnings, in the order they were raised.
    pub warnings: Vec<String>,
}

impl ImportSummary {
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Success! {} vocabularies with {} terms and {} nodes imported.",
            self.vocabularies, self.tags, self.nodes
        )
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Records a source maps to, without writing anything.
#[derive(Clone, Debug, Serialize)]
pub struct RecordDump {
    pub vocabularies: Vec<VocabularyRecord>,
    pub nodes: Vec<NodeRecord>,
    pub warnings: Vec<String>,
}

pub struct Importer {
    settings: ImportSettings,
}

impl Importer {
    #[must_use]
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Imports `path` into `store`.
    ///
    /// Configuration and parse errors surface before the store is touched.
    /// Any fatal error after that rolls back every entity the run created.
    pub fn run<S: EntityStore + ?Sized>(&self, path: &Path, store: &mut S) -> Result<ImportSummary> {
        self.settings.validate()?;
        let source = SourceHandler::open(path, &self.settings)?;
        let warnings = Warnings::default();
        for notice in source.notices() {
            warnings.warn(notice.as_str());
        }

        if let Err(err) = self.write(&source, store, &warnings) {
            error!(error = %err, "import failed, rolling back");
            store.rollback();
            return Err(err);
        }

        let summary = ImportSummary {
            format: source.format(),
            strategy: source.strategy(),
            vocabularies: store.count_created_vocabularies(),
            tags: store.count_created_tags(),
            nodes: store.count_created_nodes(),
            files: store.count_created_files(),
            warnings: warnings.messages(),
        };
        store.commit();
        info!("{summary}");
        Ok(summary)
    }

    /// Maps `path` to records for inspection.
    pub fn records(&self, path: &Path) -> Result<RecordDump> {
        self.settings.validate()?;
        let source = SourceHandler::open(path, &self.settings)?;
        let warnings = Warnings::default();
        for notice in source.notices() {
            warnings.warn(notice.as_str());
        }

        let vocabularies = if self.settings.import_vocabularies {
            source.vocabulary_records()?
        } else {
            Vec::new()
        };
        let nodes = if self.settings.import_nodes {
            source.node_records(&warnings)?
        } else {
            Vec::new()
        };
        Ok(RecordDump {
            vocabularies,
            nodes,
            warnings: warnings.messages(),
        })
    }

    fn write<S: EntityStore + ?Sized>(
        &self,
        source: &SourceHandler,
        store: &mut S,
        warnings: &Warnings,
    ) -> Result<()> {
        if self.settings.import_vocabularies {
            info!("Importing vocabularies...");
            source.import_vocabularies(store)?;
        }
        if self.settings.import_nodes {
            info!("Importing nodes...");
            source.import_nodes(store, warnings)?;
        }
        Ok(())
    }
}
