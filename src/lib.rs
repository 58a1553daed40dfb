//! Imports OWL ontologies and tagged JSON documents into a content
//! repository as taxonomy vocabularies, tags and nodes.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ontology_importer::{config::ImportSettings, importer::Importer, store::InMemoryEntityStore};
//!
//! let mut store = InMemoryEntityStore::new(false);
//! let summary = Importer::new(ImportSettings::default())
//!     .run(Path::new("duo.owl"), &mut store)?;
//! println!("{summary}");
//! # Ok::<(), ontology_importer::Error>(())
//! ```

pub use self::errors::Error;

pub mod config;
pub mod errors;
pub mod graph;
pub mod importer;
pub mod logger;
pub mod mapping;
pub mod ontology;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod tests_cfg;
pub mod warnings;

pub use errors::Result;
