//! Error types shared by every stage of an import run.
//!
//! Only a subset of the variants abort a run. [`Error::is_fatal`] is consulted
//! by the importer before deciding between degrading a single node and rolling
//! back everything the run created.

use std::path::PathBuf;

use crate::ontology::IriError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required setting is missing or cannot be interpreted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The source document is malformed.
    #[error("could not parse `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    /// A node with the same uuid exists and overwrite is disabled.
    #[error(
        "node with uuid '{uuid}' already exists. Enable overwrite if you want to replace it and try \
         again."
    )]
    DuplicateEntity { uuid: String },

    /// The entity store refused a single write, for example an unknown content type.
    #[error("repository rejected write: {0}")]
    RepositoryWrite(String),

    #[error("input file format is not supported or file does not exist: `{0}`")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `false` for errors that only degrade the entity being written.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::RepositoryWrite(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn repository_write_errors_are_not_fatal() {
        assert!(!Error::RepositoryWrite("unknown bundle".into()).is_fatal());
        assert!(Error::DuplicateEntity {
            uuid: "ex:Thing1".into()
        }
        .is_fatal());
        assert!(Error::parse("a.owl", "unexpected end").is_fatal());
    }

    #[test]
    fn duplicate_entity_message_names_the_uuid() {
        let err = Error::DuplicateEntity {
            uuid: "ex:Thing1".into(),
        };
        assert!(err.to_string().contains("'ex:Thing1'"));
    }
}
