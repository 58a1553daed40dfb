use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::Serialize;
use thiserror::Error;

/// Value object ensuring that supplied text represents a valid IRI.
///
/// Resources are identified by their IRI alone: two resources are the same
/// resource when their IRIs are equal, regardless of the statements attached
/// to them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// The constructor rejects malformed identifiers in order to guarantee that
    /// every resource uses canonical identifiers.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Builds the IRI `namespace + local`.
    pub fn in_namespace(namespace: &str, local: &str) -> Result<Self, IriError> {
        Self::new(format!("{namespace}{local}"))
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the IRI suffix after the fragment separator.
    ///
    /// Falls back to the last path segment and then to the part after the
    /// scheme, so `http://www.lha.org/duo#Node` yields `Node` and
    /// `ex:Thing1` yields `Thing1`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        let value = self.value.as_str();
        for separator in ['#', '/', ':'] {
            if let Some(index) = value.rfind(separator) {
                let suffix = &value[index + 1..];
                if !suffix.is_empty() {
                    return suffix;
                }
            }
        }
        value
    }

    /// Returns the IRI without its local name.
    #[must_use]
    pub fn namespace(&self) -> &str {
        let local = self.local_name();
        &self.value[..self.value.len() - local.len()]
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Iri;

    #[test]
    fn accepts_valid_iri() {
        let iri = Iri::new("https://example.org/resource").expect("valid IRI");
        assert_eq!(iri.as_str(), "https://example.org/resource");
    }

    #[test]
    fn rejects_invalid_iri() {
        let err = Iri::new("not an iri").expect_err("invalid IRI");
        assert!(matches!(err, super::IriError::Invalid { value } if value == "not an iri"));
    }

    #[rstest]
    #[case("http://www.lha.org/duo#Node", "Node")]
    #[case("https://example.org/things/Article", "Article")]
    #[case("ex:Thing1", "Thing1")]
    #[case("http://www.lha.org/duo#Blue_Green", "Blue_Green")]
    fn local_name_strips_namespace(#[case] iri: &str, #[case] expected: &str) {
        let iri = Iri::new(iri).expect("valid IRI");
        assert_eq!(iri.local_name(), expected);
    }

    #[test]
    fn namespace_and_local_name_round_trip() {
        let iri = Iri::in_namespace("http://www.lha.org/duo#", "title").expect("valid IRI");
        assert_eq!(iri.namespace(), "http://www.lha.org/duo#");
        assert_eq!(iri.local_name(), "title");
    }
}
