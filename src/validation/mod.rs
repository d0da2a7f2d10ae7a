//! Field-level validation of untyped json documents.
//!
//! Every schema in the crate implements [`Schema`]: it receives the raw
//! `serde_json::Value` as submitted and either narrows it into a typed value
//! or reports every [`Violation`] it found. Validation never fails on the
//! shape of the input itself; a document that isn't even an object is
//! reported as a single violation at the root path.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

mod validator;

pub use validator::Validator;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> PathSegment {
        PathSegment::Key(key.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> PathSegment {
        PathSegment::Index(index)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Violation {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Violation {
        Violation {
            path,
            message: message.into(),
        }
    }

    /// Checks whether this violation is attached to the given top-level field.
    pub fn is_at(&self, key: &str) -> bool {
        matches!(self.path.first(), Some(PathSegment::Key(k)) if k == key)
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{}: {}", path.join("."), self.message)
    }
}

pub trait Schema: Sized {
    fn parse(value: &Value) -> Result<Self, Vec<Violation>>;
}

/// Parses a schema and converts its violations into the crate error.
pub fn validate<T: Schema>(value: &Value) -> Result<T, Error> {
    T::parse(value).map_err(|violations| Error::ValidationFailed { violations })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && email_pattern().is_match(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_email("jane@x.com"));
        assert!(is_email("john.doe+news@example.co.uk"));
        assert!(is_email("O'Brien@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_email(""));
        assert!(!is_email("jane"));
        assert!(!is_email("jane@"));
        assert!(!is_email("jane@x"));
        assert!(!is_email(".jane@x.com"));
        assert!(!is_email("ja..ne@x.com"));
        assert!(!is_email("jane@x.c"));
        assert!(!is_email("jane doe@x.com"));
    }

    #[test]
    fn paths_serialize_as_mixed_arrays() {
        let violation = Violation::new(
            vec!["items".into(), 0.into(), "quantity".into()],
            "Number must be greater than or equal to 1",
        );

        assert_eq!(
            serde_json::to_value(&violation).unwrap(),
            json!({
                "path": ["items", 0, "quantity"],
                "message": "Number must be greater than or equal to 1",
            })
        );
        assert_eq!(
            violation.to_string(),
            "items.0.quantity: Number must be greater than or equal to 1"
        );
        assert!(violation.is_at("items"));
    }
}
