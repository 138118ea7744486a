//! Parsed operator document.
//!
//! An operator is an ordered YAML mapping; the wrapper keeps the raw value
//! tree (field values are open-ended) and exposes the identity fields the
//! validators and the inheritance resolver need. Document order is
//! preserved, which keeps diagnostic order deterministic across runs.

use serde_yaml::{Mapping, Value};

#[derive(Debug, Clone)]
/// One operator configuration under validation.
pub struct OperatorDoc {
    root: Mapping,
}

/// Why an operator document could not be produced from its source text.
#[derive(Debug)]
pub enum DocParseError {
    /// The text is not valid YAML.
    Yaml(serde_yaml::Error),
    /// The document parsed, but its root is not a mapping.
    NotAMapping,
}

impl std::fmt::Display for DocParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocParseError::Yaml(e) => write!(f, "{e}"),
            DocParseError::NotAMapping => write!(f, "document root is not a mapping"),
        }
    }
}

impl OperatorDoc {
    pub fn from_str(text: &str) -> Result<OperatorDoc, DocParseError> {
        let value: Value = serde_yaml::from_str(text).map_err(DocParseError::Yaml)?;
        match value {
            Value::Mapping(root) => Ok(OperatorDoc { root }),
            _ => Err(DocParseError::NotAMapping),
        }
    }

    /// Top-level field lookup by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    /// Declared operator identity, when present and a string.
    pub fn name(&self) -> Option<&str> {
        self.get("operator_name").and_then(Value::as_str)
    }

    /// Declared parent reference, when present and a string.
    pub fn extends(&self) -> Option<&str> {
        self.get("extends").and_then(Value::as_str)
    }

    /// Iterate top-level fields in document order, string keys only.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root.iter().filter_map(|(k, v)| k.as_str().map(|s| (s, v)))
    }
}
