//! Declarative validation schema: rule specs per field group.
//!
//! The schema is loaded once per run from YAML and is read-only afterwards.
//! A schema that cannot be loaded is fatal — validation has no meaningful
//! result without its rule-set, so `load` returns a hard error instead of
//! diagnostics.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// The four named operator sections, in schema order.
pub const SECTIONS: [&str; 4] = ["shell_config", "tmux_config", "tools_config", "docker_config"];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// One validation rule for a single field, tagged by the expected value
/// type. Attributes are variant-specific: `pattern`/`enum`/`max_length`
/// only exist for strings, `min`/`max` for integers, `max_items` for
/// arrays and `properties` for objects.
pub enum RuleSpec {
    String {
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default, rename = "enum")]
        allowed: Option<Vec<String>>,
        #[serde(default)]
        max_length: Option<usize>,
    },
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Boolean,
    Array {
        #[serde(default)]
        max_items: Option<usize>,
    },
    Object {
        #[serde(default)]
        properties: HashMap<String, RuleSpec>,
    },
}

impl RuleSpec {
    /// Human name of the value type this rule expects.
    pub fn expected_type(&self) -> &'static str {
        match self {
            RuleSpec::String { .. } => "string",
            RuleSpec::Integer { .. } => "integer",
            RuleSpec::Boolean => "boolean",
            RuleSpec::Array { .. } => "array",
            RuleSpec::Object { .. } => "object",
        }
    }
}

/// Anchor a schema pattern so it must match the whole value, not a prefix.
pub fn anchored_pattern(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Rules for the top-level metadata fields, plus the ordered list of
/// fields every operator must declare.
pub struct MetadataSchema {
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub field_types: HashMap<String, RuleSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Rules for one named section.
pub struct SectionSchema {
    #[serde(default)]
    pub field_types: HashMap<String, RuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
/// The loaded rule-set. Owns every `RuleSpec`; immutable after `load`.
pub struct SchemaDocument {
    pub operator_metadata: MetadataSchema,
    #[serde(default)]
    pub shell_config: SectionSchema,
    #[serde(default)]
    pub tmux_config: SectionSchema,
    #[serde(default)]
    pub tools_config: SectionSchema,
    #[serde(default)]
    pub docker_config: SectionSchema,
}

#[derive(Debug, Error)]
/// Fatal schema loading failures.
pub enum SchemaError {
    #[error("failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("schema file '{path}' is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("schema rule for '{field}' has an invalid pattern '{pattern}': {source}")]
    BadPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl SchemaDocument {
    /// Load and verify the schema from a YAML file.
    ///
    /// Pattern rules are compiled here so an unparsable regex fails the
    /// load rather than surfacing mid-validation.
    pub fn load(path: &Path) -> Result<SchemaDocument, SchemaError> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Self::parse(&text, &path.to_string_lossy())
    }

    /// Parse and verify schema text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &str) -> Result<SchemaDocument, SchemaError> {
        let schema: SchemaDocument =
            serde_yaml::from_str(text).map_err(|source| SchemaError::Parse {
                path: origin.to_string(),
                source,
            })?;
        schema.verify_patterns()?;
        Ok(schema)
    }

    /// Rules for a named section, or `None` for an unknown section name.
    pub fn section(&self, name: &str) -> Option<&SectionSchema> {
        match name {
            "shell_config" => Some(&self.shell_config),
            "tmux_config" => Some(&self.tmux_config),
            "tools_config" => Some(&self.tools_config),
            "docker_config" => Some(&self.docker_config),
            _ => None,
        }
    }

    fn verify_patterns(&self) -> Result<(), SchemaError> {
        for (field, rule) in &self.operator_metadata.field_types {
            verify_rule_patterns(field, rule)?;
        }
        for name in SECTIONS {
            let section = self.section(name).unwrap();
            for (field, rule) in &section.field_types {
                verify_rule_patterns(&format!("{name}.{field}"), rule)?;
            }
        }
        Ok(())
    }
}

fn verify_rule_patterns(field: &str, rule: &RuleSpec) -> Result<(), SchemaError> {
    match rule {
        RuleSpec::String {
            pattern: Some(pattern),
            ..
        } => {
            Regex::new(&anchored_pattern(pattern)).map_err(|source| SchemaError::BadPattern {
                field: field.to_string(),
                pattern: pattern.clone(),
                source,
            })?;
        }
        RuleSpec::Object { properties } => {
            for (name, sub) in properties {
                verify_rule_patterns(&format!("{field}.{name}"), sub)?;
            }
        }
        _ => {}
    }
    Ok(())
}
