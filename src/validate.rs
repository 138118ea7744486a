//! Validation runner: metadata and section walks over one operator
//! document, plus batch validation across an operators directory.
//!
//! A run is a single pass that accumulates every finding; field and
//! section violations never short-circuit validation of sibling fields.
//! Only a parse failure of the document itself stops the walk, since
//! there is nothing left to traverse.

use crate::checks;
use crate::inherit::{self, DirParentLocator, ParentLocator};
use crate::models::operator::OperatorDoc;
use crate::models::schema::{MetadataSchema, RuleSpec, SchemaDocument, SectionSchema, SECTIONS};
use crate::models::{Diagnostic, ValidationReport};
use glob::glob;
use rayon::prelude::*;
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};

/// Validate one parsed document against the schema, including inheritance.
///
/// Diagnostics are produced in discovery order: required-field checks,
/// metadata fields in document order, each present section in schema
/// order (fields in document order), then inheritance. Two runs over the
/// same document yield identical lists.
pub fn validate_document(
    schema: &SchemaDocument,
    doc: &OperatorDoc,
    locator: &dyn ParentLocator,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    validate_metadata(&schema.operator_metadata, doc, &mut out);

    for name in SECTIONS {
        if let Some(value) = doc.get(name) {
            let section = schema.section(name).unwrap();
            match value.as_mapping() {
                Some(fields) => validate_section(name, fields, section, &mut out),
                None => out.push(Diagnostic::error(
                    name,
                    format!(
                        "Section '{name}' must be a mapping, got {}",
                        checks::value_type_name(value)
                    ),
                )),
            }
        }
    }

    out.extend(inherit::resolve_inheritance(doc, locator));
    out
}

/// Check the mandatory-field list, then dispatch each declared metadata
/// field to the field validator. Fields the schema does not know are
/// ignored (additive unknown fields are allowed).
fn validate_metadata(schema: &MetadataSchema, doc: &OperatorDoc, out: &mut Vec<Diagnostic>) {
    for field in &schema.required_fields {
        if doc.get(field).is_none() {
            out.push(
                Diagnostic::error(field, format!("Required field '{field}' is missing"))
                    .with_suggestion(format!("Add '{field}: <value>' to the operator configuration")),
            );
        }
    }

    for (field, value) in doc.fields() {
        if let Some(rule) = schema.field_types.get(field) {
            out.extend(checks::validate_field(field, value, rule));
        }
    }
}

/// Walk one section's fields in document order.
///
/// Object-typed rules with declared `properties` are descended exactly one
/// extra level (the tmux `settings` map). Deeper nesting inside those
/// properties is type-checked only, never walked — a schema that needs
/// more depth must change this walk, and the depth test alongside it.
fn validate_section(
    section: &str,
    fields: &Mapping,
    schema: &SectionSchema,
    out: &mut Vec<Diagnostic>,
) {
    for (key, value) in fields {
        let Some(field) = key.as_str() else { continue };
        let Some(rule) = schema.field_types.get(field) else {
            // Unknown fields are allowed for forward compatibility.
            continue;
        };
        let path = format!("{section}.{field}");
        let before = out.len();
        out.extend(checks::validate_field(&path, value, rule));

        if let RuleSpec::Object { properties } = rule {
            // Descend only when the shape check passed and the rule
            // actually declares nested properties.
            if out.len() == before && !properties.is_empty() {
                if let Some(nested) = value.as_mapping() {
                    for (sub_key, sub_value) in nested {
                        let Some(sub_field) = sub_key.as_str() else { continue };
                        if let Some(sub_rule) = properties.get(sub_field) {
                            out.extend(checks::validate_field(
                                &format!("{path}.{sub_field}"),
                                sub_value,
                                sub_rule,
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Operator display name for a `vars.yml` path: the containing directory.
fn operator_name_of(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Validate one operator file.
///
/// An unreadable or unparsable file yields a single error diagnostic on
/// field `file`; no field-level findings are produced for it.
pub fn validate_file(
    schema: &SchemaDocument,
    path: &Path,
    locator: &dyn ParentLocator,
) -> ValidationReport {
    let operator = operator_name_of(path);
    let file = path.to_string_lossy().to_string();

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return ValidationReport::new(
                operator,
                file,
                vec![Diagnostic::error(
                    "file",
                    format!("Failed to load operator file: {e}"),
                )],
            );
        }
    };
    let doc = match OperatorDoc::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            return ValidationReport::new(
                operator,
                file,
                vec![Diagnostic::error(
                    "file",
                    format!("Failed to load operator file: {e}"),
                )],
            );
        }
    };

    ValidationReport::new(operator, file, validate_document(schema, &doc, locator))
}

/// Discover and validate every operator under `operators_dir`.
///
/// Operators are discovered as `<operators_dir>/*/vars.yml` and validated
/// in alphabetical order. Runs are independent, so they execute on the
/// rayon pool; the result order stays the sorted discovery order.
pub fn validate_all(schema: &SchemaDocument, operators_dir: &Path) -> Vec<ValidationReport> {
    let pattern = operators_dir.join("*").join("vars.yml");
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("bad glob pattern")
        .flatten()
        .collect();
    files.sort();

    files
        .par_iter()
        .map(|path| {
            let locator = DirParentLocator::new(operators_dir);
            validate_file(schema, path, &locator)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use tempfile::tempdir;

    const TEST_SCHEMA: &str = r#"
operator_metadata:
  required_fields: [operator_name, operator_version, operator_description]
  field_types:
    operator_name:
      type: string
      pattern: "^[a-z][a-z0-9_]*$"
    operator_version:
      type: string
      pattern: "^\\d+\\.\\d+\\.\\d+(-[a-zA-Z0-9.]+)?$"
    operator_description:
      type: string
      max_length: 100
    extends:
      type: string
shell_config:
  field_types:
    preferred_shell:
      type: string
      enum: [zsh, bash, fish]
    oh_my_zsh_plugins:
      type: array
      max_items: 15
tmux_config:
  field_types:
    prefix:
      type: string
      pattern: "^C-[a-z]$"
    theme:
      type: string
      enum: [matrix, default, minimal]
    settings:
      type: object
      properties:
        mouse:
          type: boolean
        base_index:
          type: integer
          min: 0
          max: 1
"#;

    fn schema() -> SchemaDocument {
        SchemaDocument::parse(TEST_SCHEMA, "test").unwrap()
    }

    fn doc(text: &str) -> OperatorDoc {
        OperatorDoc::from_str(text).unwrap()
    }

    fn validate(text: &str) -> Vec<Diagnostic> {
        let dir = tempdir().unwrap();
        let locator = DirParentLocator::new(dir.path());
        validate_document(&schema(), &doc(text), &locator)
    }

    #[test]
    fn test_valid_operator_has_no_findings() {
        let diags = validate(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\nshell_config:\n  preferred_shell: zsh\n  oh_my_zsh_plugins: [git, docker]\n",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_missing_required_fields_one_error_each() {
        let diags = validate("shell_config:\n  preferred_shell: zsh\n");
        let errors: Vec<_> = diags.iter().filter(|d| d.severity == Severity::Error).collect();
        assert_eq!(errors.len(), 3);
        let fields: Vec<&str> = errors.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["operator_name", "operator_version", "operator_description"]
        );
        assert!(errors.iter().all(|d| d.suggestion.is_some()));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let diags = validate(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\nfuture_field: whatever\nshell_config:\n  brand_new_knob: 42\n",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_nested_settings_are_validated_one_level_deep() {
        let diags = validate(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\ntmux_config:\n  theme: nope\n  prefix: Invalid\n  settings:\n    mouse: maybe\n    base_index: -1\n",
        );
        let fields: Vec<&str> = diags.iter().map(|d| d.field.as_str()).collect();
        assert!(fields.contains(&"tmux_config.theme"));
        assert!(fields.contains(&"tmux_config.prefix"));
        assert!(fields.contains(&"tmux_config.settings.mouse"));
        assert!(fields.contains(&"tmux_config.settings.base_index"));
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_unknown_settings_keys_are_ignored() {
        let diags = validate(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\ntmux_config:\n  settings:\n    undeclared_setting: -5\n",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_walk_depth_is_fixed_at_one_extra_level() {
        // An object rule nested inside `properties` is shape-checked only;
        // its own properties are not descended. This pins the depth limit:
        // if the walk ever generalizes, this test must be revisited.
        let deep_schema = SchemaDocument::parse(
            r#"
operator_metadata:
  field_types: {}
tmux_config:
  field_types:
    settings:
      type: object
      properties:
        inner:
          type: object
          properties:
            flag:
              type: boolean
"#,
            "test",
        )
        .unwrap();
        let dir = tempdir().unwrap();
        let locator = DirParentLocator::new(dir.path());
        let doc = doc("tmux_config:\n  settings:\n    inner:\n      flag: not_a_boolean\n");
        let diags = validate_document(&deep_schema, &doc, &locator);
        assert!(diags.is_empty(), "third level must not be walked: {diags:?}");
    }

    #[test]
    fn test_wrong_type_section_is_one_error() {
        let diags = validate(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\nshell_config: just a string\n",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].field, "shell_config");
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_plugin_overrun_is_one_warning_and_no_errors() {
        let plugins = vec!["git"; 25].join(", ");
        let diags = validate(&format!(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\nshell_config:\n  oh_my_zsh_plugins: [{plugins}]\n"
        ));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].field, "shell_config.oh_my_zsh_plugins");
        assert!(diags[0].message.contains("25"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let text = "operator_name: Test!\noperator_version: 1.0\ntmux_config:\n  theme: nope\n";
        let first = validate(text);
        let second = validate(text);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparsable_file_short_circuits_to_one_file_error() {
        let dir = tempdir().unwrap();
        let op_dir = dir.path().join("broken");
        fs::create_dir_all(&op_dir).unwrap();
        fs::write(op_dir.join("vars.yml"), "invalid: yaml: content: [").unwrap();

        let locator = DirParentLocator::new(dir.path());
        let report = validate_file(&schema(), &op_dir.join("vars.yml"), &locator);
        assert_eq!(report.operator, "broken");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].field, "file");
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_missing_parent_flows_into_document_findings() {
        let diags = validate(
            "operator_name: child\noperator_version: 1.0.0\noperator_description: Test\nextends: ghost\n",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].field, "extends");
        assert!(diags[0].suggestion.is_some());
    }

    #[test]
    fn test_validate_all_is_sorted_and_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            let op_dir = dir.path().join(name);
            fs::create_dir_all(&op_dir).unwrap();
            fs::write(
                op_dir.join("vars.yml"),
                format!("operator_name: {name}\noperator_version: 1.0.0\noperator_description: D\n"),
            )
            .unwrap();
        }

        let reports = validate_all(&schema(), dir.path());
        let names: Vec<&str> = reports.iter().map(|r| r.operator.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert!(reports.iter().all(|r| !r.summary.is_failure()));
    }

    #[test]
    fn test_shipped_schema_accepts_a_standard_operator() {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("schema")
            .join("operator_schema.yml");
        let schema = SchemaDocument::load(&shipped).unwrap();
        let dir = tempdir().unwrap();
        let locator = DirParentLocator::new(dir.path());
        let doc = doc(
            "operator_name: test\noperator_version: 1.0.0\noperator_description: Test\nshell_config:\n  preferred_shell: zsh\n  oh_my_zsh_plugins: [git, docker]\ntmux_config:\n  prefix: C-a\n  settings:\n    base_index: 1\n    history_limit: 10000\n    mouse: true\n",
        );
        let diags = validate_document(&schema, &doc, &locator);
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }
}
