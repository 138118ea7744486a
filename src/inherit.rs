//! Inheritance resolution between operator documents.
//!
//! An operator may declare `extends: <parent>`. Resolution verifies that
//! the parent exists and that the pair is not mutually referential. Parent
//! lookup is an injected collaborator (`ParentLocator`); the shipped
//! implementation maps a parent name to a sibling operator directory.
//!
//! Only the immediate parent/child mutual reference is checked. Longer
//! chains (a extends b, b extends c, c extends a) are not walked; widening
//! this to full ancestor traversal would change observable behavior and is
//! deliberately not done here.

use crate::models::operator::OperatorDoc;
use crate::models::Diagnostic;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a parent lookup.
pub enum ParentLookup {
    /// Parent found and parsed.
    Found(OperatorDoc),
    /// No document exists for the parent name; carries the location that
    /// was searched so the diagnostic can point at it.
    NotFound { searched: PathBuf },
    /// A document exists but could not be read or parsed.
    Unreadable { reason: String },
}

/// Resolves a parent operator name to its document.
pub trait ParentLocator {
    fn resolve(&self, parent: &str) -> ParentLookup;
}

/// Filesystem locator: parents live in a sibling directory named after the
/// parent, in a fixed-named `vars.yml` file.
pub struct DirParentLocator {
    operators_dir: PathBuf,
}

impl DirParentLocator {
    pub fn new(operators_dir: impl Into<PathBuf>) -> Self {
        DirParentLocator {
            operators_dir: operators_dir.into(),
        }
    }
}

impl ParentLocator for DirParentLocator {
    fn resolve(&self, parent: &str) -> ParentLookup {
        let path = self.operators_dir.join(parent).join("vars.yml");
        if !path.exists() {
            return ParentLookup::NotFound { searched: path };
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                return ParentLookup::Unreadable {
                    reason: e.to_string(),
                }
            }
        };
        match OperatorDoc::from_str(&text) {
            Ok(doc) => ParentLookup::Found(doc),
            Err(e) => ParentLookup::Unreadable {
                reason: e.to_string(),
            },
        }
    }
}

/// Verify the document's `extends` reference.
///
/// Produces no diagnostics when `extends` is absent. A declared but
/// non-string `extends` is skipped here; the metadata type check already
/// reports it.
pub fn resolve_inheritance(doc: &OperatorDoc, locator: &dyn ParentLocator) -> Vec<Diagnostic> {
    let Some(parent_name) = doc.extends() else {
        return Vec::new();
    };

    match locator.resolve(parent_name) {
        ParentLookup::NotFound { searched } => vec![Diagnostic::error(
            "extends",
            format!(
                "Parent operator '{parent_name}' not found at {}",
                searched.display()
            ),
        )
        .with_suggestion("Create the parent operator or fix the 'extends' field")],
        ParentLookup::Unreadable { reason } => vec![Diagnostic::warning(
            "extends",
            format!("Could not validate parent operator: {reason}"),
        )],
        ParentLookup::Found(parent) => {
            // Mutual reference: the parent names this document as its own
            // parent. Guarded on the parent actually declaring `extends`,
            // so two documents that both omit identity fields never
            // compare equal by accident.
            if let Some(parent_extends) = parent.extends() {
                if doc.name() == Some(parent_extends) {
                    return vec![Diagnostic::error(
                        "extends",
                        format!("Circular dependency detected with parent '{parent_name}'"),
                    )];
                }
            }
            Vec::new()
        }
    }
}

/// Convenience for building a locator rooted next to a given operator file,
/// mirroring the on-disk layout `<operators_dir>/<name>/vars.yml`.
pub fn locator_for(operator_file: &Path) -> DirParentLocator {
    let operators_dir = operator_file
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    DirParentLocator::new(operators_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use std::fs;
    use tempfile::tempdir;

    fn write_operator(dir: &Path, name: &str, body: &str) {
        let op_dir = dir.join(name);
        fs::create_dir_all(&op_dir).unwrap();
        fs::write(op_dir.join("vars.yml"), body).unwrap();
    }

    #[test]
    fn test_no_extends_is_a_no_op() {
        let dir = tempdir().unwrap();
        let doc = OperatorDoc::from_str("operator_name: solo\n").unwrap();
        let locator = DirParentLocator::new(dir.path());
        assert!(resolve_inheritance(&doc, &locator).is_empty());
    }

    #[test]
    fn test_missing_parent_is_an_error_with_suggestion() {
        let dir = tempdir().unwrap();
        let doc = OperatorDoc::from_str("operator_name: child\nextends: nope\n").unwrap();
        let locator = DirParentLocator::new(dir.path());

        let diags = resolve_inheritance(&doc, &locator);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].field, "extends");
        assert!(diags[0].message.contains("'nope' not found"));
        assert!(diags[0].suggestion.is_some());
    }

    #[test]
    fn test_valid_parent_produces_nothing() {
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "base", "operator_name: base\n");
        let doc = OperatorDoc::from_str("operator_name: child\nextends: base\n").unwrap();
        let locator = DirParentLocator::new(dir.path());
        assert!(resolve_inheritance(&doc, &locator).is_empty());
    }

    #[test]
    fn test_mutual_reference_is_one_error_from_either_side() {
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "a", "operator_name: a\nextends: b\n");
        write_operator(dir.path(), "b", "operator_name: b\nextends: a\n");
        let locator = DirParentLocator::new(dir.path());

        for name in ["a", "b"] {
            let text = fs::read_to_string(dir.path().join(name).join("vars.yml")).unwrap();
            let doc = OperatorDoc::from_str(&text).unwrap();
            let diags = resolve_inheritance(&doc, &locator);
            assert_eq!(diags.len(), 1, "validating {name}");
            assert_eq!(diags[0].severity, Severity::Error);
            assert_eq!(diags[0].field, "extends");
            assert!(diags[0].message.to_lowercase().contains("circular"));
        }
    }

    #[test]
    fn test_longer_cycles_are_not_walked() {
        // a -> b -> c -> a passes: only the immediate pair is inspected.
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "a", "operator_name: a\nextends: b\n");
        write_operator(dir.path(), "b", "operator_name: b\nextends: c\n");
        write_operator(dir.path(), "c", "operator_name: c\nextends: a\n");
        let locator = DirParentLocator::new(dir.path());

        let doc = OperatorDoc::from_str("operator_name: a\nextends: b\n").unwrap();
        assert!(resolve_inheritance(&doc, &locator).is_empty());
    }

    #[test]
    fn test_unreadable_parent_is_a_warning() {
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "broken", "invalid: yaml: [");
        let doc = OperatorDoc::from_str("operator_name: child\nextends: broken\n").unwrap();
        let locator = DirParentLocator::new(dir.path());

        let diags = resolve_inheritance(&doc, &locator);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].field, "extends");
    }

    #[test]
    fn test_anonymous_pair_is_not_reported_circular() {
        // Parent without `extends`, child without `operator_name`: the
        // absent sides must not compare equal.
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "plain", "operator_description: no identity\n");
        let doc = OperatorDoc::from_str("extends: plain\n").unwrap();
        let locator = DirParentLocator::new(dir.path());
        assert!(resolve_inheritance(&doc, &locator).is_empty());
    }

    #[test]
    fn test_locator_for_derives_operators_dir() {
        let dir = tempdir().unwrap();
        write_operator(dir.path(), "base", "operator_name: base\n");
        write_operator(dir.path(), "child", "operator_name: child\nextends: base\n");

        let child_file = dir.path().join("child").join("vars.yml");
        let locator = locator_for(&child_file);
        assert!(matches!(locator.resolve("base"), ParentLookup::Found(_)));
    }
}
