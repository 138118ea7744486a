//! Shared data models for validation output and the schema/operator modules.

pub mod operator;
pub mod schema;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity of a single finding. Errors drive the process exit code;
/// warnings and infos are advisory.
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single validation finding with severity and a dotted field path
/// (e.g. `shell_config.preferred_shell`). Immutable once created;
/// validators create these, the reporter only aggregates them.
pub struct Diagnostic {
    pub severity: Severity,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers and exit-code decisions.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Summary {
    /// Fold a diagnostic list into counts. Performs no validation logic.
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        let mut errors = 0usize;
        let mut warnings = 0usize;
        let mut infos = 0usize;
        for d in diagnostics {
            match d.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
        }
        Summary {
            errors,
            warnings,
            infos,
        }
    }

    /// The run fails exactly when at least one error-severity finding exists.
    pub fn is_failure(&self) -> bool {
        self.errors > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Validation results for a single operator document.
pub struct ValidationReport {
    pub operator: String,
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

impl ValidationReport {
    pub fn new(
        operator: impl Into<String>,
        file: impl Into<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let summary = Summary::of(&diagnostics);
        ValidationReport {
            operator: operator.into(),
            file: file.into(),
            diagnostics,
            summary,
        }
    }
}
