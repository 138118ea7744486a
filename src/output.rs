//! Output rendering for validation reports.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-diagnostic fields and a top-level summary. The human form groups
//! diagnostics by severity, keeping discovery order inside each group,
//! and prints suggestions beneath their findings.

use crate::models::{Diagnostic, Severity, Summary, ValidationReport};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Report path relative to the repository root when possible.
fn display_path(file: &str, root: &Path) -> String {
    pathdiff::diff_paths(file, root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string())
}

/// Split diagnostics by severity, preserving discovery order within each
/// group. Pure; no validation logic lives here.
pub fn grouped(diagnostics: &[Diagnostic]) -> (Vec<&Diagnostic>, Vec<&Diagnostic>, Vec<&Diagnostic>) {
    let pick = |s: Severity| {
        diagnostics
            .iter()
            .filter(|d| d.severity == s)
            .collect::<Vec<_>>()
    };
    (
        pick(Severity::Error),
        pick(Severity::Warning),
        pick(Severity::Info),
    )
}

/// Print one validation report in the requested format.
pub fn print_report(report: &ValidationReport, root: &Path, output: &str, show_info: bool) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_report_json(report)).unwrap()
        ),
        _ => print_report_human(report, root, show_info),
    }
}

fn print_report_human(report: &ValidationReport, root: &Path, show_info: bool) {
    let color = use_colors("human");
    let file = display_path(&report.file, root);
    let header = format!("🔍 Validating operator: {} ({})", report.operator, file);
    if color {
        println!("{}", header.bold());
    } else {
        println!("{header}");
    }

    if report.diagnostics.is_empty() {
        println!("✅ Operator validation passed!");
        return;
    }

    let (errors, warnings, infos) = grouped(&report.diagnostics);

    if !errors.is_empty() {
        let head = format!("❌ {} Error(s):", errors.len());
        if color {
            println!("{}", head.red().bold());
        } else {
            println!("{head}");
        }
        for d in &errors {
            print_finding(d, "✖", color);
        }
    }

    if !warnings.is_empty() {
        let head = format!("⚠️  {} Warning(s):", warnings.len());
        if color {
            println!("{}", head.yellow().bold());
        } else {
            println!("{head}");
        }
        for d in &warnings {
            print_finding(d, "▲", color);
        }
    }

    if !infos.is_empty() && show_info {
        let head = format!("ℹ️  {} Info:", infos.len());
        if color {
            println!("{}", head.blue().bold());
        } else {
            println!("{head}");
        }
        for d in &infos {
            print_finding(d, "◆", color);
        }
    }

    let summary = format!(
        "— Summary — errors={} warnings={} infos={}",
        report.summary.errors, report.summary.warnings, report.summary.infos
    );
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{summary}");
    }
}

fn print_finding(d: &Diagnostic, icon: &str, color: bool) {
    let icon = if color {
        match d.severity {
            Severity::Error => icon.red().to_string(),
            Severity::Warning => icon.yellow().to_string(),
            Severity::Info => icon.blue().to_string(),
        }
    } else {
        icon.to_string()
    };
    println!("  {} {}: {}", icon, d.field, d.message);
    if let Some(suggestion) = &d.suggestion {
        println!("    💡 {suggestion}");
    }
}

/// Print a batch of reports plus an aggregate trailer.
pub fn print_batch(reports: &[ValidationReport], root: &Path, output: &str, show_info: bool) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_batch_json(reports)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_report_human(report, root, show_info);
            }
            println!();
            if reports.iter().any(|r| r.summary.is_failure()) {
                let line = "❌ Some operators have validation errors";
                if color {
                    println!("{}", line.red().bold());
                } else {
                    println!("{line}");
                }
            } else {
                let line = "🎉 All operators validated successfully!";
                if color {
                    println!("{}", line.green().bold());
                } else {
                    println!("{line}");
                }
            }
        }
    }
}

/// Compose report JSON (pure) for testing/snapshot purposes.
pub fn compose_report_json(report: &ValidationReport) -> JsonVal {
    // Directly serialize the report, keeping a stable shape
    serde_json::to_value(report).unwrap()
}

/// Compose batch JSON (pure): per-operator reports plus aggregate counts.
pub fn compose_batch_json(reports: &[ValidationReport]) -> JsonVal {
    let totals = reports.iter().fold(Summary { errors: 0, warnings: 0, infos: 0 }, |acc, r| Summary {
        errors: acc.errors + r.summary.errors,
        warnings: acc.warnings + r.summary.warnings,
        infos: acc.infos + r.summary.infos,
    });
    json!({
        "operators": reports.iter().map(compose_report_json).collect::<Vec<_>>(),
        "summary": {
            "operators": reports.len(),
            "errors": totals.errors,
            "warnings": totals.warnings,
            "infos": totals.infos,
        }
    })
}
