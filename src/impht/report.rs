// src/impht/report.rs
// ============================================================================
// REPORT - Presentación en texto de un FileReport
// ============================================================================

use std::fmt::Write;

use super::{FileReport, FindingKind, Outcome};

/// Una línea por finding, con las cabeceras de sección y un resumen final
pub fn render_text(report: &FileReport) -> String {
    let mut out = String::new();
    let path = report.path.display();

    // writeln! sobre String no falla
    let _ = writeln!(out, "** Running checks on file {}", path);

    let (missing, values): (Vec<_>, Vec<_>) = report
        .header
        .iter()
        .partition(|f| matches!(f.kind, FindingKind::MissingHeaderKey { .. }));
    for finding in missing {
        let _ = writeln!(out, "{}", finding);
    }

    if report.config.is_some() {
        let _ = writeln!(out, "** Checking header values.");
        for finding in values {
            let _ = writeln!(out, "{}", finding);
        }
    }

    for ext in &report.extensions {
        let _ = writeln!(out, "** Checking extension {}", display_name(&ext.id.name, ext.id.index));
        for finding in &ext.findings {
            let _ = writeln!(out, "{}", finding);
        }
        if let Some(err) = &ext.aborted {
            let _ = writeln!(out, "!! Abandoning extension: {}", err);
        }
    }

    let _ = writeln!(out, "{}", summary_line(report));
    out
}

/// Resumen final de un archivo
pub fn summary_line(report: &FileReport) -> String {
    let path = report.path.display();
    match (report.outcome(), &report.fatal) {
        (Outcome::Clean, _) => format!("== {}: no issues detected", path),
        (Outcome::Findings, _) => {
            format!("== {}: completed with {} finding(s)", path, report.finding_count())
        }
        (Outcome::Aborted, Some(err)) => format!(
            "== {}: aborted after {} finding(s): {}",
            path,
            report.finding_count(),
            err
        ),
        (Outcome::Aborted, None) => {
            let aborted = report.extensions.iter().filter(|e| e.aborted.is_some()).count();
            format!(
                "== {}: incomplete, {} extension(s) abandoned, {} finding(s)",
                path,
                aborted,
                report.finding_count()
            )
        }
    }
}

fn display_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        index.to_string()
    } else {
        name.to_string()
    }
}
