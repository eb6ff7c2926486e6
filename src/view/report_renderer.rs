use std::fmt::Write;
use std::io;
use std::io::ErrorKind;

use serde::Serialize;

use crate::lint::{Diagnostic, LintReport};

#[derive(Serialize)]
struct JsonReport<'a> {
    files_checked: usize,
    errors: usize,
    warnings: usize,
    diagnostics: &'a [Diagnostic],
}

/// `path:line: severity[rule]: message`, one per line, then a summary.
pub fn render_text(report: &LintReport) -> String {
    let mut out = String::new();
    for d in &report.diagnostics {
        match d.line {
            Some(line) => {
                let _ = writeln!(out, "{}:{}: {}[{}]: {}", d.path.display(), line, d.severity, d.rule, d.message);
            }
            None => {
                let _ = writeln!(out, "{}: {}[{}]: {}", d.path.display(), d.severity, d.rule, d.message);
            }
        }
    }

    let _ = writeln!(out, "{} files checked: {} {}, {} {}",
                     report.files_checked,
                     report.errors(), plural(report.errors(), "error"),
                     report.warnings(), plural(report.warnings(), "warning"));
    out
}

pub fn render_json(report: &LintReport) -> io::Result<String> {
    let json = JsonReport {
        files_checked: report.files_checked,
        errors: report.errors(),
        warnings: report.warnings(),
        diagnostics: &report.diagnostics,
    };
    serde_json::to_string_pretty(&json)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error writing JSON report: {}", e)))
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
