//! Output formatting for harness listings, commands and verifier reports
//!
//! Formats results as human-readable text, JSON, or Markdown

use kani_harness_parser::report::CheckStatus;
use kani_harness_parser::{
    FileScan, HarnessMetadata, VerificationReport, VerifierCommand, VerifierOutputError,
};
use serde_json::json;

use crate::cli::discover::Discovery;

/// Format a listing as human-readable text
pub fn format_list_human(discovery: &Discovery, scans: &[FileScan]) -> String {
    let mut output = String::new();

    for scan in scans {
        let path = scan
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<source>".to_string());
        output.push_str(&format!("{}\n", path));

        for harness in &scan.harnesses {
            output.push_str(&format!("  {}\n", describe_harness(harness)));
            for attribute in &harness.attributes {
                output.push_str(&format!("      {}\n", attribute));
            }
        }
        for desync in &scan.desyncs {
            output.push_str(&format!("  ❌ {}\n", desync));
        }
        output.push('\n');
    }

    for error in &discovery.errors {
        output.push_str(&format!("⚠️  {}\n", error));
    }

    let harnesses: usize = scans.iter().map(|s| s.harnesses.len()).sum();
    let desyncs: usize = scans.iter().map(|s| s.desyncs.len()).sum();
    output.push_str(&format!(
        "harnesses: {}. {} found in {} files; {} desynced; {} unreadable\n",
        if desyncs > 0 { "DESYNCED" } else { "ok" },
        harnesses,
        scans.len(),
        desyncs,
        discovery.errors.len()
    ));

    output
}

/// Format a listing as JSON
pub fn format_list_json(discovery: &Discovery, scans: &[FileScan]) -> String {
    let harnesses: usize = scans.iter().map(|s| s.harnesses.len()).sum();
    let desyncs: usize = scans.iter().map(|s| s.desyncs.len()).sum();
    let errors: Vec<String> = discovery.errors.iter().map(|e| e.to_string()).collect();

    let output = json!({
        "summary": {
            "files": scans.len(),
            "harnesses": harnesses,
            "desyncs": desyncs,
            "unreadable": errors.len(),
        },
        "files": scans,
        "errors": errors,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Format a listing as a Markdown table
pub fn format_list_markdown(scans: &[FileScan]) -> String {
    let mut md = String::new();

    md.push_str("# Kani Harnesses\n\n");
    md.push_str("| File | Harness | Line | Module | Unwind | Solver | Flags |\n");
    md.push_str("|------|---------|------|--------|--------|--------|-------|\n");

    for scan in scans {
        let file = scan
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        for harness in &scan.harnesses {
            md.push_str(&format!(
                "| `{}` | `{}` | {} | {} | {} | {} | {} |\n",
                file,
                harness.name,
                harness.end_position.row + 1,
                harness.module.as_deref().unwrap_or("-"),
                unwind_label(harness).unwrap_or_else(|| "-".to_string()),
                harness.args.solver.as_deref().unwrap_or("-"),
                flag_labels(harness).join(", "),
            ));
        }
    }

    let desynced: Vec<_> = scans.iter().flat_map(|s| &s.desyncs).collect();
    if !desynced.is_empty() {
        md.push_str("\n## Desynced Harnesses\n\n");
        for desync in desynced {
            md.push_str(&format!("- {}\n", desync));
        }
    }

    md
}

/// Format verifier commands, one per line in retry order
pub fn format_commands_human(commands: &[VerifierCommand]) -> String {
    commands
        .iter()
        .map(|command| format!("{}\n", command))
        .collect()
}

pub fn format_commands_json(commands: &[VerifierCommand]) -> String {
    serde_json::to_string_pretty(commands).unwrap_or_else(|_| "[]".to_string())
}

/// Format a verifier report as human-readable text
pub fn format_report_human(
    report: &VerificationReport,
    error: Option<&VerifierOutputError>,
) -> String {
    let mut output = String::new();

    if let Some(error) = error {
        output.push_str(&format!("❌ {}\n\n", error));
    }

    for check in &report.checks {
        let status = match &check.status {
            CheckStatus::Success => "✅ SUCCESS".to_string(),
            CheckStatus::Failure => "❌ FAILURE".to_string(),
            CheckStatus::Unknown(raw) => format!("⚠️  UNKNOWN ({})", raw),
        };
        output.push_str(&format!("{}\n  Status: {}\n", check.property, status));
        if !check.is_failure() {
            continue;
        }
        output.push_str(&format!("    Description: {}\n", check.description));
        output.push_str(&format!("    Location: {}\n", check.location));
    }

    for warning in &report.warnings {
        output.push_str(&format!("⚠️  {}\n", warning));
    }

    let failed = report.failed_checks().count();
    output.push_str(&format!(
        "\nverification result: {}. {} checks; {} failed\n",
        if report.is_success() && error.is_none() {
            "ok"
        } else {
            "FAILED"
        },
        report.checks.len(),
        failed
    ));

    output
}

pub fn format_report_json(
    report: &VerificationReport,
    error: Option<&VerifierOutputError>,
) -> String {
    let output = json!({
        "success": report.is_success() && error.is_none(),
        "error": error.map(|e| e.to_string()),
        "failed_properties": report.failed_properties(),
        "last_failure": report.last_failure_description(),
        "report": report,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

fn describe_harness(harness: &HarnessMetadata) -> String {
    let mut line = format!("{} (line {})", harness.name, harness.end_position.row + 1);
    if let Some(module) = &harness.module {
        line.push_str(&format!(" [{}]", module));
    }
    if let Some(unwind) = unwind_label(harness) {
        line.push_str(&format!(" unwind={}", unwind));
    }
    if let Some(solver) = &harness.args.solver {
        line.push_str(&format!(" solver={}", solver));
    }
    let flags = flag_labels(harness);
    if !flags.is_empty() {
        line.push_str(&format!(" ({})", flags.join(", ")));
    }
    line
}

fn unwind_label(harness: &HarnessMetadata) -> Option<String> {
    harness
        .args
        .unwind
        .map(|bound| match bound.value() {
            Some(n) => n.to_string(),
            None => "?".to_string(),
        })
}

fn flag_labels(harness: &HarnessMetadata) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if harness.flags.is_test_style {
        labels.push("tests");
    }
    if harness.flags.has_stub {
        labels.push("stubbing");
    }
    labels
}
