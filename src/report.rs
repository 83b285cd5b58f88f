//! Verifier output parsing
//!
//! Reads the human-readable report printed by `cargo kani`: the checks
//! listed between `RESULTS:` and `SUMMARY:`, and the final
//! `VERIFICATION:-` verdict.

use serde::Serialize;
use tracing::warn;

use crate::error::VerifierOutputError;

const RESULTS_HEADER: &str = "RESULTS";
const SUMMARY_HEADER: &str = "SUMMARY";
const CHECK_PREFIX: &str = "Check ";
const VERDICT_PREFIX: &str = "VERIFICATION:-";
const NO_HARNESS_MARKER: &str = "no harnesses matched the harness filter";
const COMPILE_FAILURE_MARKERS: [&str; 2] = ["could not compile", "error: aborting due to"];

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    Failure,
    /// A status string this parser does not know. Never treated as success.
    Unknown(String),
}

impl CheckStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "SUCCESS" | "SATISFIED" | "UNREACHABLE" => CheckStatus::Success,
            "FAILURE" | "UNDETERMINED" | "UNSATISFIABLE" => CheckStatus::Failure,
            other => CheckStatus::Unknown(other.to_string()),
        }
    }
}

/// One `Check N: ...` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub number: Option<u32>,
    pub property: String,
    pub status: CheckStatus,
    pub description: String,
    pub location: String,
}

impl CheckResult {
    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Failure
    }

    /// Three-line summary of a failed property.
    pub fn failure_message(&self) -> String {
        format!(
            "Property - {}\nMessage - {}\nLocation - {}",
            self.property, self.description, self.location
        )
    }
}

/// Overall verdict line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Successful,
    Failed,
}

/// Everything read from one verifier run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    /// Problems met while reading the output, such as unknown statuses.
    pub warnings: Vec<String>,
}

impl VerificationReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| check.is_failure())
    }

    /// Failure messages of every failed check, one block per check.
    pub fn failed_properties(&self) -> String {
        self.failed_checks()
            .map(CheckResult::failure_message)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Description of the last failed check.
    pub fn last_failure_description(&self) -> Option<&str> {
        self.failed_checks().last().map(|check| check.description.as_str())
    }

    pub fn has_unknown_status(&self) -> bool {
        self.checks
            .iter()
            .any(|check| matches!(check.status, CheckStatus::Unknown(_)))
    }

    /// True when no check failed, no status was unknown, and the verdict
    /// (if printed) was successful.
    pub fn is_success(&self) -> bool {
        self.failed_checks().next().is_none()
            && !self.has_unknown_status()
            && self.verdict != Some(Verdict::Failed)
    }
}

/// Parse the standard output of a verifier run.
pub fn parse_verifier_output(stdout: &str) -> VerificationReport {
    let normalized = stdout.replace("\r\n", "\n");
    let sections: Vec<&str> = normalized.split("\n\n").collect();
    let mut report = VerificationReport {
        verdict: parse_verdict(&normalized),
        ..Default::default()
    };

    let Some(start) = sections.iter().position(|s| s.contains(RESULTS_HEADER)) else {
        return report;
    };
    let end = sections
        .iter()
        .position(|s| s.contains(SUMMARY_HEADER))
        .filter(|&end| end >= start)
        .unwrap_or(sections.len());

    for section in &sections[start..end] {
        let section = strip_results_header(section);
        let Some(check) = parse_check(section) else {
            continue;
        };
        if let CheckStatus::Unknown(raw) = &check.status {
            let message = format!("check '{}' has unknown status '{}'", check.property, raw);
            warn!("{}", message);
            report.warnings.push(message);
        }
        report.checks.push(check);
    }

    report
}

/// Recognize failures of the verifier run itself.
pub fn detect_output_error(stdout: &str, stderr: &str) -> Option<VerifierOutputError> {
    let lines = || stderr.lines().chain(stdout.lines()).map(str::trim);

    if let Some(line) = lines().find(|line| line.contains(NO_HARNESS_MARKER)) {
        let filter = line
            .split_once(NO_HARNESS_MARKER)
            .map(|(_, rest)| rest.trim_start_matches(':').trim().trim_matches('`'))
            .unwrap_or("")
            .to_string();
        return Some(VerifierOutputError::NoHarnessMatched { filter });
    }

    if lines().any(|line| COMPILE_FAILURE_MARKERS.iter().any(|m| line.contains(m))) {
        let message = lines()
            .find(|line| line.starts_with("error"))
            .unwrap_or("")
            .to_string();
        return Some(VerifierOutputError::CompilationFailed { message });
    }

    None
}

fn strip_results_header(section: &str) -> &str {
    match section.find("RESULTS:\n") {
        Some(index) => &section[index + "RESULTS:\n".len()..],
        None => section,
    }
}

fn parse_check(section: &str) -> Option<CheckResult> {
    let mut lines = section.lines().map(str::trim).filter(|line| !line.is_empty());
    let header = lines.next()?.strip_prefix(CHECK_PREFIX)?;
    let (number, property) = header.split_once(':').unwrap_or((header, ""));

    let mut status = None;
    let mut description = String::new();
    let mut location = String::new();
    for line in lines {
        let Some((field, value)) = line.trim_start_matches('-').split_once(':') else {
            continue;
        };
        let value = value.trim();
        match field.trim() {
            "Status" => status = Some(CheckStatus::parse(value)),
            "Description" => description = value.trim_matches('"').to_string(),
            "Location" => location = value.to_string(),
            _ => {}
        }
    }

    Some(CheckResult {
        number: number.trim().parse().ok(),
        property: property.trim().to_string(),
        status: status.unwrap_or_else(|| CheckStatus::Unknown(String::new())),
        description,
        location,
    })
}

fn parse_verdict(output: &str) -> Option<Verdict> {
    output.lines().rev().find_map(|line| {
        match line.trim().strip_prefix(VERDICT_PREFIX)?.trim() {
            "SUCCESSFUL" => Some(Verdict::Successful),
            "FAILED" => Some(Verdict::Failed),
            _ => None,
        }
    })
}
