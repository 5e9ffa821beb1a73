//! Submission report text format.
//!
//! A report is a read-only summary of learner input:
//!
//! ```text
//! Submission Report: <module title>
//! Generated: <RFC 3339 timestamp>
//!
//! [Section Title]
//! - line
//! - line
//! ```

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::snapshot::FormControl;

/// Prefix of the first header line.
pub const REPORT_TITLE_PREFIX: &str = "Submission Report: ";

/// Prefix of the second header line.
pub const REPORT_GENERATED_PREFIX: &str = "Generated: ";

/// Placeholder for an empty answer.
pub const NO_RESPONSE: &str = "(no response)";

/// One `[Section]` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    /// Section heading.
    pub title: String,
    /// Lines, rendered with a `- ` prefix.
    pub lines: Vec<String>,
}

impl ReportSection {
    /// Create an empty section.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// A learner-to-teacher submission summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    /// Module title.
    pub title: String,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
    /// Sections in document order.
    pub sections: Vec<ReportSection>,
}

impl SubmissionReport {
    /// Create an empty report.
    #[must_use]
    pub fn new(title: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            generated_at,
            sections: Vec::new(),
        }
    }

    /// Render as plain text.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let title = if self.title.trim().is_empty() {
            "Module"
        } else {
            self.title.trim()
        };
        let _ = writeln!(out, "{REPORT_TITLE_PREFIX}{title}");
        let _ = writeln!(
            out,
            "{REPORT_GENERATED_PREFIX}{}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        for section in &self.sections {
            let _ = write!(out, "\n[{}]\n", section.title);
            if section.lines.is_empty() {
                let _ = writeln!(out, "- {NO_RESPONSE}");
            }
            for line in &section.lines {
                let _ = writeln!(out, "- {}", line.replace('\n', " / "));
            }
        }
        out
    }
}

/// Build a report from controls recovered from a compiled document.
///
/// Controls are grouped by owning activity in document order. Radio groups
/// (consecutive radios sharing a label) contribute their selected option or
/// a no-response line, plus `Result: Correct|Incorrect` when the choice is
/// graded; checkboxes render as `[x]`/`[ ]` items.
#[must_use]
pub fn build_offline_report(
    title: &str,
    controls: &[FormControl],
    generated_at: DateTime<Utc>,
) -> SubmissionReport {
    let mut report = SubmissionReport::new(title, generated_at);
    let mut current_activity: Option<&str> = None;
    let mut index = 0;

    while index < controls.len() {
        let control = &controls[index];
        let owner = control.activity_id.as_deref();
        if owner != current_activity || report.sections.is_empty() {
            let heading = control
                .section
                .clone()
                .or_else(|| control.activity_id.clone())
                .unwrap_or_else(|| "Responses".to_string());
            report.sections.push(ReportSection::new(heading));
            current_activity = owner;
        }
        let Some(section) = report.sections.last_mut() else {
            break;
        };
        let label = control.label.as_deref().unwrap_or("Response");

        match control.control_type.as_str() {
            "radio" => {
                let group_end = controls[index..]
                    .iter()
                    .position(|c| {
                        c.control_type != "radio"
                            || c.label != control.label
                            || c.activity_id != control.activity_id
                    })
                    .map_or(controls.len(), |offset| index + offset);
                let line = match controls[index..group_end].iter().find(|c| c.checked) {
                    Some(chosen) => {
                        let text = chosen.option.as_deref().unwrap_or(&chosen.value);
                        match chosen.correct {
                            Some(true) => format!("{label}: {text} / Result: Correct"),
                            Some(false) => format!("{label}: {text} / Result: Incorrect"),
                            None => format!("{label}: {text}"),
                        }
                    }
                    None => format!("{label}: {NO_RESPONSE}"),
                };
                section.push(line);
                index = group_end;
                continue;
            }
            "checkbox" => {
                let mark = if control.checked { "[x]" } else { "[ ]" };
                let text = control.option.as_deref().unwrap_or(label);
                section.push(format!("{mark} {text}"));
            }
            _ => {
                let value = control.value.trim();
                section.push(format!(
                    "{label}: {}",
                    if value.is_empty() { NO_RESPONSE } else { value }
                ));
            }
        }
        index += 1;
    }

    report
}
