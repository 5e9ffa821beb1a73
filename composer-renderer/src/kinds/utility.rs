//! Learner tools: `save_progress` and `submission_report`.
//!
//! Both render controls only; the runtime does the work. Their own outputs
//! (the backup file picker, the generated report text) are marked
//! `data-cf-no-persist` so they never enter a progress snapshot.

use std::fmt::Write;

use serde_json::{json, Value};

use crate::data;
use crate::html;
use crate::registry::CompileContext;

/// Default save-progress data.
#[must_use]
pub fn save_progress_default() -> Value {
    json!({
        "title": "Save your progress",
        "description": "Download a backup of your answers, then load it later to pick up where you left off."
    })
}

/// Compile save/load controls.
#[must_use]
pub fn compile_save_progress(ctx: &CompileContext<'_>) -> String {
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str("<div class=\"cf-save\" data-cf-save>");
    out.push_str(&html::paragraphs(&data::text(ctx.data, "description")));
    let input_id = ctx.dom_id("backup");
    let _ = write!(
        out,
        "<div class=\"cf-actions\"><button type=\"button\" class=\"cf-button\" data-cf-action=\"save-progress\">Save progress</button><label class=\"cf-button cf-button--ghost cf-file\" for=\"{input_id}\">Load progress</label><input class=\"cf-visually-hidden\" id=\"{input_id}\" type=\"file\" accept=\".json,application/json\" data-cf-action=\"load-progress\" data-cf-no-persist></div><p class=\"cf-status\" data-cf-save-status role=\"status\" aria-live=\"polite\"></p></div>"
    );
    out
}

/// Default submission-report data.
#[must_use]
pub fn submission_report_default() -> Value {
    json!({
        "title": "Submission report",
        "instructions": "Generate a report of your answers, then copy, download or print it for your teacher."
    })
}

/// Compile report controls.
#[must_use]
pub fn compile_submission_report(ctx: &CompileContext<'_>) -> String {
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str("<div class=\"cf-report\" data-cf-report>");
    out.push_str(&html::paragraphs(&data::text(ctx.data, "instructions")));
    out.push_str(concat!(
        "<div class=\"cf-actions\">",
        "<button type=\"button\" class=\"cf-button\" data-cf-action=\"report-build\">Generate report</button>",
        "<button type=\"button\" class=\"cf-button cf-button--ghost\" data-cf-action=\"report-copy\">Copy</button>",
        "<button type=\"button\" class=\"cf-button cf-button--ghost\" data-cf-action=\"report-download\">Download .txt</button>",
        "<button type=\"button\" class=\"cf-button cf-button--ghost\" data-cf-action=\"report-print\">Print</button>",
        "</div>",
        "<textarea class=\"cf-report__output\" rows=\"12\" readonly aria-label=\"Submission report\" data-cf-report-output data-cf-no-persist></textarea>",
        "<p class=\"cf-status\" data-cf-report-status role=\"status\" aria-live=\"polite\"></p>",
        "</div>"
    ));
    out
}
