//! Command execution.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use composer_core::{
    build_grid_model, build_offline_report, normalize_layout, ApplyOutcome, CourseSettings,
    GridModelOptions, Module, ProgressSnapshot,
};
use composer_renderer::lint::has_errors;
use composer_renderer::{
    compile_module, scan_persistable_controls, validate_module, CompileOptions, CompiledModule,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{Command, ComposerConfig};

/// Whether a command succeeded in the caller's terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Command completed.
    Success,
    /// Command completed but found blocking problems (lint errors).
    Failed,
}

/// Result of lining a backup up against a freshly compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInspection {
    /// Save time recorded in the backup.
    pub saved_at: String,
    /// Fields stored in the backup.
    pub field_count: usize,
    /// Persistable controls in the compiled module.
    pub control_count: usize,
    /// Positional apply counts.
    pub outcome: ApplyOutcome,
    /// Whether every field landed on a matching control.
    pub exact: bool,
}

/// Run a configured command, writing stdout output to `out`.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, or an
/// output cannot be written.
pub fn run(config: &ComposerConfig, out: &mut impl Write) -> Result<RunStatus> {
    let options = compile_options(config)?;

    match &config.command {
        Command::Compile {
            input,
            output,
            triple,
        } => {
            let module = read_module(input)?;
            let compiled = compile_module(&module, &options);
            let text = if *triple {
                serde_json::to_string_pretty(&compiled).context("Failed to encode compiled module")?
            } else {
                compiled.to_document()
            };
            info!(module = %module.id, triple, bytes = text.len(), "compiled module");
            emit(output.as_deref(), &text, out)?;
        }
        Command::Lint { input } => {
            let module = read_module(input)?;
            let issues = validate_module(&module);
            writeln!(out, "{}", serde_json::to_string_pretty(&issues)?)?;
            info!(module = %module.id, issues = issues.len(), "linted module");
            if has_errors(&issues) {
                warn!(module = %module.id, "module has blocking lint errors");
                return Ok(RunStatus::Failed);
            }
        }
        Command::Grid {
            input,
            max_columns,
            min_rows,
            trailing_rows,
        } => {
            let module = read_module(input)?;
            let columns =
                max_columns.unwrap_or_else(|| normalize_layout(&module.composer_layout).max_columns);
            let grid = build_grid_model(
                &module.activities,
                columns,
                GridModelOptions {
                    min_rows: *min_rows,
                    trailing_rows: *trailing_rows,
                },
            );
            writeln!(out, "{}", serde_json::to_string_pretty(&grid)?)?;
        }
        Command::InspectSnapshot { module, backup } => {
            let module = read_module(module)?;
            let snapshot = read_snapshot(backup)?;
            let inspection = inspect_snapshot(&module, &snapshot, &options);
            if !inspection.exact {
                warn!(outcome = ?inspection.outcome, "backup does not line up with module");
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&inspection)?)?;
        }
        Command::Report {
            module,
            backup,
            generated_at,
            output,
        } => {
            let module = read_module(module)?;
            let snapshot = read_snapshot(backup)?;
            let generated_at = match generated_at {
                Some(text) => DateTime::parse_from_rfc3339(text)
                    .with_context(|| format!("Invalid --generated-at timestamp: {text}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let text = report_text(&module, &snapshot, &options, generated_at);
            emit(output.as_deref(), &text, out)?;
        }
    }

    Ok(RunStatus::Success)
}

/// Compile, apply the backup positionally and count the fit.
#[must_use]
pub fn inspect_snapshot(
    module: &Module,
    snapshot: &ProgressSnapshot,
    options: &CompileOptions,
) -> SnapshotInspection {
    let compiled = compile_module(module, options);
    let mut controls = scan_persistable_controls(&compiled.html);
    let outcome = snapshot.apply_to(&mut controls);
    SnapshotInspection {
        saved_at: snapshot.saved_at.clone(),
        field_count: snapshot.fields.len(),
        control_count: controls.len(),
        outcome,
        exact: outcome.is_exact(),
    }
}

fn report_text(
    module: &Module,
    snapshot: &ProgressSnapshot,
    options: &CompileOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let compiled: CompiledModule = compile_module(module, options);
    let mut controls = scan_persistable_controls(&compiled.html);
    let outcome = snapshot.apply_to(&mut controls);
    debug!(?outcome, "applied backup for report");
    build_offline_report(&compiled.title, &controls, generated_at).render_text()
}

fn compile_options(config: &ComposerConfig) -> Result<CompileOptions> {
    let Some(path) = &config.settings_path else {
        return Ok(CompileOptions::new().with_course_settings(config.course_settings.clone()));
    };
    let json = read_text(path)?;
    let from_file = CompileOptions::from_settings_json(&json)
        .with_context(|| format!("Failed to parse settings {}", path.display()))?;
    let CourseSettings {
        template_default,
        theme_default,
    } = from_file.course_settings;
    Ok(CompileOptions::new().with_course_settings(CourseSettings {
        template_default: template_default.or_else(|| config.course_settings.template_default.clone()),
        theme_default: theme_default.or_else(|| config.course_settings.theme_default.clone()),
    }))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_module(path: &Path) -> Result<Module> {
    let json = read_text(path)?;
    let module = Module::from_json(&json)
        .with_context(|| format!("Failed to parse module {}", path.display()))?;
    debug!(path = %path.display(), activities = module.activities.len(), "loaded module");
    Ok(module)
}

fn read_snapshot(path: &Path) -> Result<ProgressSnapshot> {
    let json = read_text(path)?;
    ProgressSnapshot::parse(&json).with_context(|| format!("Failed to load backup {}", path.display()))
}

fn emit(path: Option<&Path>, text: &str, out: &mut impl Write) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::{Activity, SnapshotUi};
    use serde_json::json;

    fn quiz_module() -> Module {
        Module::new("Quiz").with_activity(
            Activity::new(
                "knowledge_check",
                json!({
                    "title": "Check",
                    "questions": [{"type": "short_answer", "prompt": "Why save?"}]
                }),
            )
            .with_id("kc"),
        )
    }

    #[test]
    fn test_inspect_snapshot_exact_fit() {
        let module = quiz_module();
        let compiled = compile_module(&module, &CompileOptions::new());
        let controls = scan_persistable_controls(&compiled.html);
        let snapshot = ProgressSnapshot::capture(&controls, SnapshotUi::default(), "2026-01-01T00:00:00Z");

        let inspection = inspect_snapshot(&module, &snapshot, &CompileOptions::new());
        assert!(inspection.exact);
        assert_eq!(inspection.field_count, inspection.control_count);
        assert_eq!(inspection.saved_at, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_inspect_snapshot_reports_extra_fields() {
        let module = quiz_module();
        let compiled = compile_module(&module, &CompileOptions::new());
        let mut controls = scan_persistable_controls(&compiled.html);
        controls.extend(controls.clone());
        let snapshot = ProgressSnapshot::capture(&controls, SnapshotUi::default(), "");

        let inspection = inspect_snapshot(&module, &snapshot, &CompileOptions::new());
        assert!(!inspection.exact);
        assert_eq!(inspection.outcome.extra, inspection.control_count);
    }

    #[test]
    fn test_report_text_uses_module_title() {
        let snapshot = ProgressSnapshot::capture(&[], SnapshotUi::default(), "");
        let at = DateTime::parse_from_rfc3339("2026-03-14T09:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let text = report_text(&quiz_module(), &snapshot, &CompileOptions::new(), at);
        assert!(text.starts_with("Submission Report: Quiz\nGenerated: 2026-03-14T09:30:00Z\n"));
        assert!(text.contains("[Check]"));
    }
}
