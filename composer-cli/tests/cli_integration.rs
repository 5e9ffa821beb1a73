//! File round-trips through the command runner.

use std::fs;
use std::path::{Path, PathBuf};

use composer_cli::{run, Command, ComposerConfig, RunStatus};
use composer_core::{ProgressSnapshot, SnapshotUi};
use composer_renderer::{compile_module, scan_persistable_controls, CompileOptions};
use serde_json::{json, Value};
use tempfile::TempDir;

fn module_json() -> Value {
    json!({
        "id": "budget",
        "title": "Budget Basics",
        "composerLayout": {"mode": "simple", "maxColumns": 2},
        "activities": [
            {
                "id": "kc",
                "type": "knowledge_check",
                "data": {
                    "title": "Quick check",
                    "questions": [{"type": "multiple_choice", "prompt": "Pick one", "options": ["Save", "Spend"], "correctIndex": 0}]
                },
                "layout": {"colSpan": 2}
            },
            {
                "id": "todo",
                "type": "checklist",
                "data": {"title": "Tasks", "items": ["Open account"]},
                "layout": {"colSpan": 1}
            }
        ]
    })
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, value.to_string()).expect("write fixture");
    path
}

fn run_to_string(config: &ComposerConfig) -> (RunStatus, String) {
    let mut out = Vec::new();
    let status = run(config, &mut out).expect("run");
    (status, String::from_utf8(out).expect("utf8"))
}

fn backup_for(module: &Path, dir: &TempDir) -> PathBuf {
    let module: composer_core::Module =
        serde_json::from_str(&fs::read_to_string(module).expect("read")).expect("module");
    let compiled = compile_module(&module, &CompileOptions::new());
    let mut controls = scan_persistable_controls(&compiled.html);
    controls[0].checked = true;
    let snapshot = ProgressSnapshot::capture(&controls, SnapshotUi::default(), "2026-03-14T09:00:00Z");
    let path = dir.path().join("backup.json");
    fs::write(&path, snapshot.to_json().expect("encode")).expect("write backup");
    path
}

#[test]
fn test_compile_writes_standalone_document() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_json(&dir, "module.json", &module_json());
    let output = dir.path().join("module.html");

    let (status, stdout) = run_to_string(&ComposerConfig::new(Command::Compile {
        input,
        output: Some(output.clone()),
        triple: false,
    }));
    assert_eq!(status, RunStatus::Success);
    assert!(stdout.is_empty());

    let html = fs::read_to_string(output).expect("read output");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("data-cf-activity=\"kc\""));
    assert!(html.contains("__cfComposerBound"));
}

#[test]
fn test_compile_triple_to_stdout() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_json(&dir, "module.json", &module_json());

    let (_, stdout) = run_to_string(&ComposerConfig::new(Command::Compile {
        input,
        output: None,
        triple: true,
    }));
    let triple: Value = serde_json::from_str(&stdout).expect("json triple");
    for key in ["html", "css", "script"] {
        assert!(triple[key].as_str().is_some_and(|s| !s.is_empty()), "{key}");
    }
}

#[test]
fn test_settings_file_sets_template_default() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_json(&dir, "module.json", &module_json());
    let settings = write_json(&dir, "course.json", &json!({"templateDefault": "coursebook"}));

    let config = ComposerConfig::new(Command::Compile {
        input,
        output: None,
        triple: true,
    })
    .with_settings_path(settings);
    let (_, stdout) = run_to_string(&config);
    assert!(stdout.contains("data-cf-template=\\\"coursebook\\\""));
}

#[test]
fn test_lint_fails_on_errors() {
    let dir = TempDir::new().expect("tempdir");
    let mut module = module_json();
    module["activities"][1]["type"] = json!("hologram");
    let input = write_json(&dir, "module.json", &module);

    let (status, stdout) = run_to_string(&ComposerConfig::new(Command::Lint { input }));
    assert_eq!(status, RunStatus::Failed);
    let issues: Vec<Value> = serde_json::from_str(&stdout).expect("issues");
    assert!(issues
        .iter()
        .any(|i| i["activityId"] == "todo" && i["level"] == "error"));
}

#[test]
fn test_lint_clean_module_succeeds() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_json(&dir, "module.json", &module_json());
    let (status, _) = run_to_string(&ComposerConfig::new(Command::Lint { input }));
    assert_eq!(status, RunStatus::Success);
}

#[test]
fn test_grid_reports_trailing_row() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_json(&dir, "module.json", &module_json());

    let (_, stdout) = run_to_string(&ComposerConfig::new(Command::Grid {
        input,
        max_columns: None,
        min_rows: 0,
        trailing_rows: 1,
    }));
    let grid: Value = serde_json::from_str(&stdout).expect("grid");
    assert_eq!(grid["rowCount"], 3);
    assert_eq!(grid["placements"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_inspect_and_report_from_backup() {
    let dir = TempDir::new().expect("tempdir");
    let module = write_json(&dir, "module.json", &module_json());
    let backup = backup_for(&module, &dir);

    let (_, stdout) = run_to_string(&ComposerConfig::new(Command::InspectSnapshot {
        module: module.clone(),
        backup: backup.clone(),
    }));
    let inspection: Value = serde_json::from_str(&stdout).expect("inspection");
    assert_eq!(inspection["exact"], true);
    assert_eq!(inspection["savedAt"], "2026-03-14T09:00:00Z");

    let report_path = dir.path().join("report.txt");
    run_to_string(&ComposerConfig::new(Command::Report {
        module,
        backup,
        generated_at: Some("2026-03-14T09:30:00Z".to_string()),
        output: Some(report_path.clone()),
    }));
    assert_eq!(
        fs::read_to_string(report_path).expect("report"),
        "Submission Report: Budget Basics\nGenerated: 2026-03-14T09:30:00Z\n\n[Quick check]\n- Q1: Pick one: Save / Result: Correct\n\n[Tasks]\n- [ ] Open account\n"
    );
}

#[test]
fn test_foreign_backup_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let module = write_json(&dir, "module.json", &module_json());
    let backup = write_json(&dir, "backup.json", &json!({"kind": "other", "fields": []}));

    let mut out = Vec::new();
    let err = run(
        &ComposerConfig::new(Command::InspectSnapshot { module, backup }),
        &mut out,
    )
    .expect_err("foreign kind");
    assert!(format!("{err:#}").contains("Unsupported backup type for this module."));
}

#[test]
fn test_missing_input_names_path() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("absent.json");
    let mut out = Vec::new();
    let err = run(&ComposerConfig::new(Command::Lint { input }), &mut out).expect_err("missing");
    assert!(err.to_string().contains("absent.json"));
}
