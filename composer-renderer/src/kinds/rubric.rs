//! `rubric`: a self-scored criteria grid.

use std::fmt::Write;

use serde_json::{json, Value};

use super::{clamp_count, nth_text, title_issue};
use crate::data;
use crate::html::escape;
use crate::registry::{CompileContext, Issue, Normalized};

/// Inclusive bounds for rubric rows and columns.
pub const RUBRIC_BOUNDS: (usize, usize) = (2, 5);

/// One scoring level.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricColumn {
    /// Level label.
    pub label: String,
    /// Points awarded for this level.
    pub score: f64,
}

/// One criterion with a cell per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricRow {
    /// Criterion label.
    pub label: String,
    /// Cell descriptions, one per column.
    pub cells: Vec<String>,
}

/// Canonical rubric grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricModel {
    /// Criteria.
    pub rows: Vec<RubricRow>,
    /// Scoring levels.
    pub columns: Vec<RubricColumn>,
}

impl RubricModel {
    /// Highest achievable total.
    #[must_use]
    pub fn max_total(&self) -> f64 {
        let best = self
            .columns
            .iter()
            .map(|c| c.score)
            .fold(0.0_f64, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let rows = self.rows.len() as f64;
        best * rows
    }
}

/// Default rubric data.
#[must_use]
pub fn default_data() -> Value {
    json!({
        "title": "Rubric",
        "rowCount": 3,
        "columnCount": 3,
        "rows": [{"label": "Clarity"}, {"label": "Evidence"}, {"label": "Reflection"}],
        "columns": [
            {"label": "Beginning", "score": 1},
            {"label": "Developing", "score": 2},
            {"label": "Proficient", "score": 3}
        ],
        "cells": []
    })
}

fn cell_text(cells: &[Value], row: usize, col: usize) -> String {
    cells
        .get(row)
        .and_then(Value::as_array)
        .map(|row_cells| nth_text(row_cells, col))
        .unwrap_or_default()
}

/// Normalize rubric data: clamp counts, default labels and scores, and
/// synthesize missing cell text as `"<row>: <column>"`.
#[must_use]
pub fn normalize_rubric(data: &Value) -> Normalized<RubricModel> {
    let mut adjustments = Vec::new();
    let raw_rows = data::array(data, "rows");
    let raw_columns = data::array(data, "columns");
    let raw_cells = data::array(data, "cells");

    let row_count = clamp_count(
        data::int(data, "rowCount"),
        raw_rows.len(),
        3,
        RUBRIC_BOUNDS,
        ("rubric", "rows"),
        &mut adjustments,
    );
    let column_count = clamp_count(
        data::int(data, "columnCount"),
        raw_columns.len(),
        3,
        RUBRIC_BOUNDS,
        ("rubric", "columns"),
        &mut adjustments,
    );

    let columns: Vec<RubricColumn> = (0..column_count)
        .map(|c| {
            let raw = raw_columns.get(c).unwrap_or(&Value::Null);
            let label = data::item_text(raw);
            #[allow(clippy::cast_precision_loss)]
            let fallback = (c + 1) as f64;
            RubricColumn {
                label: if label.is_empty() {
                    format!("Level {}", c + 1)
                } else {
                    label
                },
                score: data::float(raw, "score").unwrap_or(fallback),
            }
        })
        .collect();

    let rows = (0..row_count)
        .map(|r| {
            let label = nth_text(raw_rows, r);
            let label = if label.is_empty() {
                format!("Criterion {}", r + 1)
            } else {
                label
            };
            let cells = columns
                .iter()
                .enumerate()
                .map(|(c, column)| {
                    let text = cell_text(raw_cells, r, c);
                    if text.is_empty() {
                        format!("{label}: {}", column.label)
                    } else {
                        text
                    }
                })
                .collect();
            RubricRow { label, cells }
        })
        .collect();

    Normalized {
        value: RubricModel { rows, columns },
        adjustments,
    }
}

/// Compile a rubric.
#[must_use]
pub fn compile(ctx: &CompileContext<'_>) -> String {
    let model = normalize_rubric(ctx.data).value;
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-rubric\" data-cf-rubric data-cf-rubric-max=\"{}\"><div class=\"cf-table-wrap\"><table class=\"cf-table\"><thead><tr><th scope=\"col\">Criteria</th>",
        model.max_total()
    );
    for column in &model.columns {
        let _ = write!(
            out,
            "<th scope=\"col\">{} <span class=\"cf-rubric__score\">({})</span></th>",
            escape(&column.label),
            column.score
        );
    }
    out.push_str("</tr></thead><tbody>");
    for (r, row) in model.rows.iter().enumerate() {
        let name = ctx.dom_id(&format!("r{}", r + 1));
        let _ = write!(
            out,
            "<tr data-cf-rubric-row=\"{}\"><th scope=\"row\">{}</th>",
            r + 1,
            escape(&row.label)
        );
        for (cell, column) in row.cells.iter().zip(&model.columns) {
            let _ = write!(
                out,
                "<td><label class=\"cf-rubric__cell\"><input type=\"radio\" name=\"{name}\" value=\"{}\" data-cf-score=\"{}\" data-cf-label=\"{}\" data-cf-option=\"{}\"> <span>{}</span></label></td>",
                column.score,
                column.score,
                escape(&row.label),
                escape(&column.label),
                escape(cell)
            );
        }
        out.push_str("</tr>");
    }
    let _ = write!(
        out,
        "</tbody></table></div><p class=\"cf-rubric__total\">Total: <output data-cf-rubric-total>0</output> / {}</p></div>",
        model.max_total()
    );
    out
}

/// Validate a rubric.
#[must_use]
pub fn validate(data: &Value) -> Vec<Issue> {
    let normalized = normalize_rubric(data);
    let mut issues: Vec<Issue> = title_issue(data, "rubric").into_iter().collect();
    let authored_rows = data::array(data, "rows").len();
    if let Some(count) = data::int(data, "rowCount") {
        if authored_rows > 0 && usize::try_from(count).ok() != Some(authored_rows) {
            issues.push(Issue::warn(format!(
                "rubric rowCount {count} does not match {authored_rows} authored rows"
            )));
        }
    }
    let authored_columns = data::array(data, "columns").len();
    if let Some(count) = data::int(data, "columnCount") {
        if authored_columns > 0 && usize::try_from(count).ok() != Some(authored_columns) {
            issues.push(Issue::warn(format!(
                "rubric columnCount {count} does not match {authored_columns} authored columns"
            )));
        }
    }
    issues.extend(normalized.warnings());
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IssueLevel;

    #[test]
    fn test_row_count_six_clamped_to_five_with_warning() {
        let data = json!({"title": "R", "rowCount": 6, "columnCount": 3});
        let normalized = normalize_rubric(&data);
        assert_eq!(normalized.value.rows.len(), 5);
        assert_eq!(
            normalized.adjustments,
            vec!["rubric clamped to 5 rows (requested 6)".to_string()]
        );
        let issues = validate(&data);
        assert!(issues
            .iter()
            .any(|i| i.level == IssueLevel::Warn && i.message.contains("clamped to 5 rows")));
    }

    #[test]
    fn test_missing_cells_synthesized_from_labels() {
        let data = json!({
            "rows": [{"label": "Clarity"}, {"label": "Depth"}],
            "columns": [{"label": "Low", "score": 1}, {"label": "High", "score": 4}],
            "cells": [["Unclear"]]
        });
        let model = normalize_rubric(&data).value;
        assert_eq!(model.rows[0].cells, vec!["Unclear", "Clarity: High"]);
        assert_eq!(model.rows[1].cells, vec!["Depth: Low", "Depth: High"]);
        assert!((model.max_total() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scores_default_to_column_position() {
        let model = normalize_rubric(&json!({"columnCount": 4})).value;
        let scores: Vec<f64> = model.columns.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(model.rows.len(), 3);
    }

    #[test]
    fn test_single_column_clamped_up() {
        let normalized = normalize_rubric(&json!({"columnCount": 1}));
        assert_eq!(normalized.value.columns.len(), 2);
        assert_eq!(normalized.adjustments.len(), 1);
    }

    #[test]
    fn test_compile_emits_scored_radios() {
        let html = compile(&CompileContext::new(&default_data(), 0, "rb"));
        assert!(html.contains("data-cf-rubric-max=\"9\""));
        assert!(html.contains("name=\"cf-rb-r1\" value=\"3\" data-cf-score=\"3\""));
        assert!(html.contains("data-cf-rubric-total"));
    }

    #[test]
    fn test_count_mismatch_warns() {
        let data = json!({"title": "R", "rowCount": 2, "rows": [{"label": "a"}, {"label": "b"}, {"label": "c"}]});
        assert!(validate(&data)
            .iter()
            .any(|i| i.message == "rubric rowCount 2 does not match 3 authored rows"));
    }
}
