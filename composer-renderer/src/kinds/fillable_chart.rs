//! `fillable_chart`: a table mixing author-fixed and student-fillable cells.

use std::fmt::Write;

use serde_json::{json, Value};

use super::{clamp_count, nth_text, title_issue};
use crate::data;
use crate::html::escape;
use crate::registry::{CompileContext, Issue, Normalized};

/// Inclusive bounds for chart rows and columns.
pub const CHART_BOUNDS: (usize, usize) = (1, 8);

/// Placeholder used when an editable cell has none.
pub const DEFAULT_PLACEHOLDER: &str = "Type here";

/// One chart cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartCell {
    /// Student-fillable.
    Editable {
        /// Input placeholder.
        placeholder: String,
    },
    /// Author-authored text.
    Fixed {
        /// Cell text.
        text: String,
    },
}

/// Canonical chart grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartModel {
    /// Column headers, one per column.
    pub column_headers: Vec<String>,
    /// Row headers, one per row; all empty means no header column.
    pub row_headers: Vec<String>,
    /// Cells by row, then column.
    pub cells: Vec<Vec<ChartCell>>,
}

impl ChartModel {
    /// Whether a row header column is shown.
    #[must_use]
    pub fn has_row_headers(&self) -> bool {
        self.row_headers.iter().any(|h| !h.is_empty())
    }
}

/// Default chart data.
#[must_use]
pub fn default_data() -> Value {
    json!({
        "title": "Fill in the chart",
        "rowCount": 3,
        "columnCount": 2,
        "columnHeaders": ["Item", "Notes"],
        "rowHeaders": [],
        "cells": []
    })
}

fn read_cell(raw: Option<&Value>, row: usize, col: usize, adjustments: &mut Vec<String>) -> ChartCell {
    match raw {
        Some(Value::String(text)) => ChartCell::Fixed {
            text: text.trim().to_string(),
        },
        Some(cell @ Value::Object(_)) => match data::text(cell, "mode").as_str() {
            "fixed" => ChartCell::Fixed {
                text: data::text(cell, "text"),
            },
            mode => {
                if !mode.is_empty() && mode != "editable" {
                    adjustments.push(format!(
                        "cell {}x{}: unknown mode \"{mode}\" read as editable",
                        row + 1,
                        col + 1
                    ));
                }
                ChartCell::Editable {
                    placeholder: data::text_or(cell, "placeholder", DEFAULT_PLACEHOLDER),
                }
            }
        },
        _ => ChartCell::Editable {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        },
    }
}

/// Normalize chart data: clamp counts, pad headers and default missing
/// cells to editable.
#[must_use]
pub fn normalize_chart(data: &Value) -> Normalized<ChartModel> {
    let mut adjustments = Vec::new();
    let raw_columns = data::array(data, "columnHeaders");
    let raw_rows = data::array(data, "rowHeaders");
    let raw_cells = data::array(data, "cells");

    let authored_rows = raw_rows.len().max(raw_cells.len());
    let row_count = clamp_count(
        data::int(data, "rowCount"),
        authored_rows,
        3,
        CHART_BOUNDS,
        ("chart", "rows"),
        &mut adjustments,
    );
    let column_count = clamp_count(
        data::int(data, "columnCount"),
        raw_columns.len(),
        2,
        CHART_BOUNDS,
        ("chart", "columns"),
        &mut adjustments,
    );

    let column_headers: Vec<String> = (0..column_count)
        .map(|c| {
            let header = nth_text(raw_columns, c);
            if header.is_empty() {
                format!("Column {}", c + 1)
            } else {
                header
            }
        })
        .collect();
    let row_headers = (0..row_count).map(|r| nth_text(raw_rows, r)).collect();
    let cells: Vec<Vec<ChartCell>> = (0..row_count)
        .map(|r| {
            let row = raw_cells.get(r).and_then(Value::as_array);
            (0..column_count)
                .map(|c| read_cell(row.and_then(|cells| cells.get(c)), r, c, &mut adjustments))
                .collect()
        })
        .collect();

    Normalized {
        value: ChartModel {
            column_headers,
            row_headers,
            cells,
        },
        adjustments,
    }
}

/// Compile a fillable chart.
#[must_use]
pub fn compile(ctx: &CompileContext<'_>) -> String {
    let model = normalize_chart(ctx.data).value;
    let row_headers = model.has_row_headers();
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str("<div class=\"cf-chart cf-table-wrap\"><table class=\"cf-table\"><thead><tr>");
    if row_headers {
        out.push_str("<td></td>");
    }
    for header in &model.column_headers {
        let _ = write!(out, "<th scope=\"col\">{}</th>", escape(header));
    }
    out.push_str("</tr></thead><tbody>");
    for (r, row) in model.cells.iter().enumerate() {
        out.push_str("<tr>");
        let row_name = model.row_headers.get(r).cloned().unwrap_or_default();
        if row_headers {
            let _ = write!(out, "<th scope=\"row\">{}</th>", escape(&row_name));
        }
        let row_label = if row_name.is_empty() {
            format!("Row {}", r + 1)
        } else {
            row_name
        };
        for (cell, header) in row.iter().zip(&model.column_headers) {
            match cell {
                ChartCell::Fixed { text } => {
                    let _ = write!(out, "<td class=\"cf-chart__fixed\">{}</td>", escape(text));
                }
                ChartCell::Editable { placeholder } => {
                    let label = format!("{row_label} / {header}");
                    let _ = write!(
                        out,
                        "<td><textarea rows=\"2\" class=\"cf-chart__input\" placeholder=\"{}\" aria-label=\"{}\" data-cf-label=\"{}\"></textarea></td>",
                        escape(placeholder),
                        escape(&label),
                        escape(&label)
                    );
                }
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}

/// Validate a fillable chart.
#[must_use]
pub fn validate(data: &Value) -> Vec<Issue> {
    let normalized = normalize_chart(data);
    let mut issues: Vec<Issue> = title_issue(data, "fillable chart").into_iter().collect();
    let editable = normalized
        .value
        .cells
        .iter()
        .flatten()
        .filter(|cell| matches!(cell, ChartCell::Editable { .. }))
        .count();
    if editable == 0 {
        issues.push(Issue::warn("fillable chart has no editable cells"));
    }
    let authored_headers = data::array(data, "columnHeaders").len();
    if authored_headers > 0 && authored_headers != normalized.value.column_headers.len() {
        issues.push(Issue::warn(format!(
            "fillable chart has {authored_headers} column headers for {} columns",
            normalized.value.column_headers.len()
        )));
    }
    issues.extend(normalized.warnings());
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_clamped_to_chart_bounds() {
        let normalized = normalize_chart(&json!({"rowCount": 12, "columnCount": 0}));
        assert_eq!(normalized.value.cells.len(), 8);
        assert_eq!(normalized.value.column_headers.len(), 1);
        assert_eq!(
            normalized.adjustments,
            vec![
                "chart clamped to 8 rows (requested 12)".to_string(),
                "chart clamped to 1 columns (requested 0)".to_string()
            ]
        );
    }

    #[test]
    fn test_cells_fixed_or_editable() {
        let data = json!({
            "rowCount": 1,
            "columnCount": 3,
            "cells": [["Rent", {"mode": "editable", "placeholder": "$"}, {"mode": "fixed", "text": "Monthly"}]]
        });
        let model = normalize_chart(&data).value;
        assert_eq!(
            model.cells[0],
            vec![
                ChartCell::Fixed { text: "Rent".into() },
                ChartCell::Editable { placeholder: "$".into() },
                ChartCell::Fixed { text: "Monthly".into() },
            ]
        );
    }

    #[test]
    fn test_missing_cells_default_to_placeholder() {
        let model = normalize_chart(&json!({"rowCount": 2, "columnCount": 2})).value;
        assert!(model.cells.iter().flatten().all(|cell| {
            *cell
                == ChartCell::Editable {
                    placeholder: DEFAULT_PLACEHOLDER.into(),
                }
        }));
        assert!(!model.has_row_headers());
    }

    #[test]
    fn test_compile_labels_inputs_by_row_and_column() {
        let data = json!({"title": "Plan", "rowCount": 1, "columnCount": 1, "columnHeaders": ["Goal"], "rowHeaders": ["Week 1"]});
        let html = compile(&CompileContext::new(&data, 0, "ch"));
        assert!(html.contains("<th scope=\"row\">Week 1</th>"));
        assert!(html.contains("data-cf-label=\"Week 1 / Goal\""));
    }

    #[test]
    fn test_all_fixed_chart_warns() {
        let data = json!({"title": "T", "rowCount": 1, "columnCount": 1, "columnHeaders": ["A"], "cells": [["x"]]});
        assert_eq!(
            validate(&data),
            vec![Issue::warn("fillable chart has no editable cells")]
        );
    }
}
