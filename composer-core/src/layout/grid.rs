//! Read-only grid view for editors rendering drop targets.

use serde::{Deserialize, Serialize};

use super::{clamp_columns, normalize_activities, LayoutMode, NormalizeOptions, Placement};
use crate::{Activity, ActivityId};

/// Options for [`build_grid_model`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridModelOptions {
    /// Minimum number of rows to report, even when fewer are occupied.
    pub min_rows: u32,
    /// Extra empty rows appended after the last row.
    pub trailing_rows: u32,
}

/// An activity's cell window in the grid model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPlacement {
    /// Index in the activity list.
    pub index: usize,
    /// Activity id.
    pub id: ActivityId,
    /// Row (1-based).
    pub row: u32,
    /// Column (1-based).
    pub col: u32,
    /// Columns spanned.
    pub col_span: u32,
}

/// An unoccupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Row (1-based).
    pub row: u32,
    /// Column (1-based).
    pub col: u32,
}

/// Derived simple-mode grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridModel {
    /// Number of rows shown.
    pub row_count: u32,
    /// Occupied windows, in activity-list order.
    pub placements: Vec<GridPlacement>,
    /// Free cells, row-major.
    pub empty_slots: Vec<GridCell>,
}

/// Build the simple-mode grid model for an activity list.
#[must_use]
pub fn build_grid_model(
    activities: &[Activity],
    max_columns: u32,
    options: GridModelOptions,
) -> GridModel {
    let columns = clamp_columns(max_columns);
    let packed = normalize_activities(
        activities,
        NormalizeOptions {
            max_columns: columns,
            mode: LayoutMode::Simple,
        },
    );

    let placements: Vec<GridPlacement> = packed
        .iter()
        .enumerate()
        .filter_map(|(index, activity)| match Placement::of(activity, LayoutMode::Simple) {
            Placement::Cell { row, col, col_span } => Some(GridPlacement {
                index,
                id: activity.id.clone(),
                row,
                col,
                col_span,
            }),
            Placement::Rect(_) => None,
        })
        .collect();

    let last_row = placements.iter().map(|p| p.row).max().unwrap_or(0);
    let row_count = last_row.max(options.min_rows) + options.trailing_rows;

    let occupied = |row: u32, col: u32| {
        placements
            .iter()
            .any(|p| p.row == row && col >= p.col && col < p.col + p.col_span)
    };
    let empty_slots = (1..=row_count)
        .flat_map(|row| (1..=columns).map(move |col| GridCell { row, col }))
        .filter(|cell| !occupied(cell.row, cell.col))
        .collect();

    GridModel {
        row_count,
        placements,
        empty_slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityLayout;
    use serde_json::Value;

    fn at(id: &str, layout: ActivityLayout) -> Activity {
        Activity::new("checklist", Value::Null)
            .with_id(id)
            .with_layout(layout)
    }

    #[test]
    fn test_grid_model_lists_empty_slots() {
        let activities = vec![
            at("a", ActivityLayout::cell(1, 1, 1)),
            at("b", ActivityLayout::cell(2, 2, 1)),
        ];
        let model = build_grid_model(&activities, 2, GridModelOptions::default());
        assert_eq!(model.row_count, 2);
        assert_eq!(
            model.empty_slots,
            vec![GridCell { row: 1, col: 2 }, GridCell { row: 2, col: 1 }]
        );
        assert_eq!(model.placements[1].id.as_str(), "b");
    }

    #[test]
    fn test_grid_model_trailing_and_min_rows() {
        let model = build_grid_model(
            &[],
            3,
            GridModelOptions {
                min_rows: 2,
                trailing_rows: 1,
            },
        );
        assert_eq!(model.row_count, 3);
        assert_eq!(model.empty_slots.len(), 9);
        assert!(model.placements.is_empty());
    }

    #[test]
    fn test_grid_model_span_covers_cells() {
        let model = build_grid_model(
            &[at("wide", ActivityLayout::cell(1, 1, 2))],
            2,
            GridModelOptions::default(),
        );
        assert!(model.empty_slots.is_empty());
        assert_eq!(model.placements[0].col_span, 2);
    }
}
