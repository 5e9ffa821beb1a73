//! Packing algorithms for simple (row/column) and canvas (x/y/w/h) modes.

use serde::{Deserialize, Serialize};

use super::{clamp_columns, LayoutMode};
use crate::{Activity, ActivityLayout};

/// Largest accepted canvas coordinate or extent, in grid cells.
const MAX_CANVAS_CELLS: i64 = 10_000;

/// Largest accepted simple-mode row.
const MAX_SIMPLE_ROW: i64 = 10_000;

/// Options for [`normalize_activities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Column count; clamped into `1..=4`.
    pub max_columns: u32,
    /// Placement mode.
    pub mode: LayoutMode,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_columns: super::DEFAULT_COLUMNS,
            mode: LayoutMode::Simple,
        }
    }
}

/// Options for [`move_activity_to_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    /// Column count; clamped into `1..=4`.
    pub max_columns: u32,
}

/// Result of [`move_activity_to_cell`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Repacked activities.
    pub activities: Vec<Activity>,
    /// Whether any layout differs from the input.
    pub changed: bool,
}

/// A canvas rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    /// Column offset (0-based).
    pub x: u32,
    /// Row offset (0-based).
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

/// Axis-aligned box overlap test. Touching edges do not overlap.
#[must_use]
pub fn rects_overlap(a: &GridRect, b: &GridRect) -> bool {
    !(a.x + a.w <= b.x || b.x + b.w <= a.x || a.y + a.h <= b.y || b.y + b.h <= a.y)
}

/// Resolved placement of a normalized activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Simple-mode cell window.
    Cell {
        /// Row (1-based).
        row: u32,
        /// Column (1-based).
        col: u32,
        /// Columns spanned.
        col_span: u32,
    },
    /// Canvas-mode rectangle.
    Rect(GridRect),
}

impl Placement {
    /// Read the placement of an activity already passed through
    /// [`normalize_activities`] with the same mode.
    #[must_use]
    pub fn of(activity: &Activity, mode: LayoutMode) -> Self {
        let layout = &activity.layout;
        match mode {
            LayoutMode::Simple => Self::Cell {
                row: to_u32(layout.row.unwrap_or(1).max(1)),
                col: to_u32(layout.col.unwrap_or(1).max(1)),
                col_span: to_u32(layout.col_span.unwrap_or(1).max(1)),
            },
            LayoutMode::Canvas => Self::Rect(GridRect {
                x: to_u32(layout.x.unwrap_or(0).max(0)),
                y: to_u32(layout.y.unwrap_or(0).max(0)),
                w: to_u32(layout.w.unwrap_or(1).max(1)),
                h: to_u32(layout.h.unwrap_or(1).max(1)),
            }),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Assign every activity a non-overlapping position.
///
/// Simple mode packs `(row, col, colSpan)` requests row-major from each
/// request's anchor; canvas mode probes each rectangle downward until it
/// clears every rectangle already placed. Both passes visit activities in
/// `(anchor, original index)` order, so equal anchors resolve in list order.
#[must_use]
pub fn normalize_activities(activities: &[Activity], options: NormalizeOptions) -> Vec<Activity> {
    let max_columns = clamp_columns(options.max_columns);
    match options.mode {
        LayoutMode::Simple => pack_simple(activities, max_columns, None),
        LayoutMode::Canvas => pack_canvas(activities, max_columns),
    }
}

/// Move one activity to `(row, col)` and repack everything else around it.
///
/// The moved activity becomes a fixed placement; the rest keep their
/// relative order. An out-of-range `from_index` is a no-op.
#[must_use]
pub fn move_activity_to_cell(
    activities: &[Activity],
    from_index: usize,
    row: i64,
    col: i64,
    options: MoveOptions,
) -> MoveOutcome {
    let Some(moving) = activities.get(from_index) else {
        tracing::debug!(from_index, len = activities.len(), "move ignored, index out of range");
        return MoveOutcome {
            activities: activities.to_vec(),
            changed: false,
        };
    };

    let max_columns = clamp_columns(options.max_columns);
    let span = clamp_span(moving.layout.col_span, max_columns);
    let pinned = CellRequest {
        index: from_index,
        row: clamp_row(Some(row)),
        col: clamp_col(Some(col), span, max_columns),
        span,
    };

    let packed = pack_simple(activities, max_columns, Some(pinned));
    let changed = packed
        .iter()
        .zip(activities)
        .any(|(after, before)| after.layout != before.layout);

    MoveOutcome {
        activities: packed,
        changed,
    }
}

#[derive(Debug, Clone, Copy)]
struct CellRequest {
    index: usize,
    row: u32,
    col: u32,
    span: u32,
}

fn clamp_span(col_span: Option<i64>, max_columns: u32) -> u32 {
    to_u32(col_span.unwrap_or(1).clamp(1, i64::from(max_columns)))
}

fn clamp_row(row: Option<i64>) -> u32 {
    to_u32(row.unwrap_or(1).clamp(1, MAX_SIMPLE_ROW))
}

fn clamp_col(col: Option<i64>, span: u32, max_columns: u32) -> u32 {
    let last_start = i64::from(max_columns - span + 1);
    to_u32(col.unwrap_or(1).clamp(1, last_start))
}

/// Row-major cell occupancy for the simple packer.
struct Occupancy {
    columns: u32,
    rows: Vec<Vec<bool>>,
}

impl Occupancy {
    fn new(columns: u32) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn is_free(&self, row: u32, col: u32, span: u32) -> bool {
        let Some(cells) = self.rows.get((row - 1) as usize) else {
            return true;
        };
        (col..col + span).all(|c| !cells[(c - 1) as usize])
    }

    fn occupy(&mut self, row: u32, col: u32, span: u32) {
        let row_index = (row - 1) as usize;
        if self.rows.len() <= row_index {
            self.rows
                .resize_with(row_index + 1, || vec![false; self.columns as usize]);
        }
        for c in col..col + span {
            self.rows[row_index][(c - 1) as usize] = true;
        }
    }

    /// First free window at or after `(row, col)` scanning row-major.
    fn first_free(&self, row: u32, col: u32, span: u32) -> (u32, u32) {
        let last_start = self.columns - span + 1;
        let mut r = row;
        loop {
            let start = if r == row { col } else { 1 };
            if let Some(c) = (start..=last_start).find(|&c| self.is_free(r, c, span)) {
                return (r, c);
            }
            r += 1;
        }
    }
}

fn pack_simple(
    activities: &[Activity],
    max_columns: u32,
    pinned: Option<CellRequest>,
) -> Vec<Activity> {
    let mut occupancy = Occupancy::new(max_columns);
    let mut assigned: Vec<Option<(u32, u32, u32)>> = vec![None; activities.len()];

    if let Some(fixed) = pinned {
        occupancy.occupy(fixed.row, fixed.col, fixed.span);
        assigned[fixed.index] = Some((fixed.row, fixed.col, fixed.span));
    }

    let mut pending: Vec<CellRequest> = activities
        .iter()
        .enumerate()
        .filter(|(index, _)| pinned.map_or(true, |p| p.index != *index))
        .map(|(index, activity)| {
            let layout = &activity.layout;
            let span = clamp_span(layout.col_span, max_columns);
            if layout.col_span.is_some_and(|s| s > i64::from(max_columns)) {
                tracing::debug!(
                    activity = %activity.id,
                    requested = layout.col_span,
                    max_columns,
                    "colSpan clamped to column count"
                );
            }
            CellRequest {
                index,
                row: clamp_row(layout.row),
                col: clamp_col(layout.col, span, max_columns),
                span,
            }
        })
        .collect();

    pending.sort_by_key(|req| (req.row, req.col, req.index));

    for req in pending {
        let (row, col) = occupancy.first_free(req.row, req.col, req.span);
        if (row, col) != (req.row, req.col) {
            tracing::trace!(
                index = req.index,
                from = ?(req.row, req.col),
                to = ?(row, col),
                "activity displaced from anchor"
            );
        }
        occupancy.occupy(row, col, req.span);
        assigned[req.index] = Some((row, col, req.span));
    }

    activities
        .iter()
        .zip(assigned)
        .map(|(activity, slot)| {
            let mut placed = activity.clone();
            if let Some((row, col, span)) = slot {
                placed.layout = ActivityLayout {
                    col_span: Some(i64::from(span)),
                    row: Some(i64::from(row)),
                    col: Some(i64::from(col)),
                    ..activity.layout
                };
            }
            placed
        })
        .collect()
}

fn pack_canvas(activities: &[Activity], max_columns: u32) -> Vec<Activity> {
    let columns = i64::from(max_columns);
    let mut requests: Vec<(usize, GridRect)> = activities
        .iter()
        .enumerate()
        .map(|(index, activity)| {
            let layout = &activity.layout;
            let w = layout.w.or(layout.col_span).unwrap_or(1).clamp(1, columns);
            let h = layout.h.unwrap_or(1).clamp(1, MAX_CANVAS_CELLS);
            let x = layout.x.unwrap_or(0).clamp(0, columns - w);
            let y = layout.y.unwrap_or(0).clamp(0, MAX_CANVAS_CELLS);
            (
                index,
                GridRect {
                    x: to_u32(x),
                    y: to_u32(y),
                    w: to_u32(w),
                    h: to_u32(h),
                },
            )
        })
        .collect();

    requests.sort_by_key(|(index, rect)| (rect.y, rect.x, *index));

    let mut placed: Vec<GridRect> = Vec::with_capacity(requests.len());
    let mut assigned: Vec<Option<GridRect>> = vec![None; activities.len()];

    for (index, mut rect) in requests {
        // Only downward probing: x never shifts, so author gaps survive.
        loop {
            let blocking_bottom = placed
                .iter()
                .filter(|other| rects_overlap(&rect, other))
                .map(|other| other.y + other.h)
                .max();
            match blocking_bottom {
                Some(bottom) => rect.y = bottom,
                None => break,
            }
        }
        placed.push(rect);
        assigned[index] = Some(rect);
    }

    activities
        .iter()
        .zip(assigned)
        .map(|(activity, slot)| {
            let mut moved = activity.clone();
            if let Some(rect) = slot {
                let col_span = activity
                    .layout
                    .col_span
                    .unwrap_or_else(|| i64::from(rect.w))
                    .clamp(1, columns);
                moved.layout = ActivityLayout {
                    col_span: Some(col_span),
                    x: Some(i64::from(rect.x)),
                    y: Some(i64::from(rect.y)),
                    w: Some(i64::from(rect.w)),
                    h: Some(i64::from(rect.h)),
                    ..activity.layout
                };
            }
            moved
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn at(id: &str, layout: ActivityLayout) -> Activity {
        Activity::new("content_block", Value::Null)
            .with_id(id)
            .with_layout(layout)
    }

    fn cell_of(activity: &Activity) -> (i64, i64, i64) {
        (
            activity.layout.row.expect("row"),
            activity.layout.col.expect("col"),
            activity.layout.col_span.expect("span"),
        )
    }

    fn simple(max_columns: u32) -> NormalizeOptions {
        NormalizeOptions {
            max_columns,
            mode: LayoutMode::Simple,
        }
    }

    fn canvas(max_columns: u32) -> NormalizeOptions {
        NormalizeOptions {
            max_columns,
            mode: LayoutMode::Canvas,
        }
    }

    #[test]
    fn test_same_anchor_fills_left_to_right_then_down() {
        let activities = vec![
            at("a", ActivityLayout::cell(1, 1, 1)),
            at("b", ActivityLayout::cell(1, 1, 1)),
            at("c", ActivityLayout::cell(1, 1, 1)),
        ];
        let packed = normalize_activities(&activities, simple(2));
        assert_eq!(cell_of(&packed[0]), (1, 1, 1));
        assert_eq!(cell_of(&packed[1]), (1, 2, 1));
        assert_eq!(cell_of(&packed[2]), (2, 1, 1));
    }

    #[test]
    fn test_empty_list_packs_to_empty() {
        assert!(normalize_activities(&[], simple(3)).is_empty());
        assert!(normalize_activities(&[], canvas(3)).is_empty());
    }

    #[test]
    fn test_col_span_clamped_to_columns() {
        let packed = normalize_activities(&[at("wide", ActivityLayout::cell(1, 1, 7))], simple(3));
        assert_eq!(cell_of(&packed[0]), (1, 1, 3));
    }

    #[test]
    fn test_missing_layout_flows_in_list_order() {
        let activities = vec![
            at("a", ActivityLayout::default()),
            at("b", ActivityLayout::default()),
            at("c", ActivityLayout::default()),
        ];
        let packed = normalize_activities(&activities, simple(3));
        let cells: Vec<_> = packed.iter().map(cell_of).collect();
        assert_eq!(cells, vec![(1, 1, 1), (1, 2, 1), (1, 3, 1)]);
    }

    #[test]
    fn test_invalid_anchor_clamped_to_one_based() {
        let packed = normalize_activities(&[at("neg", ActivityLayout::cell(-2, 0, 1))], simple(2));
        assert_eq!(cell_of(&packed[0]), (1, 1, 1));
    }

    #[test]
    fn test_wide_request_skips_partial_row() {
        let activities = vec![
            at("a", ActivityLayout::cell(1, 1, 1)),
            at("wide", ActivityLayout::cell(1, 2, 2)),
        ];
        let packed = normalize_activities(&activities, simple(2));
        assert_eq!(cell_of(&packed[0]), (1, 1, 1));
        assert_eq!(cell_of(&packed[1]), (2, 1, 2));
    }

    #[test]
    fn test_later_anchor_does_not_jump_ahead() {
        let activities = vec![
            at("late", ActivityLayout::cell(3, 1, 1)),
            at("early", ActivityLayout::cell(1, 1, 1)),
        ];
        let packed = normalize_activities(&activities, simple(2));
        assert_eq!(cell_of(&packed[0]), (3, 1, 1));
        assert_eq!(cell_of(&packed[1]), (1, 1, 1));
    }

    #[test]
    fn test_simple_leaves_canvas_fields_untouched() {
        let mut activity = at("a", ActivityLayout::cell(1, 1, 1));
        activity.layout.x = Some(2);
        let packed = normalize_activities(&[activity], simple(2));
        assert_eq!(packed[0].layout.x, Some(2));
    }

    #[test]
    fn test_canvas_collision_probes_downward_only() {
        let activities = vec![
            at("top", ActivityLayout::rect(0, 0, 2, 2)),
            at("clash", ActivityLayout::rect(1, 1, 2, 1)),
        ];
        let packed = normalize_activities(&activities, canvas(4));
        assert_eq!(packed[1].layout.x, Some(1));
        assert_eq!(packed[1].layout.y, Some(2));
    }

    #[test]
    fn test_canvas_preserves_horizontal_gap() {
        let activities = vec![
            at("left", ActivityLayout::rect(0, 0, 1, 1)),
            at("right", ActivityLayout::rect(3, 0, 1, 1)),
        ];
        let packed = normalize_activities(&activities, canvas(4));
        assert_eq!(packed[0].layout.x, Some(0));
        assert_eq!(packed[1].layout.x, Some(3));
        assert_eq!(packed[1].layout.y, Some(0));
    }

    #[test]
    fn test_canvas_clamps_width_and_x() {
        let packed = normalize_activities(&[at("a", ActivityLayout::rect(5, -1, 9, 0))], canvas(3));
        let layout = packed[0].layout;
        assert_eq!((layout.x, layout.y, layout.w, layout.h), (Some(0), Some(0), Some(3), Some(1)));
    }

    #[test]
    fn test_canvas_width_defaults_to_col_span() {
        let activity = at(
            "a",
            ActivityLayout {
                col_span: Some(2),
                ..ActivityLayout::default()
            },
        );
        let packed = normalize_activities(&[activity], canvas(4));
        assert_eq!(packed[0].layout.w, Some(2));
    }

    #[test]
    fn test_rects_overlap_edges() {
        let a = GridRect { x: 0, y: 0, w: 2, h: 2 };
        let touching = GridRect { x: 2, y: 0, w: 1, h: 1 };
        let inside = GridRect { x: 1, y: 1, w: 1, h: 1 };
        assert!(!rects_overlap(&a, &touching));
        assert!(rects_overlap(&a, &inside));
    }

    #[test]
    fn test_move_to_current_cell_is_unchanged() {
        let packed = normalize_activities(
            &[
                at("a", ActivityLayout::cell(1, 1, 1)),
                at("b", ActivityLayout::cell(1, 2, 1)),
            ],
            simple(2),
        );
        let outcome = move_activity_to_cell(&packed, 1, 1, 2, MoveOptions { max_columns: 2 });
        assert!(!outcome.changed);
        assert_eq!(outcome.activities, packed);
    }

    #[test]
    fn test_move_displaces_occupant() {
        let packed = normalize_activities(
            &[
                at("a", ActivityLayout::cell(1, 1, 1)),
                at("b", ActivityLayout::cell(1, 2, 1)),
            ],
            simple(2),
        );
        let outcome = move_activity_to_cell(&packed, 1, 1, 1, MoveOptions { max_columns: 2 });
        assert!(outcome.changed);
        assert_eq!(cell_of(&outcome.activities[1]), (1, 1, 1));
        assert_eq!(cell_of(&outcome.activities[0]), (1, 2, 1));
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let activities = vec![at("a", ActivityLayout::cell(1, 1, 1))];
        let outcome = move_activity_to_cell(&activities, 4, 2, 2, MoveOptions { max_columns: 2 });
        assert!(!outcome.changed);
        assert_eq!(outcome.activities, activities);
    }

    #[test]
    fn test_move_clamps_target_column_for_span() {
        let activities = vec![at("wide", ActivityLayout::cell(1, 1, 2))];
        let outcome = move_activity_to_cell(&activities, 0, 3, 4, MoveOptions { max_columns: 3 });
        assert_eq!(cell_of(&outcome.activities[0]), (3, 2, 2));
    }

    #[test]
    fn test_placement_reads_normalized_layout() {
        let packed = normalize_activities(&[at("a", ActivityLayout::rect(1, 2, 2, 3))], canvas(4));
        assert_eq!(
            Placement::of(&packed[0], LayoutMode::Canvas),
            Placement::Rect(GridRect { x: 1, y: 2, w: 2, h: 3 })
        );
    }
}
