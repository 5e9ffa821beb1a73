//! Layout engine property tests
//!
//! Checks the packing invariants over arbitrary activity lists:
//! - No two placed activities overlap (simple cells, canvas boxes)
//! - Packing is idempotent
//! - Equal anchors resolve in list order
//! - Moving an activity onto its own cell changes nothing

use std::collections::HashSet;

use composer_core::{
    move_activity_to_cell, normalize_activities, rects_overlap, Activity, ActivityLayout,
    LayoutMode, MoveOptions, NormalizeOptions, Placement,
};
use proptest::prelude::*;
use serde_json::Value;

fn activity(index: usize, layout: ActivityLayout) -> Activity {
    Activity::new("content_block", Value::Null)
        .with_id(format!("act-{index}"))
        .with_layout(layout)
}

fn arb_layout() -> impl Strategy<Value = ActivityLayout> {
    (
        proptest::option::of(-2i64..7),
        proptest::option::of(-2i64..9),
        proptest::option::of(-2i64..6),
        proptest::option::of(-2i64..6),
        proptest::option::of(-2i64..9),
        proptest::option::of(-1i64..6),
        proptest::option::of(-1i64..4),
    )
        .prop_map(|(col_span, row, col, x, y, w, h)| ActivityLayout {
            col_span,
            row,
            col,
            x,
            y,
            w,
            h,
        })
}

fn arb_activities() -> impl Strategy<Value = Vec<Activity>> {
    prop::collection::vec(arb_layout(), 0..14).prop_map(|layouts| {
        layouts
            .into_iter()
            .enumerate()
            .map(|(i, layout)| activity(i, layout))
            .collect()
    })
}

fn simple_cells(activities: &[Activity]) -> Vec<(u32, u32)> {
    activities
        .iter()
        .flat_map(|a| match Placement::of(a, LayoutMode::Simple) {
            Placement::Cell { row, col, col_span } => {
                (col..col + col_span).map(|c| (row, c)).collect::<Vec<_>>()
            }
            Placement::Rect(_) => Vec::new(),
        })
        .collect()
}

// ==========================================================================
// Concrete scenarios
// ==========================================================================

#[test]
fn test_three_single_span_activities_in_two_columns() {
    let activities: Vec<_> = (0..3)
        .map(|i| activity(i, ActivityLayout::cell(1, 1, 1)))
        .collect();
    let packed = normalize_activities(
        &activities,
        NormalizeOptions {
            max_columns: 2,
            mode: LayoutMode::Simple,
        },
    );
    let cells: Vec<_> = packed
        .iter()
        .map(|a| (a.layout.row, a.layout.col))
        .collect();
    assert_eq!(
        cells,
        vec![(Some(1), Some(1)), (Some(1), Some(2)), (Some(2), Some(1))]
    );
}

#[test]
fn test_zero_activities_is_not_an_error() {
    let packed = normalize_activities(&[], NormalizeOptions::default());
    assert!(packed.is_empty());
}

// ==========================================================================
// Properties
// ==========================================================================

proptest! {
    #[test]
    fn prop_simple_mode_never_overlaps(
        activities in arb_activities(),
        max_columns in 0u32..6
    ) {
        let packed = normalize_activities(
            &activities,
            NormalizeOptions { max_columns, mode: LayoutMode::Simple },
        );
        let cells = simple_cells(&packed);
        let unique: HashSet<_> = cells.iter().copied().collect();
        prop_assert_eq!(unique.len(), cells.len(), "overlapping cells: {:?}", cells);

        let columns = max_columns.clamp(1, 4);
        for a in &packed {
            let span = a.layout.col_span.unwrap_or_default();
            let col = a.layout.col.unwrap_or_default();
            prop_assert!(span >= 1 && span <= i64::from(columns));
            prop_assert!(a.layout.row.unwrap_or_default() >= 1);
            prop_assert!(col >= 1 && col + span - 1 <= i64::from(columns));
        }
    }

    #[test]
    fn prop_canvas_mode_never_overlaps(
        activities in arb_activities(),
        max_columns in 1u32..5
    ) {
        let packed = normalize_activities(
            &activities,
            NormalizeOptions { max_columns, mode: LayoutMode::Canvas },
        );
        let rects: Vec<_> = packed
            .iter()
            .filter_map(|a| match Placement::of(a, LayoutMode::Canvas) {
                Placement::Rect(rect) => Some(rect),
                Placement::Cell { .. } => None,
            })
            .collect();
        for (i, a) in rects.iter().enumerate() {
            prop_assert!(a.x + a.w <= max_columns);
            for b in &rects[i + 1..] {
                prop_assert!(!rects_overlap(a, b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn prop_canvas_never_shifts_sideways(activities in arb_activities()) {
        let options = NormalizeOptions { max_columns: 4, mode: LayoutMode::Canvas };
        let packed = normalize_activities(&activities, options);
        for (input, placed) in activities.iter().zip(&packed) {
            let w = input.layout.w.or(input.layout.col_span).unwrap_or(1).clamp(1, 4);
            let x = input.layout.x.unwrap_or(0).clamp(0, 4 - w);
            prop_assert_eq!(placed.layout.x, Some(x));
            prop_assert!(placed.layout.y >= Some(input.layout.y.unwrap_or(0).max(0)));
        }
    }

    #[test]
    fn prop_packing_is_idempotent(
        activities in arb_activities(),
        max_columns in 1u32..5,
        canvas in any::<bool>()
    ) {
        let mode = if canvas { LayoutMode::Canvas } else { LayoutMode::Simple };
        let options = NormalizeOptions { max_columns, mode };
        let once = normalize_activities(&activities, options);
        let twice = normalize_activities(&once, options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_equal_anchors_keep_list_order(count in 1usize..10, max_columns in 1u32..5) {
        let activities: Vec<_> = (0..count)
            .map(|i| activity(i, ActivityLayout::cell(1, 1, 1)))
            .collect();
        let packed = normalize_activities(
            &activities,
            NormalizeOptions { max_columns, mode: LayoutMode::Simple },
        );
        let positions: Vec<_> = packed
            .iter()
            .map(|a| (a.layout.row.unwrap_or_default(), a.layout.col.unwrap_or_default()))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }

    #[test]
    fn prop_move_to_current_cell_is_unchanged(
        activities in arb_activities(),
        max_columns in 1u32..5,
        pick in any::<prop::sample::Index>()
    ) {
        prop_assume!(!activities.is_empty());
        let packed = normalize_activities(
            &activities,
            NormalizeOptions { max_columns, mode: LayoutMode::Simple },
        );
        let index = pick.index(packed.len());
        let row = packed[index].layout.row.unwrap_or(1);
        let col = packed[index].layout.col.unwrap_or(1);

        let outcome = move_activity_to_cell(&packed, index, row, col, MoveOptions { max_columns });
        prop_assert!(!outcome.changed);
        prop_assert_eq!(outcome.activities, packed);
    }
}
