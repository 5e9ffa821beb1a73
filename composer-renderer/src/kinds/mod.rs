//! Per-kind data normalization, HTML compilation and validation.
//!
//! Each submodule owns one kind or a small family of related kinds and is
//! dispatched from [`crate::registry::ActivityKind`].

pub mod assessment;
pub mod containers;
pub mod content;
pub mod decision_lab;
pub mod fillable_chart;
pub mod interactive;
pub mod rubric;
pub mod utility;
pub mod worksheet;

use crate::data;
use crate::registry::Issue;
use serde_json::Value;

/// Warn when an activity that normally shows a title has none.
pub(crate) fn title_issue(data: &Value, kind_label: &str) -> Option<Issue> {
    data::text(data, "title")
        .is_empty()
        .then(|| Issue::warn(format!("{kind_label} has no title")))
}

/// Resolve a row or column count against inclusive bounds.
///
/// An explicit count wins over the authored list length; a missing count
/// falls back to the list length, then to `default`. Clamping records an
/// adjustment such as `"rubric clamped to 5 rows (requested 6)"`.
pub(crate) fn clamp_count(
    requested: Option<i64>,
    authored: usize,
    default: usize,
    bounds: (usize, usize),
    (what, unit): (&str, &str),
    adjustments: &mut Vec<String>,
) -> usize {
    let wanted = requested.unwrap_or_else(|| {
        if authored == 0 {
            i64::try_from(default).unwrap_or(0)
        } else {
            i64::try_from(authored).unwrap_or(i64::MAX)
        }
    });
    let (low, high) = (
        i64::try_from(bounds.0).unwrap_or(0),
        i64::try_from(bounds.1).unwrap_or(i64::MAX),
    );
    let clamped = wanted.clamp(low, high);
    if clamped != wanted {
        adjustments.push(format!(
            "{what} clamped to {clamped} {unit} (requested {wanted})"
        ));
    }
    usize::try_from(clamped).unwrap_or(bounds.0)
}

/// Text of the `index`-th entry of a list field, or empty.
pub(crate) fn nth_text(items: &[Value], index: usize) -> String {
    items.get(index).map(data::item_text).unwrap_or_default()
}
