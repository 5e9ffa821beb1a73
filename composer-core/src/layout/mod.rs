//! Layout engine: module-level layout configuration and activity packing.
//!
//! Two placement modes are supported:
//!
//! ```text
//! simple                         canvas
//! ┌──────┬──────┐               ┌──────┐  ┌──────┐
//! │ r1c1 │ r1c2 │  row/col      │ x0y0 │  │ x3y0 │  x/y/w/h
//! ├──────┴──────┤  1-based      └──────┘  └──────┘  0-based
//! │ r2c1 span 2 │               ┌───────────┐
//! └─────────────┘               │ x1y2 w3h2 │
//!                               └───────────┘
//! ```
//!
//! Every function here is pure: inputs are borrowed, outputs are fresh values.

mod grid;
mod packing;

use serde::{Deserialize, Serialize};

pub use grid::{build_grid_model, GridCell, GridModel, GridModelOptions, GridPlacement};
pub use packing::{
    move_activity_to_cell, normalize_activities, rects_overlap, GridRect, MoveOptions,
    MoveOutcome, NormalizeOptions, Placement,
};

/// Minimum grid column count.
pub const MIN_COLUMNS: u32 = 1;
/// Maximum grid column count.
pub const MAX_COLUMNS: u32 = 4;
/// Default grid column count.
pub const DEFAULT_COLUMNS: u32 = 2;
/// Row height bounds (px) for canvas mode.
pub const ROW_HEIGHT_RANGE: (u32, u32) = (40, 480);
/// Default row height (px).
pub const DEFAULT_ROW_HEIGHT: u32 = 96;
/// Upper bound for margins and container padding (px).
pub const MAX_SPACING: u32 = 64;

/// How activity `layout` fields are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Row/column grid, 1-based, packed left-to-right top-to-bottom.
    #[default]
    Simple,
    /// Absolute `x/y/w/h` grid, 0-based, collisions resolved downward.
    Canvas,
}

impl LayoutMode {
    /// Parse a wire name; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "simple" => Some(Self::Simple),
            "canvas" => Some(Self::Canvas),
            _ => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Canvas => "canvas",
        }
    }
}

/// Composer layout as authored, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComposerLayout {
    /// Layout mode name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Column count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_columns: Option<i64>,
    /// Canvas row height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_height: Option<f64>,
    /// Gap between activities `[x, y]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Vec<f64>>,
    /// Padding around the grid `[x, y]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_padding: Option<Vec<f64>>,
    /// Stretch simple-mode activities to the tallest item in their row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_match_tallest_row: Option<bool>,
}

/// Normalized composer layout with every value inside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerLayout {
    /// Placement mode.
    pub mode: LayoutMode,
    /// Column count (1..=4).
    pub max_columns: u32,
    /// Canvas row height in pixels.
    pub row_height: u32,
    /// Gap between activities `[x, y]` in pixels.
    pub margin: [u32; 2],
    /// Padding around the grid `[x, y]` in pixels.
    pub container_padding: [u32; 2],
    /// Stretch simple-mode activities to the tallest item in their row.
    pub simple_match_tallest_row: bool,
}

impl Default for ComposerLayout {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Simple,
            max_columns: DEFAULT_COLUMNS,
            row_height: DEFAULT_ROW_HEIGHT,
            margin: [16, 16],
            container_padding: [0, 0],
            simple_match_tallest_row: true,
        }
    }
}

impl ComposerLayout {
    /// Clamp a raw layout into sane bounds.
    #[must_use]
    pub fn normalize(raw: &RawComposerLayout) -> Self {
        let defaults = Self::default();
        let mode = raw
            .mode
            .as_deref()
            .and_then(LayoutMode::parse)
            .unwrap_or(defaults.mode);
        let max_columns = raw
            .max_columns
            .map_or(defaults.max_columns, clamp_columns_i64);
        let row_height = raw.row_height.map_or(defaults.row_height, |h| {
            clamp_px(h, ROW_HEIGHT_RANGE.0, ROW_HEIGHT_RANGE.1, defaults.row_height)
        });

        Self {
            mode,
            max_columns,
            row_height,
            margin: clamp_pair(raw.margin.as_deref(), defaults.margin),
            container_padding: clamp_pair(
                raw.container_padding.as_deref(),
                defaults.container_padding,
            ),
            simple_match_tallest_row: raw
                .simple_match_tallest_row
                .unwrap_or(defaults.simple_match_tallest_row),
        }
    }

    /// Options for [`normalize_activities`] matching this layout.
    #[must_use]
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            max_columns: self.max_columns,
            mode: self.mode,
        }
    }
}

/// Clamp a raw layout into sane bounds.
#[must_use]
pub fn normalize_layout(raw: &RawComposerLayout) -> ComposerLayout {
    ComposerLayout::normalize(raw)
}

/// Clamp a column count into `MIN_COLUMNS..=MAX_COLUMNS`.
#[must_use]
pub fn clamp_columns(columns: u32) -> u32 {
    columns.clamp(MIN_COLUMNS, MAX_COLUMNS)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_columns_i64(columns: i64) -> u32 {
    columns.clamp(i64::from(MIN_COLUMNS), i64::from(MAX_COLUMNS)) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_px(value: f64, min: u32, max: u32, fallback: u32) -> u32 {
    if !value.is_finite() {
        return fallback;
    }
    value.round().clamp(f64::from(min), f64::from(max)) as u32
}

fn clamp_pair(raw: Option<&[f64]>, fallback: [u32; 2]) -> [u32; 2] {
    let Some(values) = raw else {
        return fallback;
    };
    let x = values
        .first()
        .map_or(fallback[0], |v| clamp_px(*v, 0, MAX_SPACING, fallback[0]));
    // A single value applies to both axes.
    let y = values
        .get(1)
        .or_else(|| values.first())
        .map_or(fallback[1], |v| clamp_px(*v, 0, MAX_SPACING, fallback[1]));
    [x, y]
}
