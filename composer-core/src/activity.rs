//! Activities - the building blocks of modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for an activity within a module.
///
/// Ids are stable across edits: the compiler uses them as DOM anchors and
/// the runtime uses them to correlate per-block state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    /// Create a new unique activity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is blank (inline children authored without an id).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Placement descriptor for an activity.
///
/// Every field is optional and signed on the wire so that out-of-range
/// author input deserializes and gets clamped by the layout engine instead
/// of being rejected. `row`/`col` are 1-based (simple mode); `x`/`y` are
/// 0-based grid cells (canvas mode).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLayout {
    /// Number of grid columns spanned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<i64>,
    /// Simple-mode row (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i64>,
    /// Simple-mode column (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i64>,
    /// Canvas-mode column offset (0-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    /// Canvas-mode row offset (0-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    /// Canvas-mode width in grid cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    /// Canvas-mode height in grid cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
}

impl ActivityLayout {
    /// Simple-mode placement at `(row, col)` spanning `col_span` columns.
    #[must_use]
    pub fn cell(row: i64, col: i64, col_span: i64) -> Self {
        Self {
            col_span: Some(col_span),
            row: Some(row),
            col: Some(col),
            ..Self::default()
        }
    }

    /// Canvas-mode rectangle.
    #[must_use]
    pub fn rect(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w: Some(w),
            h: Some(h),
            ..Self::default()
        }
    }
}

/// Card or flat presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StyleVariant {
    /// Raised card with background.
    #[default]
    Card,
    /// Flat block, no background.
    Flat,
}

impl From<String> for StyleVariant {
    fn from(value: String) -> Self {
        match value.as_str() {
            "flat" => Self::Flat,
            _ => Self::Card,
        }
    }
}

impl From<StyleVariant> for String {
    fn from(value: StyleVariant) -> Self {
        value.as_str().to_string()
    }
}

impl StyleVariant {
    /// Wire/CSS name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Flat => "flat",
        }
    }
}

/// Inner padding preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaddingSize {
    /// No padding.
    None,
    /// Small padding.
    Sm,
    /// Medium padding.
    #[default]
    Md,
    /// Large padding.
    Lg,
}

impl From<String> for PaddingSize {
    fn from(value: String) -> Self {
        match value.as_str() {
            "none" => Self::None,
            "sm" => Self::Sm,
            "lg" => Self::Lg,
            _ => Self::Md,
        }
    }
}

impl From<PaddingSize> for String {
    fn from(value: PaddingSize) -> Self {
        value.as_str().to_string()
    }
}

impl PaddingSize {
    /// Wire/CSS name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
        }
    }
}

/// Activity title size preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TitleSize {
    /// Small title.
    Sm,
    /// Medium title.
    #[default]
    Md,
    /// Large title.
    Lg,
}

impl From<String> for TitleSize {
    fn from(value: String) -> Self {
        match value.as_str() {
            "sm" => Self::Sm,
            "lg" => Self::Lg,
            _ => Self::Md,
        }
    }
}

impl From<TitleSize> for String {
    fn from(value: TitleSize) -> Self {
        value.as_str().to_string()
    }
}

impl TitleSize {
    /// Wire/CSS name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
        }
    }
}

/// Presentational overrides, independent of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStyle {
    /// Draw a border around the activity.
    #[serde(default = "ActivityStyle::default_border")]
    pub border: bool,
    /// Card or flat.
    #[serde(default)]
    pub variant: StyleVariant,
    /// Inner padding.
    #[serde(default)]
    pub padding: PaddingSize,
    /// Title size.
    #[serde(default)]
    pub title_size: TitleSize,
}

impl ActivityStyle {
    const fn default_border() -> bool {
        true
    }
}

impl Default for ActivityStyle {
    fn default() -> Self {
        Self {
            border: true,
            variant: StyleVariant::Card,
            padding: PaddingSize::Md,
            title_size: TitleSize::Md,
        }
    }
}

/// Disclosure behavior wrapped around the rendered fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBehavior {
    /// Wrap the activity in a collapsible disclosure.
    #[serde(default)]
    pub collapsible: bool,
    /// Start collapsed (only meaningful when `collapsible`).
    #[serde(default)]
    pub collapsed_by_default: bool,
}

/// A module activity with typed envelope and open per-type data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier within the module.
    #[serde(default)]
    pub id: ActivityId,
    /// Registry key (e.g. `rubric`, `tab_group`).
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Per-type data, read leniently by the registry.
    #[serde(default)]
    pub data: Value,
    /// Placement.
    #[serde(default)]
    pub layout: ActivityLayout,
    /// Presentational overrides.
    #[serde(default)]
    pub style: ActivityStyle,
    /// Disclosure behavior.
    #[serde(default)]
    pub behavior: ActivityBehavior,
}

impl Activity {
    /// Create a new activity with a fresh id.
    #[must_use]
    pub fn new(activity_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: ActivityId::new(),
            activity_type: activity_type.into(),
            data,
            layout: ActivityLayout::default(),
            style: ActivityStyle::default(),
            behavior: ActivityBehavior::default(),
        }
    }

    /// Create an inline child for a container: same shape, freshly generated id.
    #[must_use]
    pub fn inline_child(activity_type: impl Into<String>, data: Value) -> Self {
        Self::new(activity_type, data)
    }

    /// Replace the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = ActivityId::from_string(id);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: ActivityLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: ActivityStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: ActivityBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Author-facing title from `data.title`, if present and non-blank.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.data
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
