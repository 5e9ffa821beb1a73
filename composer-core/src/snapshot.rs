//! Progress snapshot wire format.
//!
//! A snapshot records every persistable form control of a compiled module in
//! document order, plus the visible state of interactive blocks. Fields are
//! correlated **positionally**: field *i* belongs to the *i*-th persistable
//! control at save time. Restoring therefore assumes the document was
//! compiled from the same activity list in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// `kind` value identifying a module progress backup.
pub const SNAPSHOT_KIND: &str = "course-factory-module-progress";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Status shown after a successful save.
pub const STATUS_SAVED: &str = "Progress saved. Keep the downloaded file somewhere safe.";

/// Status shown after a successful restore.
pub const STATUS_RESTORED: &str = "Progress restored from backup.";

/// Status shown when the chosen file is not JSON by name or type.
pub const STATUS_WRONG_FILE_TYPE: &str = "Please choose a .json progress backup file.";

/// Input types that never carry learner state.
pub const NON_PERSISTABLE_INPUT_TYPES: [&str; 7] =
    ["button", "submit", "reset", "file", "search", "image", "hidden"];

/// Errors raised while reading a progress backup.
///
/// Display strings are learner-facing status messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The file is not JSON.
    #[error("Could not read that file as a progress backup.")]
    InvalidJson,
    /// The JSON root is not an object, or required parts are malformed.
    #[error("Backup file is empty or malformed.")]
    Malformed,
    /// The backup belongs to a different kind of document.
    #[error("Unsupported backup type for this module.")]
    UnsupportedKind(String),
}

/// One persisted form control value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotField {
    /// Lower-case tag name (`input`, `textarea`, `select`).
    pub tag: String,
    /// Control type (`text`, `radio`, `checkbox`, `number`, `textarea`, `select-one`...).
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// Value for value-bearing controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Checked state for radios and checkboxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// Visible state of interactive blocks, keyed by stable per-block ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUi {
    /// Active tab index per tab strip.
    #[serde(default)]
    pub tabs: BTreeMap<String, u32>,
    /// Active step per path map.
    #[serde(default)]
    pub path_maps: BTreeMap<String, u32>,
    /// Active spot per hotspot image.
    #[serde(default)]
    pub hotspots: BTreeMap<String, u32>,
    /// Flipped state per flashcard.
    #[serde(default)]
    pub flashcards: BTreeMap<String, bool>,
    /// Item id order per drag-sort list.
    #[serde(default)]
    pub sort_lists: BTreeMap<String, Vec<String>>,
}

/// A learner progress backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Always [`SNAPSHOT_KIND`].
    pub kind: String,
    /// Format version.
    #[serde(default)]
    pub version: u32,
    /// ISO-8601 save time.
    #[serde(default)]
    pub saved_at: String,
    /// Form control values in document order.
    #[serde(default)]
    pub fields: Vec<SnapshotField>,
    /// Interactive block state.
    #[serde(default)]
    pub ui: SnapshotUi,
}

/// A persistable form control, as it appears in a compiled document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormControl {
    /// Lower-case tag name.
    pub tag: String,
    /// Control type, normalized like the browser's `element.type`.
    pub control_type: String,
    /// Current value.
    #[serde(default)]
    pub value: String,
    /// Current checked state.
    #[serde(default)]
    pub checked: bool,
    /// Owning activity id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    /// Owning activity title, used as the report section heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Human-readable label used in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Option text for radios and checkboxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// For graded choices, whether this option is the right answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

impl FormControl {
    /// Whether the control stores `checked` rather than `value`.
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        matches!(self.control_type.as_str(), "radio" | "checkbox")
    }
}

/// Counts from applying a snapshot to a control list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Fields written to a matching control.
    pub applied: usize,
    /// Fields whose control had a different tag or type.
    pub skipped: usize,
    /// Controls left without a field (document grew since save).
    pub missing: usize,
    /// Fields with no control (document shrank since save).
    pub extra: usize,
}

impl ApplyOutcome {
    /// Whether every field landed on a matching control and vice versa.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.skipped == 0 && self.missing == 0 && self.extra == 0
    }
}

/// Whether a `(tag, type)` pair is walked by the snapshot protocol.
#[must_use]
pub fn is_persistable(tag: &str, control_type: &str) -> bool {
    match tag {
        "textarea" | "select" => true,
        "input" => !NON_PERSISTABLE_INPUT_TYPES.contains(&control_type),
        _ => false,
    }
}

/// Record controls in document order.
#[must_use]
pub fn collect_fields(controls: &[FormControl]) -> Vec<SnapshotField> {
    controls
        .iter()
        .map(|control| {
            let (value, checked) = if control.is_checkable() {
                (None, Some(control.checked))
            } else {
                (Some(control.value.clone()), None)
            };
            SnapshotField {
                tag: control.tag.clone(),
                field_type: control.control_type.clone(),
                value,
                checked,
            }
        })
        .collect()
}

impl ProgressSnapshot {
    /// Capture a snapshot of the given controls and UI state.
    #[must_use]
    pub fn capture(controls: &[FormControl], ui: SnapshotUi, saved_at: impl Into<String>) -> Self {
        Self {
            kind: SNAPSHOT_KIND.to_string(),
            version: SNAPSHOT_VERSION,
            saved_at: saved_at.into(),
            fields: collect_fields(controls),
            ui,
        }
    }

    /// Parse and check an uploaded backup.
    ///
    /// A different `version` is tolerated; only known fields are read.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::InvalidJson`] if the text is not JSON.
    /// - [`SnapshotError::Malformed`] if the root is not an object or fields are malformed.
    /// - [`SnapshotError::UnsupportedKind`] if `kind` is not [`SNAPSHOT_KIND`].
    pub fn parse(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json).map_err(|_| SnapshotError::InvalidJson)?;
        let Value::Object(root) = &value else {
            return Err(SnapshotError::Malformed);
        };

        let kind = root.get("kind").and_then(Value::as_str).unwrap_or_default();
        if kind != SNAPSHOT_KIND {
            return Err(SnapshotError::UnsupportedKind(kind.to_string()));
        }

        let snapshot: Self = serde_json::from_value(value).map_err(|err| {
            tracing::debug!(error = %err, "progress backup failed to deserialize");
            SnapshotError::Malformed
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            tracing::warn!(
                version = snapshot.version,
                expected = SNAPSHOT_VERSION,
                "progress backup version differs, reading known fields only"
            );
        }
        Ok(snapshot)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write field values back onto controls, position by position.
    ///
    /// Fields whose tag or type disagree with the control at the same
    /// position are skipped rather than coerced.
    pub fn apply_to(&self, controls: &mut [FormControl]) -> ApplyOutcome {
        let mut outcome = ApplyOutcome {
            missing: controls.len().saturating_sub(self.fields.len()),
            extra: self.fields.len().saturating_sub(controls.len()),
            ..ApplyOutcome::default()
        };

        for (field, control) in self.fields.iter().zip(controls.iter_mut()) {
            if !field.tag.eq_ignore_ascii_case(&control.tag)
                || !field.field_type.eq_ignore_ascii_case(&control.control_type)
            {
                outcome.skipped += 1;
                continue;
            }
            if control.is_checkable() {
                control.checked = field.checked.unwrap_or(false);
            } else {
                control.value = field.value.clone().unwrap_or_default();
            }
            outcome.applied += 1;
        }

        outcome
    }
}
