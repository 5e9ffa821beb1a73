//! # Course Composer Core
//!
//! Data model and pure layout logic for activity-based lesson modules.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                composer-core                │
//! ├─────────────────────────────────────────────┤
//! │  Module Model      │  Layout Engine         │
//! │  - Activities      │  - normalize_layout    │
//! │  - Style/behavior  │  - simple/canvas pack  │
//! │  - Template/theme  │  - pinned moves        │
//! ├─────────────────────────────────────────────┤
//! │  Progress Snapshot │  Submission Report     │
//! │  - Wire format     │  - Text format         │
//! │  - Positional I/O  │  - Offline builder     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing here renders HTML; see `composer-renderer` for the registry and
//! module compiler.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod error;
pub mod layout;
pub mod module;
pub mod report;
pub mod snapshot;

pub use activity::{
    Activity, ActivityBehavior, ActivityId, ActivityLayout, ActivityStyle, PaddingSize,
    StyleVariant, TitleSize,
};
pub use error::{ComposerError, ComposerResult};
pub use layout::{
    build_grid_model, move_activity_to_cell, normalize_activities, normalize_layout,
    rects_overlap, ComposerLayout, GridCell, GridModel, GridModelOptions, GridPlacement, GridRect,
    LayoutMode, MoveOptions, MoveOutcome, NormalizeOptions, Placement, RawComposerLayout,
};
pub use module::{CourseSettings, FinlitSettings, FinlitTab, Hero, Module, Template, Theme};
pub use report::{build_offline_report, ReportSection, SubmissionReport};
pub use snapshot::{
    ApplyOutcome, FormControl, ProgressSnapshot, SnapshotError, SnapshotField, SnapshotUi,
    SNAPSHOT_KIND, SNAPSHOT_VERSION,
};

/// Composer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
