//! # Course Composer Renderer
//!
//! Activity registry and module compiler. Turns a [`composer_core::Module`]
//! into a self-contained `{html, css, script}` triple.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Module Compiler                │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Registry     │ Templates    │ Runtime       │
//! │ 17 kinds     │ deck/finlit/ │ one guarded   │
//! │ + validators │ coursebook/  │ script        │
//! │              │ toolkit      │               │
//! └──────────────┴──────────────┴───────────────┘
//! ```
//!
//! Compilation is total: bad input degrades to visibly flagged fragments.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compiler;
pub(crate) mod data;
pub mod error;
pub mod html;
pub mod kinds;
pub mod lint;
pub mod registry;
pub mod runtime;
pub mod scan;
pub mod styles;
pub mod templates;

pub use compiler::{compile_module, compile_module_json, CompileOptions, CompiledModule};
pub use error::{RenderError, RenderResult};
pub use lint::{validate_module, ModuleIssue};
pub use registry::{
    compile_to_html, create_default_data, validate_activity, ActivityKind, Category,
    CompileContext, Issue, IssueLevel,
};
pub use runtime::runtime_script;
pub use scan::{scan_headings, scan_persistable_controls, TocEntry};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
