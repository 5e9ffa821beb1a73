//! # Course Composer CLI
//!
//! Command-line host for the composer engine.
//!
//! ## Usage
//!
//! ```bash
//! course-composer compile module.json --output module.html
//! course-composer compile module.json --triple
//! course-composer lint module.json
//! course-composer grid module.json --trailing-rows 1
//! course-composer inspect-snapshot module.json backup.json
//! course-composer report module.json backup.json --output report.txt
//! ```
//!
//! Course defaults come from `--template-default` / `--theme-default`
//! (or `COMPOSER_TEMPLATE_DEFAULT` / `COMPOSER_THEME_DEFAULT`). A
//! `--settings` file overrides both.
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ComposerConfig` - Resolved command plus course settings
//! - [`run`] - Executes a command, writing its result to a sink

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::{inspect_snapshot, run, RunStatus, SnapshotInspection};

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use composer_core::CourseSettings;

/// Command-line arguments for course-composer.
#[derive(Debug, Clone, Parser)]
#[command(name = "course-composer")]
#[command(about = "Compile activity-based lesson modules into standalone interactive HTML")]
#[command(version)]
pub struct CliArgs {
    /// Course settings JSON (`{"templateDefault": ..., "themeDefault": ...}`)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Template used by modules that do not name one
    #[arg(long, global = true, env = "COMPOSER_TEMPLATE_DEFAULT")]
    pub template_default: Option<String>,

    /// Theme used by modules that do not name one
    #[arg(long, global = true, env = "COMPOSER_THEME_DEFAULT")]
    pub theme_default: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compile a module to a standalone HTML document
    Compile {
        /// Module JSON file
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Emit the `{html, css, script}` triple as JSON
        #[arg(long)]
        triple: bool,
    },
    /// Report validator issues as JSON; exits non-zero on errors
    Lint {
        /// Module JSON file
        input: PathBuf,
    },
    /// Print the simple-mode grid model as JSON
    Grid {
        /// Module JSON file
        input: PathBuf,
        /// Column count (defaults to the module layout)
        #[arg(long)]
        max_columns: Option<u32>,
        /// Minimum rows to report
        #[arg(long, default_value = "0")]
        min_rows: u32,
        /// Empty rows appended after the last row
        #[arg(long, default_value = "0")]
        trailing_rows: u32,
    },
    /// Check how a learner progress backup lines up with a module
    InspectSnapshot {
        /// Module JSON file
        module: PathBuf,
        /// Progress backup JSON file
        backup: PathBuf,
    },
    /// Build the submission report from a progress backup
    Report {
        /// Module JSON file
        module: PathBuf,
        /// Progress backup JSON file
        backup: PathBuf,
        /// RFC 3339 generation time (defaults to now)
        #[arg(long)]
        generated_at: Option<String>,
        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Course-level fallbacks from flags or environment.
    pub course_settings: CourseSettings,
    /// Settings file that overrides `course_settings` when read.
    pub settings_path: Option<PathBuf>,
    /// Command to run.
    pub command: Command,
}

impl ComposerConfig {
    /// Create a configuration with no course defaults.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            course_settings: CourseSettings::default(),
            settings_path: None,
            command,
        }
    }

    /// Set the settings file.
    #[must_use]
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }
}

impl From<CliArgs> for ComposerConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            course_settings: CourseSettings {
                template_default: args.template_default,
                theme_default: args.theme_default,
            },
            settings_path: args.settings,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_into_config() {
        let args = CliArgs::try_parse_from([
            "course-composer",
            "--template-default",
            "finlit",
            "compile",
            "module.json",
            "--triple",
        ])
        .expect("parse");
        let config = ComposerConfig::from(args);
        assert_eq!(config.course_settings.template_default.as_deref(), Some("finlit"));
        assert_eq!(
            config.command,
            Command::Compile {
                input: PathBuf::from("module.json"),
                output: None,
                triple: true,
            }
        );
    }

    #[test]
    fn test_global_settings_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "course-composer",
            "grid",
            "module.json",
            "--settings",
            "course.json",
            "--trailing-rows",
            "2",
        ])
        .expect("parse");
        assert_eq!(args.settings, Some(PathBuf::from("course.json")));
        assert!(matches!(
            args.command,
            Command::Grid { trailing_rows: 2, max_columns: None, .. }
        ));
    }

    #[test]
    fn test_report_requires_backup() {
        assert!(CliArgs::try_parse_from(["course-composer", "report", "module.json"]).is_err());
    }
}
