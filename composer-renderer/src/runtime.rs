//! Browser runtime shipped with every compiled module.
//!
//! The script is a single guarded IIFE bound at the document level, so
//! inlining it once per module on the same page is harmless. Strings the
//! runtime shares with the Rust side (snapshot kind, status messages, report
//! headers) are substituted in from `composer-core` so both ends agree.

use composer_core::report::{NO_RESPONSE, REPORT_GENERATED_PREFIX, REPORT_TITLE_PREFIX};
use composer_core::snapshot::{
    SnapshotError, NON_PERSISTABLE_INPUT_TYPES, SNAPSHOT_KIND, SNAPSHOT_VERSION, STATUS_RESTORED,
    STATUS_SAVED, STATUS_WRONG_FILE_TYPE,
};
use serde_json::Value;

use crate::kinds::interactive::CHECKLIST_STORAGE_PREFIX;

const RUNTIME_TEMPLATE: &str = include_str!("assets/runtime.js");

/// Global flag the runtime sets once it has bound its listeners.
pub const RUNTIME_GUARD: &str = "__cfComposerBound";

fn js_string(text: &str) -> String {
    Value::from(text).to_string()
}

/// The runtime script with shared constants filled in.
///
/// The result is safe to place inside a `<script>` element.
#[must_use]
pub fn runtime_script() -> String {
    let non_persistable = Value::from(
        NON_PERSISTABLE_INPUT_TYPES
            .iter()
            .map(|t| Value::from(*t))
            .collect::<Vec<_>>(),
    )
    .to_string();
    let substitutions = [
        ("__CF_SNAPSHOT_KIND__", js_string(SNAPSHOT_KIND)),
        ("__CF_SNAPSHOT_VERSION__", SNAPSHOT_VERSION.to_string()),
        ("__CF_STATUS_SAVED__", js_string(STATUS_SAVED)),
        ("__CF_STATUS_RESTORED__", js_string(STATUS_RESTORED)),
        ("__CF_STATUS_WRONG_FILE__", js_string(STATUS_WRONG_FILE_TYPE)),
        (
            "__CF_ERR_INVALID_JSON__",
            js_string(&SnapshotError::InvalidJson.to_string()),
        ),
        (
            "__CF_ERR_UNSUPPORTED__",
            js_string(&SnapshotError::UnsupportedKind(String::new()).to_string()),
        ),
        (
            "__CF_ERR_MALFORMED__",
            js_string(&SnapshotError::Malformed.to_string()),
        ),
        ("__CF_REPORT_TITLE_PREFIX__", js_string(REPORT_TITLE_PREFIX)),
        (
            "__CF_REPORT_GENERATED_PREFIX__",
            js_string(REPORT_GENERATED_PREFIX),
        ),
        ("__CF_NO_RESPONSE__", js_string(NO_RESPONSE)),
        ("__CF_CHECKLIST_PREFIX__", js_string(CHECKLIST_STORAGE_PREFIX)),
        ("__CF_NON_PERSISTABLE__", non_persistable),
    ];

    let mut script = RUNTIME_TEMPLATE.to_string();
    for (placeholder, value) in &substitutions {
        script = script.replace(placeholder, value);
    }
    script.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_placeholders_substituted() {
        let script = runtime_script();
        assert!(!script.contains("__CF_"), "unfilled placeholder left in runtime");
        assert!(script.contains("\"course-factory-module-progress\""));
        assert!(script.contains("\"cf-checklist:\""));
    }

    #[test]
    fn test_script_is_guarded_once() {
        let script = runtime_script();
        assert!(script.contains(&format!("window.{RUNTIME_GUARD}")));
    }

    #[test]
    fn test_script_cannot_close_its_element() {
        assert!(!runtime_script().contains("</"));
    }
}
