//! Pre-publish lint over a whole module.
//!
//! Issues are advisory; nothing here affects compilation.

use std::collections::{HashMap, HashSet};

use composer_core::{Activity, Module};
use serde::{Deserialize, Serialize};

use crate::kinds::containers::{entries_for, ChildRef};
use crate::registry::{validate_activity, Issue, IssueLevel};

/// An issue attributed to one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIssue {
    /// Activity id (may be blank).
    pub activity_id: String,
    /// Activity type string.
    pub activity_type: String,
    /// Severity.
    pub level: IssueLevel,
    /// Author-facing message.
    pub message: String,
}

impl ModuleIssue {
    fn new(activity: &Activity, issue: Issue) -> Self {
        Self {
            activity_id: activity.id.to_string(),
            activity_type: activity.activity_type.clone(),
            level: issue.level,
            message: issue.message,
        }
    }
}

fn unknown_references(activity: &Activity, known: &HashSet<&str>) -> Vec<Issue> {
    references(activity)
        .into_iter()
        .filter(|id| !known.contains(id.as_str()))
        .map(|id| Issue::warn(format!("references unknown activity \"{id}\"")))
        .collect()
}

fn references(activity: &Activity) -> Vec<String> {
    entries_for(&activity.activity_type, &activity.data, activity.id.as_str())
        .into_iter()
        .filter_map(|entry| match entry.child {
            Some(ChildRef::Reference(id)) => Some(id.to_string()),
            _ => None,
        })
        .collect()
}

/// Validate every activity and cross-activity constraints.
///
/// Adds duplicate-id errors, warnings for container references that no
/// activity in the module answers to, and warnings when more than one
/// container entry shows the same activity.
#[must_use]
pub fn validate_module(module: &Module) -> Vec<ModuleIssue> {
    let known: HashSet<&str> = module.activities.iter().map(|a| a.id.as_str()).collect();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut shown: HashSet<String> = HashSet::new();
    let mut issues = Vec::new();

    for activity in &module.activities {
        let id = activity.id.as_str();
        if !id.is_empty() {
            let count = seen.entry(id).or_insert(0);
            *count += 1;
            if *count == 2 {
                issues.push(ModuleIssue::new(
                    activity,
                    Issue::error(format!("duplicate activity id \"{id}\"")),
                ));
            }
        }
        issues.extend(
            validate_activity(activity)
                .into_iter()
                .chain(unknown_references(activity, &known))
                .map(|issue| ModuleIssue::new(activity, issue)),
        );
        for target in references(activity) {
            if known.contains(target.as_str()) && !shown.insert(target.clone()) {
                issues.push(ModuleIssue::new(
                    activity,
                    Issue::warn(format!(
                        "activity \"{target}\" is shown by more than one container; each copy keeps separate answers"
                    )),
                ));
            }
        }
    }
    issues
}

/// Whether any issue is an error.
#[must_use]
pub fn has_errors(issues: &[ModuleIssue]) -> bool {
    issues.iter().any(|issue| issue.level == IssueLevel::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_ids_reported_once() {
        let module = Module::new("Dupes")
            .with_activity(Activity::new("content_block", json!({"title": "A"})).with_id("x"))
            .with_activity(Activity::new("content_block", json!({"title": "B"})).with_id("x"))
            .with_activity(Activity::new("content_block", json!({"title": "C"})).with_id("x"));
        let dupes: Vec<_> = validate_module(&module)
            .into_iter()
            .filter(|i| i.message.starts_with("duplicate"))
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].level, IssueLevel::Error);
    }

    #[test]
    fn test_unknown_reference_warns() {
        let module = Module::new("Refs").with_activity(
            Activity::new(
                "card_list",
                json!({"title": "Cards", "cards": [{"title": "Gone", "activityId": "ghost"}]}),
            )
            .with_id("cards"),
        );
        let issues = validate_module(&module);
        assert!(issues.iter().any(|i| i.activity_id == "cards"
            && i.level == IssueLevel::Warn
            && i.message == "references unknown activity \"ghost\""));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_shared_reference_warns_on_later_container() {
        let module = Module::new("Shared")
            .with_activity(Activity::new("rubric", json!({"title": "Rubric"})).with_id("rub"))
            .with_activity(
                Activity::new("tab_group", json!({"tabs": [{"label": "R", "activityId": "rub"}]}))
                    .with_id("tabs"),
            )
            .with_activity(
                Activity::new("card_list", json!({"cards": [{"title": "R", "activityId": "rub"}]}))
                    .with_id("cards"),
            );
        let shared: Vec<_> = validate_module(&module)
            .into_iter()
            .filter(|i| i.message.contains("more than one container"))
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].activity_id, "cards");
        assert_eq!(shared[0].level, IssueLevel::Warn);
    }

    #[test]
    fn test_unknown_type_is_error() {
        let module = Module::new("Unknown")
            .with_activity(Activity::new("hologram", json!({})).with_id("h"));
        let issues = validate_module(&module);
        assert!(has_errors(&issues));
        assert_eq!(issues[0].activity_type, "hologram");
    }
}
