//! Activity registry: the closed catalog of activity kinds.
//!
//! Every kind supplies a label, a category, default data, a pure
//! compile-to-HTML function and an advisory validator. The catalog is an
//! enum so the unknown-type fallback stays exhaustive:
//!
//! | type                | category    |
//! |---------------------|-------------|
//! | `content_block`     | content     |
//! | `embed`             | content     |
//! | `resource`          | content     |
//! | `knowledge_check`   | assessment  |
//! | `worksheet`         | assessment  |
//! | `rubric`            | assessment  |
//! | `fillable_chart`    | assessment  |
//! | `flashcards`        | interactive |
//! | `drag_sort`         | interactive |
//! | `checklist`         | interactive |
//! | `path_map`          | interactive |
//! | `hotspot`           | interactive |
//! | `decision_lab`      | interactive |
//! | `save_progress`     | utility     |
//! | `submission_report` | utility     |
//! | `tab_group`         | container   |
//! | `card_list`         | container   |

use composer_core::Activity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::html;
use crate::kinds::{
    assessment, containers, content, decision_lab, fillable_chart, interactive, rubric, utility,
    worksheet,
};

/// Heading level used for top-level activity titles.
pub const TOP_LEVEL_HEADING: u8 = 3;

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Likely broken for learners.
    Error,
    /// Worth a look before publishing.
    Warn,
}

/// Advisory validation issue. Never blocks compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Severity.
    pub level: IssueLevel,
    /// Author-facing message.
    pub message: String,
}

impl Issue {
    /// Error-level issue.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            message: message.into(),
        }
    }

    /// Warning-level issue.
    #[must_use]
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warn,
            message: message.into(),
        }
    }
}

/// A normalized sub-model plus the adjustments made to reach it.
///
/// Adjustments are surfaced by validators as warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    /// Canonical value.
    pub value: T,
    /// Human-readable description of each clamp or repair.
    pub adjustments: Vec<String>,
}

impl<T> Normalized<T> {
    /// Adjustments as warning issues.
    #[must_use]
    pub fn warnings(&self) -> Vec<Issue> {
        self.adjustments.iter().map(Issue::warn).collect()
    }
}

/// Grouping used by the toolkit dashboard filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Reading and media.
    Content,
    /// Graded or fillable work.
    Assessment,
    /// Self-paced interactive widgets.
    Interactive,
    /// Save/report tools.
    Utility,
    /// Tab groups and card lists.
    Container,
}

impl Category {
    /// All categories in filter-chip order.
    pub const ALL: [Self; 5] = [
        Self::Content,
        Self::Assessment,
        Self::Interactive,
        Self::Utility,
        Self::Container,
    ];

    /// Wire/CSS name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Assessment => "assessment",
            Self::Interactive => "interactive",
            Self::Utility => "utility",
            Self::Container => "container",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Assessment => "Assessment",
            Self::Interactive => "Interactive",
            Self::Utility => "Tools",
            Self::Container => "Collections",
        }
    }
}

/// Inputs to a kind's compile function.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    /// Activity data.
    pub data: &'a Value,
    /// Position of the activity in render order.
    pub index: usize,
    /// Activity id; DOM ids and state keys derive from it via [`Self::state_key`].
    pub activity_id: &'a str,
    /// Heading level for the activity title (3 at top level).
    pub heading_level: u8,
    /// How many times this activity was already rendered in the module.
    pub occurrence: usize,
}

impl<'a> CompileContext<'a> {
    /// Top-level context.
    #[must_use]
    pub fn new(data: &'a Value, index: usize, activity_id: &'a str) -> Self {
        Self {
            data,
            index,
            activity_id,
            heading_level: TOP_LEVEL_HEADING,
            occurrence: 0,
        }
    }

    /// Key for DOM ids, radio groups and runtime UI state.
    ///
    /// The first render uses the activity id. Later renders of the same
    /// activity (shared container references) get `--copy<n>` so their
    /// controls stay independent.
    #[must_use]
    pub fn state_key(&self) -> String {
        if self.occurrence == 0 {
            self.activity_id.to_string()
        } else {
            format!("{}--copy{}", self.activity_id, self.occurrence + 1)
        }
    }

    /// Title heading for this activity.
    #[must_use]
    pub fn heading(&self, title: &str) -> String {
        html::heading(self.heading_level, &self.state_key(), title)
    }

    /// DOM id scoped to this render of the activity.
    #[must_use]
    pub fn dom_id(&self, suffix: &str) -> String {
        html::dom_id(&self.state_key(), suffix)
    }
}

/// A registered activity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// Title, paragraphs and optional image.
    ContentBlock,
    /// External iframe.
    Embed,
    /// Links to view/download/read a resource.
    Resource,
    /// Multiple-choice and short-answer questions.
    KnowledgeCheck,
    /// Headed sections of fillable fields.
    Worksheet,
    /// Self-scored criteria grid.
    Rubric,
    /// Table mixing fixed and fillable cells.
    FillableChart,
    /// Flip cards.
    Flashcards,
    /// Put items in the right order.
    DragSort,
    /// Locally persisted checklist.
    Checklist,
    /// Step-by-step path.
    PathMap,
    /// Image with clickable pins.
    Hotspot,
    /// Weighted sliders with a derived score.
    DecisionLab,
    /// Save/load learner progress.
    SaveProgress,
    /// Build a text report of learner input.
    SubmissionReport,
    /// Tabs embedding other activities.
    TabGroup,
    /// Cards embedding other activities.
    CardList,
}

impl ActivityKind {
    /// Every registered kind, in catalog order.
    pub const ALL: [Self; 17] = [
        Self::ContentBlock,
        Self::Embed,
        Self::Resource,
        Self::KnowledgeCheck,
        Self::Worksheet,
        Self::Rubric,
        Self::FillableChart,
        Self::Flashcards,
        Self::DragSort,
        Self::Checklist,
        Self::PathMap,
        Self::Hotspot,
        Self::DecisionLab,
        Self::SaveProgress,
        Self::SubmissionReport,
        Self::TabGroup,
        Self::CardList,
    ];

    /// Look up a kind by its type string.
    #[must_use]
    pub fn from_type(activity_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == activity_type.trim())
    }

    /// Type string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentBlock => "content_block",
            Self::Embed => "embed",
            Self::Resource => "resource",
            Self::KnowledgeCheck => "knowledge_check",
            Self::Worksheet => "worksheet",
            Self::Rubric => "rubric",
            Self::FillableChart => "fillable_chart",
            Self::Flashcards => "flashcards",
            Self::DragSort => "drag_sort",
            Self::Checklist => "checklist",
            Self::PathMap => "path_map",
            Self::Hotspot => "hotspot",
            Self::DecisionLab => "decision_lab",
            Self::SaveProgress => "save_progress",
            Self::SubmissionReport => "submission_report",
            Self::TabGroup => "tab_group",
            Self::CardList => "card_list",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ContentBlock => "Content Block",
            Self::Embed => "Embed",
            Self::Resource => "Resource",
            Self::KnowledgeCheck => "Knowledge Check",
            Self::Worksheet => "Worksheet",
            Self::Rubric => "Rubric",
            Self::FillableChart => "Fillable Chart",
            Self::Flashcards => "Flashcards",
            Self::DragSort => "Drag Sort",
            Self::Checklist => "Checklist",
            Self::PathMap => "Path Map",
            Self::Hotspot => "Hotspot Image",
            Self::DecisionLab => "Decision Lab",
            Self::SaveProgress => "Save Progress",
            Self::SubmissionReport => "Submission Report",
            Self::TabGroup => "Tab Group",
            Self::CardList => "Card List",
        }
    }

    /// Category.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::ContentBlock | Self::Embed | Self::Resource => Category::Content,
            Self::KnowledgeCheck | Self::Worksheet | Self::Rubric | Self::FillableChart => {
                Category::Assessment
            }
            Self::Flashcards
            | Self::DragSort
            | Self::Checklist
            | Self::PathMap
            | Self::Hotspot
            | Self::DecisionLab => Category::Interactive,
            Self::SaveProgress | Self::SubmissionReport => Category::Utility,
            Self::TabGroup | Self::CardList => Category::Container,
        }
    }

    /// Whether this kind embeds other activities.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::TabGroup | Self::CardList)
    }

    /// Data for a freshly created activity of this kind.
    #[must_use]
    pub fn default_data(self) -> Value {
        match self {
            Self::ContentBlock => content::content_block_default(),
            Self::Embed => content::embed_default(),
            Self::Resource => content::resource_default(),
            Self::KnowledgeCheck => assessment::default_data(),
            Self::Worksheet => worksheet::default_data(),
            Self::Rubric => rubric::default_data(),
            Self::FillableChart => fillable_chart::default_data(),
            Self::Flashcards => interactive::flashcards_default(),
            Self::DragSort => interactive::drag_sort_default(),
            Self::Checklist => interactive::checklist_default(),
            Self::PathMap => interactive::path_map_default(),
            Self::Hotspot => interactive::hotspot_default(),
            Self::DecisionLab => decision_lab::default_data(),
            Self::SaveProgress => utility::save_progress_default(),
            Self::SubmissionReport => utility::submission_report_default(),
            Self::TabGroup => containers::tab_group_default(),
            Self::CardList => containers::card_list_default(),
        }
    }

    /// Compile to a static HTML fragment. Pure and total.
    ///
    /// Containers compiled through this entry point have no module to
    /// resolve references against, so every child renders as a placeholder;
    /// the module compiler resolves children itself.
    #[must_use]
    pub fn compile(self, ctx: &CompileContext<'_>) -> String {
        match self {
            Self::ContentBlock => content::compile_content_block(ctx),
            Self::Embed => content::compile_embed(ctx),
            Self::Resource => content::compile_resource(ctx),
            Self::KnowledgeCheck => assessment::compile(ctx),
            Self::Worksheet => worksheet::compile(ctx),
            Self::Rubric => rubric::compile(ctx),
            Self::FillableChart => fillable_chart::compile(ctx),
            Self::Flashcards => interactive::compile_flashcards(ctx),
            Self::DragSort => interactive::compile_drag_sort(ctx),
            Self::Checklist => interactive::compile_checklist(ctx),
            Self::PathMap => interactive::compile_path_map(ctx),
            Self::Hotspot => interactive::compile_hotspot(ctx),
            Self::DecisionLab => decision_lab::compile(ctx),
            Self::SaveProgress => utility::compile_save_progress(ctx),
            Self::SubmissionReport => utility::compile_submission_report(ctx),
            Self::TabGroup => containers::compile_tab_group(ctx, &mut containers::Unresolved),
            Self::CardList => containers::compile_card_list(ctx, &mut containers::Unresolved),
        }
    }

    /// Advisory issues for this kind's data.
    #[must_use]
    pub fn validate(self, data: &Value) -> Vec<Issue> {
        match self {
            Self::ContentBlock => content::validate_content_block(data),
            Self::Embed => content::validate_embed(data),
            Self::Resource => content::validate_resource(data),
            Self::KnowledgeCheck => assessment::validate(data),
            Self::Worksheet => worksheet::validate(data),
            Self::Rubric => rubric::validate(data),
            Self::FillableChart => fillable_chart::validate(data),
            Self::Flashcards => interactive::validate_flashcards(data),
            Self::DragSort => interactive::validate_drag_sort(data),
            Self::Checklist => interactive::validate_checklist(data),
            Self::PathMap => interactive::validate_path_map(data),
            Self::Hotspot => interactive::validate_hotspot(data),
            Self::DecisionLab => decision_lab::validate(data),
            Self::SaveProgress | Self::SubmissionReport => Vec::new(),
            Self::TabGroup => containers::validate_tab_group(data),
            Self::CardList => containers::validate_card_list(data),
        }
    }
}

/// Compile an activity fragment by type string.
///
/// Unknown types produce a flagged fragment instead of failing.
#[must_use]
pub fn compile_to_html(activity_type: &str, ctx: &CompileContext<'_>) -> String {
    match ActivityKind::from_type(activity_type) {
        Some(kind) => kind.compile(ctx),
        None => unknown_type_fragment(activity_type),
    }
}

/// Flagged fragment for an unregistered activity type.
#[must_use]
pub fn unknown_type_fragment(activity_type: &str) -> String {
    html::flagged(
        "unknown-type",
        &format!("Unknown activity type \"{}\"", activity_type.trim()),
    )
}

/// Default data for a type string, if registered.
#[must_use]
pub fn create_default_data(activity_type: &str) -> Option<Value> {
    ActivityKind::from_type(activity_type).map(ActivityKind::default_data)
}

/// Advisory issues for one activity.
#[must_use]
pub fn validate_activity(activity: &Activity) -> Vec<Issue> {
    let mut issues = Vec::new();
    if activity.id.is_empty() {
        issues.push(Issue::error("activity has no id"));
    }
    match ActivityKind::from_type(&activity.activity_type) {
        Some(kind) => issues.extend(kind.validate(&activity.data)),
        None => issues.push(Issue::error(format!(
            "unknown activity type \"{}\"",
            activity.activity_type
        ))),
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_kind_roundtrips_type_string() {
        for kind in ActivityKind::ALL {
            assert_eq!(ActivityKind::from_type(kind.as_str()), Some(kind));
        }
        assert!(ActivityKind::from_type("mystery").is_none());
    }

    #[test]
    fn test_default_data_compiles_and_validates_cleanly() {
        for kind in ActivityKind::ALL {
            let data = kind.default_data();
            let fragment = kind.compile(&CompileContext::new(&data, 0, "demo"));
            assert!(!fragment.is_empty(), "{} compiled empty", kind.as_str());
            let errors: Vec<_> = kind
                .validate(&data)
                .into_iter()
                .filter(|i| i.level == IssueLevel::Error)
                .collect();
            assert!(errors.is_empty(), "{}: {errors:?}", kind.as_str());
        }
    }

    #[test]
    fn test_compile_is_total_on_garbage_data() {
        let garbage = [
            Value::Null,
            json!(42),
            json!("text"),
            json!([1, 2]),
            json!({"questions": "nope", "rows": {"a": 1}, "cards": [null, 3], "rowCount": "many"}),
        ];
        for kind in ActivityKind::ALL {
            for data in &garbage {
                let _ = kind.compile(&CompileContext::new(data, 3, "x"));
                let _ = kind.validate(data);
            }
        }
    }

    #[test]
    fn test_unknown_type_fragment_is_flagged() {
        let data = json!({});
        let html = compile_to_html("hologram", &CompileContext::new(&data, 0, "a"));
        assert!(html.contains("data-cf-flag=\"unknown-type\""));
        assert!(html.contains("hologram"));
    }

    #[test]
    fn test_validate_unknown_type_and_missing_id() {
        let mut activity = Activity::new("hologram", json!({}));
        activity.id = composer_core::ActivityId::default();
        let issues = validate_activity(&activity);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.level == IssueLevel::Error));
    }

    #[test]
    fn test_create_default_data() {
        assert!(create_default_data("rubric").is_some());
        assert!(create_default_data("nope").is_none());
    }

    #[test]
    fn test_categories() {
        assert_eq!(ActivityKind::TabGroup.category(), Category::Container);
        assert_eq!(ActivityKind::Rubric.category(), Category::Assessment);
        assert!(ActivityKind::CardList.is_container());
        assert!(!ActivityKind::Checklist.is_container());
    }
}
