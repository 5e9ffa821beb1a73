//! Module documents and course-level settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layout::RawComposerLayout;
use crate::{Activity, ActivityId, ComposerError, ComposerResult};

/// Outer structural template applied around compiled activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Template {
    /// Plain grid of activities.
    #[default]
    Deck,
    /// Tabbed layout under a hero media block.
    Finlit,
    /// Two-column book with a generated table of contents.
    Coursebook,
    /// Searchable, filterable card grid.
    ToolkitDashboard,
}

impl Template {
    /// All templates in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Deck,
        Self::Finlit,
        Self::Coursebook,
        Self::ToolkitDashboard,
    ];

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "deck" => Some(Self::Deck),
            "finlit" => Some(Self::Finlit),
            "coursebook" => Some(Self::Coursebook),
            "toolkit_dashboard" => Some(Self::ToolkitDashboard),
            _ => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Finlit => "finlit",
            Self::Coursebook => "coursebook",
            Self::ToolkitDashboard => "toolkit_dashboard",
        }
    }

    /// Resolve the module's template, falling back to the course default and
    /// then to [`Template::Deck`].
    #[must_use]
    pub fn resolve(module_value: Option<&str>, course_default: Option<&str>) -> Self {
        resolve_closed(module_value, course_default, Self::parse, "template")
    }
}

/// Color/typography preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Neutral blue on white.
    #[default]
    Classic,
    /// Teal accents.
    Ocean,
    /// Green accents.
    Forest,
    /// Warm orange accents.
    Sunset,
    /// Dark slate surface.
    Slate,
}

impl Theme {
    /// All themes in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Classic,
        Self::Ocean,
        Self::Forest,
        Self::Sunset,
        Self::Slate,
    ];

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "classic" => Some(Self::Classic),
            "ocean" => Some(Self::Ocean),
            "forest" => Some(Self::Forest),
            "sunset" => Some(Self::Sunset),
            "slate" => Some(Self::Slate),
            _ => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Sunset => "sunset",
            Self::Slate => "slate",
        }
    }

    /// Resolve the module's theme, falling back to the course default and
    /// then to [`Theme::Classic`].
    #[must_use]
    pub fn resolve(module_value: Option<&str>, course_default: Option<&str>) -> Self {
        resolve_closed(module_value, course_default, Self::parse, "theme")
    }
}

fn resolve_closed<T: Default + Copy>(
    module_value: Option<&str>,
    course_default: Option<&str>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> T {
    for candidate in [module_value, course_default].into_iter().flatten() {
        if candidate.trim().is_empty() {
            continue;
        }
        if let Some(value) = parse(candidate) {
            return value;
        }
        tracing::warn!(value = candidate, "unknown {what}, falling back");
    }
    T::default()
}

/// Course-wide fallbacks for modules that omit template/theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSettings {
    /// Default template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_default: Option<String>,
    /// Default theme name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_default: Option<String>,
}

/// Hero media block shown by the finlit template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Sub-headline.
    #[serde(default)]
    pub subtitle: String,
    /// Hero image URL.
    #[serde(default)]
    pub image_url: String,
    /// Hero image alt text.
    #[serde(default)]
    pub image_alt: String,
    /// Hero video URL (takes precedence over the image).
    #[serde(default)]
    pub video_url: String,
}

/// One finlit tab grouping top-level activities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinlitTab {
    /// Tab label.
    #[serde(default)]
    pub label: String,
    /// Activities shown in this tab, by id.
    #[serde(default)]
    pub activity_ids: Vec<ActivityId>,
}

/// Finlit template settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinlitSettings {
    /// Configured tabs.
    #[serde(default)]
    pub tabs: Vec<FinlitTab>,
}

/// A lesson module: activities plus layout and presentation choices.
///
/// The compiler only reads modules; it never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module identifier.
    #[serde(default)]
    pub id: String,
    /// Module title.
    #[serde(default)]
    pub title: String,
    /// Flat activity list.
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Module-level layout configuration.
    #[serde(default)]
    pub composer_layout: RawComposerLayout,
    /// Template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Theme name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Hero block (finlit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    /// Finlit tab grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finlit: Option<FinlitSettings>,
    /// Fields owned by other collaborators, preserved untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Module {
    /// Create an empty module.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Append an activity.
    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Find an activity by id.
    #[must_use]
    pub fn activity(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| &a.id == id)
    }

    /// Find an activity by id, as an error when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::ActivityNotFound`] if no activity has this id.
    pub fn require_activity(&self, id: &ActivityId) -> ComposerResult<&Activity> {
        self.activity(id)
            .ok_or_else(|| ComposerError::ActivityNotFound(id.to_string()))
    }

    /// Resolved template, applying the course default.
    #[must_use]
    pub fn resolved_template(&self, settings: &CourseSettings) -> Template {
        Template::resolve(
            self.template.as_deref(),
            settings.template_default.as_deref(),
        )
    }

    /// Resolved theme, applying the course default.
    #[must_use]
    pub fn resolved_theme(&self, settings: &CourseSettings) -> Theme {
        Theme::resolve(self.theme.as_deref(), settings.theme_default.as_deref())
    }

    /// Serialize the module to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ComposerResult<String> {
        serde_json::to_string_pretty(self).map_err(ComposerError::Serialization)
    }

    /// Deserialize a module from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a module.
    pub fn from_json(json: &str) -> ComposerResult<Self> {
        serde_json::from_str(json).map_err(ComposerError::Serialization)
    }
}
