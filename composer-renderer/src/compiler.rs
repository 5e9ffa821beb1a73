//! Module compiler: layout, container resolution, wrappers and templates.
//!
//! ```text
//! Module ──► normalize layout ──► pick roots ──► render (registry + resolver)
//!                                                     │
//!        {html, css, script} ◄── template ◄── positioned wrappers
//! ```
//!
//! Compilation is total. Unknown types, dangling references, cycles and
//! over-deep nesting all degrade to visible fragments.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write;

use composer_core::{
    normalize_activities, Activity, ActivityId, ComposerLayout, CourseSettings, LayoutMode,
    Module, Placement, Template,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RenderResult;
use crate::html::{self, escape};
use crate::kinds::containers::{self, entries_for, ChildRef, ChildResolver, RenderedChild};
use crate::registry::{self, ActivityKind, CompileContext, TOP_LEVEL_HEADING};
use crate::runtime::runtime_script;
use crate::styles::module_css;
use crate::templates::{self, PageFrame, PageItem};

/// Deepest container nesting rendered before giving up.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Compile options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Course-level template/theme fallbacks.
    #[serde(default)]
    pub course_settings: CourseSettings,
}

impl CompileOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set course settings.
    #[must_use]
    pub fn with_course_settings(mut self, settings: CourseSettings) -> Self {
        self.course_settings = settings;
        self
    }

    /// Read course settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RenderError::Settings`] if the JSON is not a settings object.
    pub fn from_settings_json(json: &str) -> RenderResult<Self> {
        let settings: CourseSettings = serde_json::from_str(json)?;
        Ok(Self::new().with_course_settings(settings))
    }
}

/// The compiled triple. `html` and `script` must ship together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledModule {
    /// Module markup.
    pub html: String,
    /// Module stylesheet.
    pub css: String,
    /// Runtime script.
    pub script: String,
    /// Document title used by [`CompiledModule::to_document`].
    #[serde(skip)]
    pub title: String,
}

impl CompiledModule {
    /// Standalone HTML page with inline style and script.
    #[must_use]
    pub fn to_document(&self) -> String {
        let title = if self.title.trim().is_empty() {
            "Module"
        } else {
            self.title.trim()
        };
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n<script>\n{}\n</script>\n</body>\n</html>\n",
            escape(title),
            self.css.replace("</", "<\\/"),
            self.html,
            self.script
        )
    }
}

/// Whether a template positions wrappers on explicit grid lines.
///
/// Finlit and toolkit split or filter activities, so explicit lines would
/// leave holes; they keep spans only and let the grid flow.
fn explicit_placement(template: Template) -> bool {
    matches!(template, Template::Deck | Template::Coursebook)
}

fn placement_style(activity: &Activity, mode: LayoutMode, explicit: bool) -> String {
    match (Placement::of(activity, mode), explicit) {
        (Placement::Cell { row, col, col_span }, true) => {
            format!("grid-column:{col} / span {col_span};grid-row:{row}")
        }
        (Placement::Cell { col_span, .. }, false) => format!("grid-column:span {col_span}"),
        (Placement::Rect(rect), true) => format!(
            "grid-column:{} / span {};grid-row:{} / span {}",
            rect.x + 1,
            rect.w,
            rect.y + 1,
            rect.h
        ),
        (Placement::Rect(rect), false) => {
            format!("grid-column:span {};grid-row:span {}", rect.w, rect.h)
        }
    }
}

fn display_title(activity: &Activity) -> String {
    match activity.title() {
        Some(title) => title.to_string(),
        None => ActivityKind::from_type(&activity.activity_type).map_or_else(
            || activity.activity_type.trim().to_string(),
            |kind| kind.label().to_string(),
        ),
    }
}

/// Ids referenced by an activity's container entries, including those inside
/// inline children.
fn referenced_ids(activity: &Activity, depth: usize, out: &mut Vec<ActivityId>) {
    if depth > MAX_NESTING_DEPTH {
        return;
    }
    for entry in entries_for(&activity.activity_type, &activity.data, activity.id.as_str()) {
        match entry.child {
            Some(ChildRef::Reference(id)) => out.push(id),
            Some(ChildRef::Inline(child)) => referenced_ids(&child, depth + 1, out),
            None => {}
        }
    }
}

/// Indices of top-level activities, in list order.
///
/// Activities referenced by a container render inside it. Anything not
/// reachable from an unreferenced activity sits on a reference cycle and is
/// promoted, first in list order, until everything is reachable.
#[must_use]
pub fn root_indices(activities: &[Activity]) -> Vec<usize> {
    let edges: Vec<Vec<ActivityId>> = activities
        .iter()
        .map(|activity| {
            let mut ids = Vec::new();
            referenced_ids(activity, 0, &mut ids);
            ids
        })
        .collect();
    let referenced: HashSet<&str> = edges.iter().flatten().map(ActivityId::as_str).collect();
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, activity) in activities.iter().enumerate() {
        by_id.entry(activity.id.as_str()).or_default().push(i);
    }

    let mut reached = vec![false; activities.len()];
    let mut roots = Vec::new();
    let visit = |start: usize, reached: &mut [bool]| {
        let mut queue = VecDeque::from([start]);
        reached[start] = true;
        while let Some(i) = queue.pop_front() {
            for id in &edges[i] {
                for &j in by_id.get(id.as_str()).map(Vec::as_slice).unwrap_or_default() {
                    if !reached[j] {
                        reached[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
    };

    for (i, activity) in activities.iter().enumerate() {
        if !referenced.contains(activity.id.as_str()) {
            roots.push(i);
            visit(i, &mut reached);
        }
    }
    for (i, activity) in activities.iter().enumerate() {
        if !reached[i] {
            debug!(activity = %activity.id, "Promoting activity reachable only through a cycle");
            roots.push(i);
            visit(i, &mut reached);
        }
    }
    roots.sort_unstable();
    roots
}

/// Resolves container children against the module's flat activity list.
///
/// The ancestor trail is threaded through recursion; a child already on the
/// trail renders a cycle fragment instead of recursing.
struct ModuleResolver<'m> {
    lookup: HashMap<&'m str, &'m Activity>,
    trail: Vec<String>,
    rendered: usize,
    occurrences: HashMap<String, usize>,
}

impl<'m> ModuleResolver<'m> {
    fn new(activities: &'m [Activity]) -> Self {
        let mut lookup = HashMap::new();
        for activity in activities {
            if lookup.insert(activity.id.as_str(), activity).is_some() {
                warn!(activity = %activity.id, "Duplicate activity id; first one wins for references");
            }
        }
        Self {
            lookup,
            trail: Vec::new(),
            rendered: 0,
            occurrences: HashMap::new(),
        }
    }

    /// Render an activity's inner fragment.
    fn render(&mut self, activity: &Activity, heading_level: u8) -> String {
        let index = self.rendered;
        self.rendered += 1;
        let mut ctx = CompileContext::new(&activity.data, index, activity.id.as_str());
        ctx.heading_level = heading_level;
        let seen = self.occurrences.entry(activity.id.to_string()).or_insert(0);
        ctx.occurrence = *seen;
        *seen += 1;
        if ctx.occurrence > 0 {
            debug!(activity = %activity.id, occurrence = ctx.occurrence, "Rendering shared activity again");
        }

        match ActivityKind::from_type(&activity.activity_type) {
            Some(ActivityKind::TabGroup) => {
                self.trail.push(activity.id.to_string());
                let html = containers::compile_tab_group(&ctx, self);
                self.trail.pop();
                html
            }
            Some(ActivityKind::CardList) => {
                self.trail.push(activity.id.to_string());
                let html = containers::compile_card_list(&ctx, self);
                self.trail.pop();
                html
            }
            Some(kind) => kind.compile(&ctx),
            None => {
                warn!(
                    activity = %activity.id,
                    activity_type = %activity.activity_type,
                    "Unknown activity type"
                );
                registry::unknown_type_fragment(&activity.activity_type)
            }
        }
    }

    fn nested(&mut self, activity: &Activity, heading_level: u8) -> RenderedChild {
        let title = display_title(activity);
        let body = self.render(activity, heading_level);
        RenderedChild {
            html: format!(
                "<div class=\"cf-nested {}\" data-cf-activity=\"{}\" data-cf-type=\"{}\" data-cf-title=\"{}\">{}</div>",
                style_classes(activity),
                escape(activity.id.as_str()),
                escape(&activity.activity_type),
                escape(&title),
                with_disclosure(activity, &title, &body)
            ),
            title,
        }
    }
}

impl ChildResolver for ModuleResolver<'_> {
    fn resolve(&mut self, parent: &CompileContext<'_>, child: &ChildRef) -> Option<RenderedChild> {
        let activity: &Activity = match child {
            ChildRef::Reference(id) => {
                let Some(found) = self.lookup.get(id.as_str()).copied() else {
                    warn!(parent = parent.activity_id, target = %id, "Dangling container reference");
                    return None;
                };
                found
            }
            ChildRef::Inline(activity) => activity,
        };

        let id = activity.id.as_str();
        if self.trail.iter().any(|ancestor| ancestor == id) {
            warn!(parent = parent.activity_id, target = id, "Container cycle detected");
            return Some(RenderedChild {
                title: display_title(activity),
                html: html::flagged(
                    "cycle",
                    &format!("Cycle detected: \"{id}\" already contains this container"),
                ),
            });
        }
        if self.trail.len() >= MAX_NESTING_DEPTH {
            warn!(parent = parent.activity_id, target = id, "Container nesting too deep");
            return Some(RenderedChild {
                title: display_title(activity),
                html: html::flagged("nesting-too-deep", "Containers nested too deep to display"),
            });
        }
        let level = parent.heading_level.saturating_add(1);
        Some(self.nested(activity, level))
    }
}

/// Style modifier classes shared by top-level and nested wrappers.
fn style_classes(activity: &Activity) -> String {
    let style = &activity.style;
    let mut classes = format!(
        "cf-activity--{} cf-pad--{} cf-title--{}",
        style.variant.as_str(),
        style.padding.as_str(),
        style.title_size.as_str()
    );
    if style.border {
        classes.push_str(" cf-activity--bordered");
    }
    classes
}

fn wrapper_classes(activity: &Activity) -> String {
    format!("cf-activity {}", style_classes(activity))
}

/// Wrap a fragment in a `<details>` disclosure when the activity is collapsible.
fn with_disclosure(activity: &Activity, title: &str, fragment: &str) -> String {
    if !activity.behavior.collapsible {
        return fragment.to_string();
    }
    format!(
        "<details class=\"cf-disclosure\"{}><summary>{}</summary>{fragment}</details>",
        if activity.behavior.collapsed_by_default {
            ""
        } else {
            " open"
        },
        escape(title)
    )
}

fn search_text(activity: &Activity, kind: Option<ActivityKind>) -> String {
    let mut text = display_title(activity);
    if let Some(kind) = kind {
        let _ = write!(text, " {} {}", kind.label(), kind.category().label());
    }
    for key in ["description", "prompt", "caption"] {
        if let Some(value) = activity.data.get(key).and_then(serde_json::Value::as_str) {
            text.push(' ');
            text.push_str(value.trim());
        }
    }
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn wrap_top_level(
    activity: &Activity,
    fragment: &str,
    template: Template,
    mode: LayoutMode,
) -> String {
    let kind = ActivityKind::from_type(&activity.activity_type);
    let title = display_title(activity);
    let mut out = String::new();
    let _ = write!(
        out,
        "<section class=\"{}\" id=\"{}\" data-cf-activity=\"{}\" data-cf-type=\"{}\" data-cf-title=\"{}\"",
        wrapper_classes(activity),
        html::dom_id(activity.id.as_str(), ""),
        escape(activity.id.as_str()),
        escape(&activity.activity_type),
        escape(&title)
    );
    if template == Template::ToolkitDashboard {
        let _ = write!(
            out,
            " data-cf-toolkit-item data-cf-category=\"{}\" data-cf-search=\"{}\"",
            kind.map_or("other", |k| k.category().as_str()),
            escape(&search_text(activity, kind))
        );
    }
    let _ = write!(
        out,
        " style=\"{}\">",
        placement_style(activity, mode, explicit_placement(template))
    );

    out.push_str(&with_disclosure(activity, &title, fragment));
    out.push_str("</section>");
    out
}

fn sort_key(activity: &Activity, mode: LayoutMode) -> (u32, u32) {
    match Placement::of(activity, mode) {
        Placement::Cell { row, col, .. } => (row, col),
        Placement::Rect(rect) => (rect.y, rect.x),
    }
}

/// Compile a module into `{html, css, script}`.
///
/// Never fails: every problem renders as a visible fragment and a `warn!`.
#[must_use]
pub fn compile_module(module: &Module, options: &CompileOptions) -> CompiledModule {
    let layout = ComposerLayout::normalize(&module.composer_layout);
    let template = module.resolved_template(&options.course_settings);
    let theme = module.resolved_theme(&options.course_settings);
    let activities = normalize_activities(&module.activities, layout.normalize_options());
    debug!(
        module = %module.id,
        activities = activities.len(),
        template = template.as_str(),
        theme = theme.as_str(),
        mode = layout.mode.as_str(),
        "Compiling module"
    );

    let mut roots = root_indices(&activities);
    roots.sort_by_key(|&i| sort_key(&activities[i], layout.mode));

    let mut resolver = ModuleResolver::new(&activities);
    let items: Vec<PageItem> = roots
        .into_iter()
        .map(|i| {
            let activity = &activities[i];
            resolver.trail.clear();
            let fragment = resolver.render(activity, TOP_LEVEL_HEADING);
            PageItem {
                id: activity.id.to_string(),
                category: ActivityKind::from_type(&activity.activity_type)
                    .map(ActivityKind::category),
                html: wrap_top_level(activity, &fragment, template, layout.mode),
            }
        })
        .collect();

    let frame = PageFrame {
        module_id: &module.id,
        title: &module.title,
        hero: module.hero.as_ref(),
        finlit: module.finlit.as_ref(),
    };

    CompiledModule {
        html: templates::render(template, &frame, &items),
        css: module_css(&layout, template, theme),
        script: runtime_script(),
        title: module.title.clone(),
    }
}

/// Parse a module document and compile it.
///
/// # Errors
///
/// Returns [`crate::RenderError::Module`] if the JSON is not a module.
pub fn compile_module_json(json: &str, options: &CompileOptions) -> RenderResult<CompiledModule> {
    let module = Module::from_json(json)?;
    Ok(compile_module(&module, options))
}
