//! Container kinds: `tab_group` and `card_list`.
//!
//! Containers embed other activities either by id reference or inline. The
//! container itself only renders chrome; child fragments come from a
//! [`ChildResolver`], which the module compiler implements with an id lookup
//! and a cycle guard.

use std::fmt::Write;

use composer_core::{Activity, ActivityId};
use serde_json::{json, Value};
use tracing::debug;

use super::title_issue;
use crate::data;
use crate::html::escape;
use crate::registry::{validate_activity, CompileContext, Issue};

/// Where a container entry's content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildRef {
    /// Another activity in the module, by id.
    Reference(ActivityId),
    /// An activity authored inside the container.
    Inline(Box<Activity>),
}

/// One tab or card.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerEntry {
    /// Tab label or card title; may be blank.
    pub label: String,
    /// Card description (always blank for tabs).
    pub description: String,
    /// Content source, if the entry has one.
    pub child: Option<ChildRef>,
    /// Whether an inline activity was present but unreadable.
    pub invalid_inline: bool,
}

/// A child fragment produced by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChild {
    /// Child title, used when the entry has no label.
    pub title: String,
    /// Child HTML.
    pub html: String,
}

/// Renders container children.
pub trait ChildResolver {
    /// Render `child` for the container compiled under `parent`.
    ///
    /// `None` means the child cannot be rendered here (for example a dangling
    /// reference) and the container shows a placeholder.
    fn resolve(&mut self, parent: &CompileContext<'_>, child: &ChildRef) -> Option<RenderedChild>;
}

/// Resolver with no module to look references up in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl ChildResolver for Unresolved {
    fn resolve(&mut self, _parent: &CompileContext<'_>, _child: &ChildRef) -> Option<RenderedChild> {
        None
    }
}

/// Deterministic id for an inline child authored without one.
#[must_use]
pub fn inline_child_id(parent_id: &str, position: usize) -> ActivityId {
    ActivityId::from_string(format!("{parent_id}-inline-{}", position + 1))
}

fn read_entry(parent_id: &str, position: usize, item: &Value, label_key: &str) -> ContainerEntry {
    let mut entry = ContainerEntry {
        label: data::text(item, label_key),
        description: data::text(item, "description"),
        child: None,
        invalid_inline: false,
    };
    if let Some(raw) = item.get("activity").filter(|v| !v.is_null()) {
        match serde_json::from_value::<Activity>(raw.clone()) {
            Ok(mut activity) => {
                if activity.id.is_empty() {
                    activity.id = inline_child_id(parent_id, position);
                }
                entry.child = Some(ChildRef::Inline(Box::new(activity)));
                return entry;
            }
            Err(err) => {
                debug!(parent = parent_id, position, error = %err, "Unreadable inline activity");
                entry.invalid_inline = true;
            }
        }
    }
    let target = data::text(item, "activityId");
    if !target.is_empty() {
        entry.child = Some(ChildRef::Reference(ActivityId::from_string(target)));
    }
    entry
}

/// Read container entries from `tabs`/`cards` or the legacy `activityIds`.
#[must_use]
pub fn container_entries(data: &Value, parent_id: &str, list_key: &str) -> Vec<ContainerEntry> {
    let label_key = if list_key == "tabs" { "label" } else { "title" };
    if data.get(list_key).is_some() {
        return data::array(data, list_key)
            .iter()
            .enumerate()
            .map(|(i, item)| read_entry(parent_id, i, item, label_key))
            .collect();
    }
    data::strings(data, "activityIds")
        .into_iter()
        .map(|id| ContainerEntry {
            label: String::new(),
            description: String::new(),
            child: (!id.is_empty()).then(|| ChildRef::Reference(ActivityId::from_string(id))),
            invalid_inline: false,
        })
        .collect()
}

/// Entries for a container activity type; empty for non-containers.
#[must_use]
pub fn entries_for(activity_type: &str, data: &Value, parent_id: &str) -> Vec<ContainerEntry> {
    match activity_type {
        "tab_group" => container_entries(data, parent_id, "tabs"),
        "card_list" => container_entries(data, parent_id, "cards"),
        _ => Vec::new(),
    }
}

fn render_entries(
    ctx: &CompileContext<'_>,
    entries: &[ContainerEntry],
    resolver: &mut dyn ChildResolver,
) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|entry| {
            let rendered = entry
                .child
                .as_ref()
                .and_then(|child| resolver.resolve(ctx, child));
            let title = rendered.as_ref().map(|r| r.title.clone()).unwrap_or_default();
            let body = match (rendered, &entry.child) {
                (Some(child), _) => child.html,
                (None, Some(ChildRef::Reference(id))) => format!(
                    "<div class=\"cf-placeholder\" data-cf-missing=\"{}\">Linked activity is not available.</div>",
                    escape(id.as_str())
                ),
                (None, _) => {
                    "<div class=\"cf-placeholder\">Nothing here yet.</div>".to_string()
                }
            };
            let label = if entry.label.is_empty() { title } else { entry.label.clone() };
            (label, body)
        })
        .collect()
}

// ============================================================================
// Tab group
// ============================================================================

/// Default tab group data.
#[must_use]
pub fn tab_group_default() -> Value {
    json!({
        "title": "Tabs",
        "tabs": [
            {"label": "Overview", "activity": {"type": "content_block", "data": {"title": "", "body": "First tab."}}},
            {"label": "Details", "activity": {"type": "content_block", "data": {"title": "", "body": "Second tab."}}}
        ]
    })
}

/// Compile a tab group.
#[must_use]
pub fn compile_tab_group(ctx: &CompileContext<'_>, resolver: &mut dyn ChildResolver) -> String {
    let entries = container_entries(ctx.data, ctx.activity_id, "tabs");
    let panels = render_entries(ctx, &entries, resolver);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-tabs\" data-cf-tabs=\"{}\">",
        escape(&ctx.state_key())
    );
    if panels.is_empty() {
        out.push_str("<div class=\"cf-placeholder\">No tabs yet.</div></div>");
        return out;
    }
    out.push_str("<div class=\"cf-tabs__list\" role=\"tablist\">");
    for (i, (label, _)) in panels.iter().enumerate() {
        let shown = if label.is_empty() {
            format!("Tab {}", i + 1)
        } else {
            label.clone()
        };
        let _ = write!(
            out,
            "<button type=\"button\" role=\"tab\" class=\"cf-tabs__tab\" id=\"{}\" aria-controls=\"{}\" aria-selected=\"{}\" tabindex=\"{}\" data-cf-tab=\"{i}\">{}</button>",
            ctx.dom_id(&format!("tab{i}")),
            ctx.dom_id(&format!("tabpanel{i}")),
            i == 0,
            if i == 0 { 0 } else { -1 },
            escape(&shown)
        );
    }
    out.push_str("</div>");
    for (i, (_, body)) in panels.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"cf-tabs__panel\" role=\"tabpanel\" id=\"{}\" aria-labelledby=\"{}\" data-cf-tab-panel=\"{i}\"{}>{body}</div>",
            ctx.dom_id(&format!("tabpanel{i}")),
            ctx.dom_id(&format!("tab{i}")),
            if i == 0 { "" } else { " hidden" }
        );
    }
    out.push_str("</div>");
    out
}

fn validate_entries(data: &Value, list_key: &str, noun: &str, container: &str) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, container).into_iter().collect();
    let entries = container_entries(data, "", list_key);
    if entries.is_empty() {
        issues.push(Issue::warn(format!("{container} has no {noun}s")));
    }
    for (i, entry) in entries.iter().enumerate() {
        let number = i + 1;
        if entry.invalid_inline {
            issues.push(Issue::warn(format!(
                "{noun} {number} has an unreadable inline activity"
            )));
        }
        match &entry.child {
            None => issues.push(Issue::warn(format!("{noun} has no target activity"))),
            Some(ChildRef::Inline(activity)) => {
                issues.extend(validate_activity(activity).into_iter().map(|issue| Issue {
                    level: issue.level,
                    message: format!("{noun} {number}: {}", issue.message),
                }));
            }
            Some(ChildRef::Reference(_)) => {}
        }
    }
    issues
}

/// Validate a tab group.
#[must_use]
pub fn validate_tab_group(data: &Value) -> Vec<Issue> {
    validate_entries(data, "tabs", "tab", "tab group")
}

// ============================================================================
// Card list
// ============================================================================

/// Default card list data.
#[must_use]
pub fn card_list_default() -> Value {
    json!({
        "title": "Cards",
        "cards": [
            {"title": "First card", "description": "Open to read more.", "activity": {"type": "content_block", "data": {"title": "", "body": "Card content."}}}
        ]
    })
}

/// Compile a card list.
#[must_use]
pub fn compile_card_list(ctx: &CompileContext<'_>, resolver: &mut dyn ChildResolver) -> String {
    let entries = container_entries(ctx.data, ctx.activity_id, "cards");
    let cards = render_entries(ctx, &entries, resolver);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-cards\" data-cf-cards=\"{}\">",
        escape(&ctx.state_key())
    );
    if cards.is_empty() {
        out.push_str("<div class=\"cf-placeholder\">No cards yet.</div>");
    }
    for (i, ((title, body), entry)) in cards.iter().zip(&entries).enumerate() {
        let shown = if title.is_empty() {
            format!("Card {}", i + 1)
        } else {
            title.clone()
        };
        let _ = write!(
            out,
            "<details class=\"cf-card\" data-cf-card=\"{i}\"><summary class=\"cf-card__summary\"><span class=\"cf-card__title\">{}</span>",
            escape(&shown)
        );
        if !entry.description.is_empty() {
            let _ = write!(
                out,
                "<span class=\"cf-card__description\">{}</span>",
                escape(&entry.description)
            );
        }
        let _ = write!(out, "</summary><div class=\"cf-card__body\">{body}</div></details>");
    }
    out.push_str("</div>");
    out
}

/// Validate a card list.
#[must_use]
pub fn validate_card_list(data: &Value) -> Vec<Issue> {
    validate_entries(data, "cards", "card", "card list")
}
