//! Self-paced widgets: flashcards, drag sort, checklist, path map and
//! hotspot image.
//!
//! Each widget root carries its activity id (`data-cf-flashcards="<id>"`,
//! `data-cf-sort="<id>"`, ...) so the runtime can key its UI state and the
//! progress snapshot by a stable id.

use std::fmt::Write;

use serde_json::{json, Value};

use super::title_issue;
use crate::data;
use crate::html::{self, escape};
use crate::registry::{CompileContext, Issue, Normalized};

fn item_title_body(item: &Value) -> (String, String) {
    match item {
        Value::Object(_) => (data::text(item, "title"), data::text(item, "body")),
        other => (data::item_text(other), String::new()),
    }
}

fn sub_heading(ctx: &CompileContext<'_>) -> u8 {
    (ctx.heading_level + 1).min(6)
}

// ============================================================================
// Flashcards
// ============================================================================

/// Default flashcards data.
#[must_use]
pub fn flashcards_default() -> Value {
    json!({
        "title": "Flashcards",
        "cards": [
            {"front": "Term", "back": "Definition"},
            {"front": "Another term", "back": "Another definition"}
        ]
    })
}

fn cards(data: &Value) -> Vec<(String, String)> {
    data::array(data, "cards")
        .iter()
        .map(|card| (data::text(card, "front"), data::text(card, "back")))
        .collect()
}

/// Compile flashcards.
#[must_use]
pub fn compile_flashcards(ctx: &CompileContext<'_>) -> String {
    let cards = cards(ctx.data);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-flashcards\" data-cf-flashcards=\"{}\">",
        escape(&ctx.state_key())
    );
    if cards.is_empty() {
        out.push_str("<p class=\"cf-empty\">No cards yet.</p>");
    }
    for (i, (front, back)) in cards.iter().enumerate() {
        let _ = write!(
            out,
            "<button type=\"button\" class=\"cf-flashcard\" data-cf-flashcard=\"{i}\" aria-pressed=\"false\"><span class=\"cf-flashcard__front\">{}</span><span class=\"cf-flashcard__back\" hidden>{}</span></button>",
            escape(front),
            escape(back)
        );
    }
    out.push_str("</div><p class=\"cf-hint\">Select a card to flip it.</p>");
    out
}

/// Validate flashcards.
#[must_use]
pub fn validate_flashcards(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "flashcards").into_iter().collect();
    let cards = cards(data);
    if cards.is_empty() {
        issues.push(Issue::warn("flashcards has no cards"));
    }
    for (i, (front, back)) in cards.iter().enumerate() {
        if front.is_empty() || back.is_empty() {
            issues.push(Issue::warn(format!(
                "card {} is missing front or back text",
                i + 1
            )));
        }
    }
    issues
}

// ============================================================================
// Drag sort
// ============================================================================

/// Default drag sort data.
#[must_use]
pub fn drag_sort_default() -> Value {
    json!({
        "title": "Put these in order",
        "prompt": "Drag the steps into the right order.",
        "items": ["First", "Second", "Third"]
    })
}

fn fnv1a(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Deterministic display order for a sort list.
///
/// The permutation depends only on the activity id and item count, so
/// recompiling the same module yields the same scramble. Lists of two or
/// more items never start out solved.
#[must_use]
pub fn scrambled_order(activity_id: &str, len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|i| (fnv1a(&format!("{activity_id}:{i}")), *i));
    if len > 1 && order.iter().enumerate().all(|(pos, i)| pos == *i) {
        order.rotate_left(1);
    }
    order
}

/// Compile a drag sort list.
#[must_use]
pub fn compile_drag_sort(ctx: &CompileContext<'_>) -> String {
    let items = data::strings(ctx.data, "items");
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str(&html::paragraphs(&data::text(ctx.data, "prompt")));
    let _ = write!(
        out,
        "<ol class=\"cf-sort\" data-cf-sort=\"{}\">",
        escape(&ctx.state_key())
    );
    for i in scrambled_order(ctx.activity_id, items.len()) {
        let _ = write!(
            out,
            "<li class=\"cf-sort__item\" draggable=\"true\" data-cf-sort-item=\"{i}\"><span class=\"cf-sort__text\">{}</span><span class=\"cf-sort__controls\"><button type=\"button\" class=\"cf-icon-button\" data-cf-action=\"sort-up\" aria-label=\"Move up\">&#8593;</button><button type=\"button\" class=\"cf-icon-button\" data-cf-action=\"sort-down\" aria-label=\"Move down\">&#8595;</button></span></li>",
            escape(&items[i])
        );
    }
    out.push_str("</ol><div class=\"cf-actions\"><button type=\"button\" class=\"cf-button\" data-cf-action=\"sort-check\">Check order</button></div><p class=\"cf-feedback\" data-cf-sort-feedback aria-live=\"polite\"></p>");
    out
}

/// Validate a drag sort list.
#[must_use]
pub fn validate_drag_sort(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "drag sort").into_iter().collect();
    let items = data::strings(data, "items");
    if items.len() < 2 {
        issues.push(Issue::error("drag sort needs at least 2 items"));
    }
    if items.iter().any(String::is_empty) {
        issues.push(Issue::warn("drag sort has an empty item"));
    }
    issues
}

// ============================================================================
// Checklist
// ============================================================================

/// Local storage key prefix for checklist state.
pub const CHECKLIST_STORAGE_PREFIX: &str = "cf-checklist:";

/// Default checklist data.
#[must_use]
pub fn checklist_default() -> Value {
    json!({
        "title": "Checklist",
        "items": ["Read the lesson", "Complete the worksheet"]
    })
}

/// Compile a checklist.
#[must_use]
pub fn compile_checklist(ctx: &CompileContext<'_>) -> String {
    let title = data::text(ctx.data, "title");
    let items = data::strings(ctx.data, "items");
    let label = if title.is_empty() { "Checklist" } else { title.as_str() };
    let mut out = ctx.heading(&title);
    let _ = write!(
        out,
        "<div class=\"cf-checklist\" data-cf-checklist=\"{}\">",
        escape(ctx.activity_id)
    );
    for (i, item) in items.iter().enumerate() {
        let _ = write!(
            out,
            "<label class=\"cf-check\"><input type=\"checkbox\" data-cf-check=\"{i}\" data-cf-label=\"{}\" data-cf-option=\"{}\"> <span>{}</span></label>",
            escape(label),
            escape(item),
            escape(item)
        );
    }
    let _ = write!(
        out,
        "<p class=\"cf-checklist__progress\" data-cf-checklist-progress aria-live=\"polite\">0 of {} complete</p></div>",
        items.len()
    );
    out
}

/// Validate a checklist.
#[must_use]
pub fn validate_checklist(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "checklist").into_iter().collect();
    let items = data::strings(data, "items");
    if items.is_empty() {
        issues.push(Issue::warn("checklist has no items"));
    }
    if items.iter().any(String::is_empty) {
        issues.push(Issue::warn("checklist has an empty item"));
    }
    issues
}

// ============================================================================
// Path map
// ============================================================================

/// Default path map data.
#[must_use]
pub fn path_map_default() -> Value {
    json!({
        "title": "Your path",
        "steps": [
            {"title": "Start", "body": "Where you begin."},
            {"title": "Finish", "body": "Where you end up."}
        ]
    })
}

/// Compile a path map.
#[must_use]
pub fn compile_path_map(ctx: &CompileContext<'_>) -> String {
    let steps: Vec<_> = data::array(ctx.data, "steps")
        .iter()
        .map(item_title_body)
        .collect();
    let level = sub_heading(ctx);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-path\" data-cf-path=\"{}\"><ol class=\"cf-path__steps\" role=\"tablist\">",
        escape(&ctx.state_key())
    );
    for (i, (title, _)) in steps.iter().enumerate() {
        let _ = write!(
            out,
            "<li><button type=\"button\" role=\"tab\" class=\"cf-path__step\" id=\"{}\" aria-controls=\"{}\" aria-selected=\"{}\" data-cf-path-step=\"{i}\"><span class=\"cf-path__number\">{}</span> {}</button></li>",
            ctx.dom_id(&format!("step{i}")),
            ctx.dom_id(&format!("panel{i}")),
            i == 0,
            i + 1,
            escape(title)
        );
    }
    out.push_str("</ol>");
    for (i, (title, body)) in steps.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"cf-path__panel\" role=\"tabpanel\" id=\"{}\" aria-labelledby=\"{}\" data-cf-path-panel=\"{i}\"{}><h{level}>{}</h{level}>{}</div>",
            ctx.dom_id(&format!("panel{i}")),
            ctx.dom_id(&format!("step{i}")),
            if i == 0 { "" } else { " hidden" },
            escape(title),
            html::paragraphs(body)
        );
    }
    if steps.len() > 1 {
        out.push_str("<div class=\"cf-actions\"><button type=\"button\" class=\"cf-button cf-button--ghost\" data-cf-action=\"path-prev\">Previous</button><button type=\"button\" class=\"cf-button\" data-cf-action=\"path-next\">Next</button></div>");
    }
    out.push_str("</div>");
    out
}

/// Validate a path map.
#[must_use]
pub fn validate_path_map(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "path map").into_iter().collect();
    let steps = data::array(data, "steps");
    if steps.is_empty() {
        issues.push(Issue::warn("path map has no steps"));
    }
    for (i, step) in steps.iter().enumerate() {
        if item_title_body(step).0.is_empty() {
            issues.push(Issue::warn(format!("step {} has no title", i + 1)));
        }
    }
    issues
}

// ============================================================================
// Hotspot
// ============================================================================

/// One hotspot pin, positioned in percent of the image box.
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    /// Horizontal position, 0..=100.
    pub x: f64,
    /// Vertical position, 0..=100.
    pub y: f64,
    /// Pin title.
    pub title: String,
    /// Panel body.
    pub body: String,
}

/// Default hotspot data.
#[must_use]
pub fn hotspot_default() -> Value {
    json!({
        "title": "Explore the image",
        "imageUrl": "https://placehold.co/800x450.png",
        "imageAlt": "Placeholder image",
        "spots": [{"x": 50, "y": 50, "title": "Center", "body": "Describe this point."}]
    })
}

fn clamp_percent(
    value: Option<f64>,
    axis: &str,
    number: usize,
    adjustments: &mut Vec<String>,
) -> f64 {
    let raw = value.unwrap_or(50.0);
    let clamped = raw.clamp(0.0, 100.0);
    if (clamped - raw).abs() > f64::EPSILON {
        adjustments.push(format!("spot {number}: {axis} {raw} clamped to {clamped}"));
    }
    clamped
}

/// Normalize hotspot pins, clamping coordinates into 0..=100 percent.
#[must_use]
pub fn normalize_spots(data: &Value) -> Normalized<Vec<Spot>> {
    let mut adjustments = Vec::new();
    let value = data::array(data, "spots")
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let (title, body) = item_title_body(item);
            Spot {
                x: clamp_percent(data::float(item, "x"), "x", i + 1, &mut adjustments),
                y: clamp_percent(data::float(item, "y"), "y", i + 1, &mut adjustments),
                title,
                body,
            }
        })
        .collect();
    Normalized { value, adjustments }
}

/// Compile a hotspot image.
#[must_use]
pub fn compile_hotspot(ctx: &CompileContext<'_>) -> String {
    let spots = normalize_spots(ctx.data).value;
    let level = sub_heading(ctx);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    let _ = write!(
        out,
        "<div class=\"cf-hotspot\" data-cf-hotspot=\"{}\">",
        escape(&ctx.state_key())
    );
    let image = data::text(ctx.data, "imageUrl");
    let has_image = match html::safe_url(&image) {
        Some(src) => {
            let _ = write!(
                out,
                "<div class=\"cf-hotspot__stage\"><img src=\"{}\" alt=\"{}\">",
                escape(src),
                escape(&data::text(ctx.data, "imageAlt"))
            );
            for (i, spot) in spots.iter().enumerate() {
                let _ = write!(
                    out,
                    "<button type=\"button\" class=\"cf-hotspot__pin\" style=\"left:{}%;top:{}%\" aria-label=\"{}\" aria-expanded=\"false\" aria-controls=\"{}\" data-cf-hotspot-pin=\"{i}\">{}</button>",
                    spot.x,
                    spot.y,
                    escape(&spot.title),
                    ctx.dom_id(&format!("spot{i}")),
                    i + 1
                );
            }
            out.push_str("</div>");
            true
        }
        None => {
            out.push_str(&html::flagged("hotspot-missing-image", "Hotspot missing image"));
            false
        }
    };
    for (i, spot) in spots.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"cf-hotspot__panel\" id=\"{}\" data-cf-hotspot-panel=\"{i}\"{}><h{level}>{}</h{level}>{}</div>",
            ctx.dom_id(&format!("spot{i}")),
            if has_image { " hidden" } else { "" },
            escape(&spot.title),
            html::paragraphs(&spot.body)
        );
    }
    out.push_str("</div>");
    out
}

/// Validate a hotspot image.
#[must_use]
pub fn validate_hotspot(data: &Value) -> Vec<Issue> {
    let normalized = normalize_spots(data);
    let mut issues: Vec<Issue> = title_issue(data, "hotspot").into_iter().collect();
    let image = data::text(data, "imageUrl");
    if image.is_empty() {
        issues.push(Issue::error("hotspot has no image"));
    } else if html::safe_url(&image).is_none() {
        issues.push(Issue::error("hotspot image URL is not allowed"));
    } else if data::text(data, "imageAlt").is_empty() {
        issues.push(Issue::warn("hotspot image has no alt text"));
    }
    if normalized.value.is_empty() {
        issues.push(Issue::warn("hotspot has no spots"));
    }
    issues.extend(normalized.warnings());
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(data: &Value) -> CompileContext<'_> {
        CompileContext::new(data, 0, "w1")
    }

    #[test]
    fn test_flashcards_start_on_front() {
        let html = compile_flashcards(&ctx(&flashcards_default()));
        assert!(html.contains("data-cf-flashcards=\"w1\""));
        assert!(html.contains("data-cf-flashcard=\"1\" aria-pressed=\"false\""));
        assert!(html.contains("<span class=\"cf-flashcard__back\" hidden>Definition</span>"));
    }

    #[test]
    fn test_flashcards_missing_back_warns() {
        let data = json!({"title": "F", "cards": [{"front": "A"}]});
        assert_eq!(
            validate_flashcards(&data),
            vec![Issue::warn("card 1 is missing front or back text")]
        );
    }

    #[test]
    fn test_scrambled_order_is_deterministic_permutation() {
        let first = scrambled_order("sort-1", 5);
        assert_eq!(first, scrambled_order("sort-1", 5));
        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        assert_ne!(first, vec![0, 1, 2, 3, 4]);
        assert_eq!(scrambled_order("x", 1), vec![0]);
        assert!(scrambled_order("x", 0).is_empty());
    }

    #[test]
    fn test_drag_sort_items_keep_original_index() {
        let html = compile_drag_sort(&ctx(&drag_sort_default()));
        for i in 0..3 {
            assert!(html.contains(&format!("data-cf-sort-item=\"{i}\"")));
        }
        assert!(html.contains("data-cf-action=\"sort-check\""));
    }

    #[test]
    fn test_drag_sort_needs_two_items() {
        let issues = validate_drag_sort(&json!({"title": "S", "items": ["only"]}));
        assert_eq!(issues, vec![Issue::error("drag sort needs at least 2 items")]);
    }

    #[test]
    fn test_checklist_progress_text() {
        let html = compile_checklist(&ctx(&checklist_default()));
        assert!(html.contains("data-cf-checklist=\"w1\""));
        assert!(html.contains("0 of 2 complete"));
        assert!(html.contains("data-cf-option=\"Read the lesson\""));
    }

    #[test]
    fn test_path_map_first_step_active() {
        let html = compile_path_map(&ctx(&path_map_default()));
        assert!(html.contains("aria-selected=\"true\" data-cf-path-step=\"0\""));
        assert!(html.contains("data-cf-path-panel=\"1\" hidden"));
        assert!(html.contains("data-cf-action=\"path-next\""));
    }

    #[test]
    fn test_hotspot_coordinates_clamped() {
        let data = json!({"imageUrl": "map.png", "spots": [{"x": 120, "y": -5, "title": "Edge"}]});
        let normalized = normalize_spots(&data);
        assert!((normalized.value[0].x - 100.0).abs() < f64::EPSILON);
        assert!(normalized.value[0].y.abs() < f64::EPSILON);
        assert_eq!(normalized.adjustments.len(), 2);
        let html = compile_hotspot(&ctx(&data));
        assert!(html.contains("left:100%;top:0%"));
    }

    #[test]
    fn test_hotspot_without_image() {
        let data = json!({"title": "H", "spots": [{"title": "A"}]});
        assert!(validate_hotspot(&data).contains(&Issue::error("hotspot has no image")));
        let html = compile_hotspot(&ctx(&data));
        assert!(html.contains("Hotspot missing image"));
        assert!(!html.contains("data-cf-hotspot-pin"));
    }
}
