//! Presentation templates wrapped around compiled activity wrappers.
//!
//! Every template emits one module root carrying `data-cf-module` and
//! `data-cf-module-title`; the runtime scopes snapshots and reports to it.

use std::collections::HashSet;
use std::fmt::Write;

use composer_core::{FinlitSettings, Hero, Template};

use crate::html::{self, escape};
use crate::registry::Category;
use crate::scan::{scan_headings, TocEntry};

/// One compiled top-level activity, already wrapped and positioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    /// Activity id.
    pub id: String,
    /// Registry category, `None` for unknown types.
    pub category: Option<Category>,
    /// Wrapper HTML.
    pub html: String,
}

/// Everything a template needs besides the activities.
#[derive(Debug, Clone, Copy)]
pub struct PageFrame<'a> {
    /// Module id; blank ids fall back to `module`.
    pub module_id: &'a str,
    /// Module title.
    pub title: &'a str,
    /// Hero block (finlit only).
    pub hero: Option<&'a Hero>,
    /// Tab grouping (finlit only).
    pub finlit: Option<&'a FinlitSettings>,
}

impl PageFrame<'_> {
    fn root_id(&self) -> &str {
        let id = self.module_id.trim();
        if id.is_empty() {
            "module"
        } else {
            id
        }
    }

    fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Module"
        } else {
            title
        }
    }

    fn open(&self, template: Template, out: &mut String) {
        let _ = write!(
            out,
            "<div class=\"cf-module cf-template--{}\" data-cf-module=\"{}\" data-cf-module-title=\"{}\" data-cf-template=\"{}\">",
            template.as_str(),
            escape(self.root_id()),
            escape(self.display_title()),
            template.as_str()
        );
    }

    fn header(&self, out: &mut String) {
        let _ = write!(
            out,
            "<header class=\"cf-module__header\"><h2 class=\"cf-module__title\" id=\"{}\">{}</h2></header>",
            html::dom_id(self.root_id(), "title"),
            escape(self.display_title())
        );
    }
}

fn grid(items: &[&PageItem], out: &mut String) {
    out.push_str("<div class=\"cf-grid\">");
    for item in items {
        out.push_str(&item.html);
    }
    out.push_str("</div>");
}

/// Render the page for a template.
#[must_use]
pub fn render(template: Template, frame: &PageFrame<'_>, items: &[PageItem]) -> String {
    match template {
        Template::Deck => render_deck(frame, items),
        Template::Finlit => render_finlit(frame, items),
        Template::Coursebook => render_coursebook(frame, items),
        Template::ToolkitDashboard => render_toolkit(frame, items),
    }
}

/// Plain grid.
#[must_use]
pub fn render_deck(frame: &PageFrame<'_>, items: &[PageItem]) -> String {
    let mut out = String::new();
    frame.open(Template::Deck, &mut out);
    frame.header(&mut out);
    grid(&items.iter().collect::<Vec<_>>(), &mut out);
    out.push_str("</div>");
    out
}

fn hero_block(frame: &PageFrame<'_>, out: &mut String) {
    let hero = frame.hero.cloned().unwrap_or_default();
    let title = if hero.title.trim().is_empty() {
        frame.display_title().to_string()
    } else {
        hero.title.trim().to_string()
    };
    let _ = write!(
        out,
        "<section class=\"cf-hero\"><div class=\"cf-hero__text\"><h2 class=\"cf-hero__title\" id=\"{}\">{}</h2>",
        html::dom_id(frame.root_id(), "title"),
        escape(&title)
    );
    if !hero.subtitle.trim().is_empty() {
        let _ = write!(
            out,
            "<p class=\"cf-hero__subtitle\">{}</p>",
            escape(hero.subtitle.trim())
        );
    }
    out.push_str("</div>");
    if let Some(video) = html::http_url(&hero.video_url) {
        let _ = write!(
            out,
            "<div class=\"cf-hero__media\"><iframe src=\"{}\" title=\"{}\" loading=\"lazy\" allowfullscreen></iframe></div>",
            escape(video),
            escape(&title)
        );
    } else if let Some(image) = html::safe_url(&hero.image_url) {
        let _ = write!(
            out,
            "<div class=\"cf-hero__media\"><img src=\"{}\" alt=\"{}\"></div>",
            escape(image),
            escape(&hero.image_alt)
        );
    }
    out.push_str("</section>");
}

/// Tab label and member items for the finlit template.
///
/// Configured tabs take their activities in configured order; activities no
/// tab claims land in a trailing "More" tab, or in a single "Lesson" tab
/// when nothing is configured.
#[must_use]
pub fn finlit_groups<'a>(
    finlit: Option<&FinlitSettings>,
    items: &'a [PageItem],
) -> Vec<(String, Vec<&'a PageItem>)> {
    let tabs = finlit.map(|f| f.tabs.as_slice()).unwrap_or_default();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();
    for (i, tab) in tabs.iter().enumerate() {
        let members: Vec<&PageItem> = tab
            .activity_ids
            .iter()
            .filter_map(|id| items.iter().find(|item| item.id == id.as_str()))
            .filter(|item| claimed.insert(item.id.as_str()))
            .collect();
        let label = if tab.label.trim().is_empty() {
            format!("Tab {}", i + 1)
        } else {
            tab.label.trim().to_string()
        };
        groups.push((label, members));
    }
    let rest: Vec<&PageItem> = items
        .iter()
        .filter(|item| !claimed.contains(item.id.as_str()))
        .collect();
    if groups.is_empty() {
        groups.push(("Lesson".to_string(), rest));
    } else if !rest.is_empty() {
        groups.push(("More".to_string(), rest));
    }
    groups
}

/// Hero block over module-level tabs.
#[must_use]
pub fn render_finlit(frame: &PageFrame<'_>, items: &[PageItem]) -> String {
    let mut out = String::new();
    frame.open(Template::Finlit, &mut out);
    hero_block(frame, &mut out);

    let groups = finlit_groups(frame.finlit, items);
    let tabs_id = html::dom_id(frame.root_id(), "tabs");
    let _ = write!(
        out,
        "<div class=\"cf-tabs cf-finlit__tabs\" data-cf-tabs=\"{tabs_id}\"><div class=\"cf-tabs__list\" role=\"tablist\">"
    );
    for (i, (label, _)) in groups.iter().enumerate() {
        let _ = write!(
            out,
            "<button type=\"button\" role=\"tab\" class=\"cf-tabs__tab\" id=\"{tabs_id}-tab{i}\" aria-controls=\"{tabs_id}-panel{i}\" aria-selected=\"{}\" tabindex=\"{}\" data-cf-tab=\"{i}\">{}</button>",
            i == 0,
            if i == 0 { 0 } else { -1 },
            escape(label)
        );
    }
    out.push_str("</div>");
    for (i, (_, members)) in groups.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"cf-tabs__panel\" role=\"tabpanel\" id=\"{tabs_id}-panel{i}\" aria-labelledby=\"{tabs_id}-tab{i}\" data-cf-tab-panel=\"{i}\"{}>",
            if i == 0 { "" } else { " hidden" }
        );
        if members.is_empty() {
            out.push_str("<div class=\"cf-placeholder\">Nothing here yet.</div>");
        } else {
            grid(members, &mut out);
        }
        out.push_str("</div>");
    }
    out.push_str("</div></div>");
    out
}

fn toc(entries: &[TocEntry], out: &mut String) {
    out.push_str("<nav class=\"cf-toc\" aria-label=\"Contents\"><p class=\"cf-toc__heading\"><strong>Contents</strong></p>");
    if entries.is_empty() {
        out.push_str("<p class=\"cf-empty\">No sections yet.</p>");
    } else {
        out.push_str("<ol>");
        for entry in entries {
            let _ = write!(
                out,
                "<li class=\"cf-toc__item cf-toc__item--{}\"><a href=\"#{}\">{}</a></li>",
                entry.level,
                escape(&entry.id),
                escape(&entry.text)
            );
        }
        out.push_str("</ol>");
    }
    out.push_str("</nav>");
}

/// Two-column book with a contents list built from rendered headings.
#[must_use]
pub fn render_coursebook(frame: &PageFrame<'_>, items: &[PageItem]) -> String {
    let mut body = String::new();
    grid(&items.iter().collect::<Vec<_>>(), &mut body);
    let entries = scan_headings(&body);

    let mut out = String::new();
    frame.open(Template::Coursebook, &mut out);
    frame.header(&mut out);
    out.push_str("<div class=\"cf-coursebook\">");
    toc(&entries, &mut out);
    let _ = write!(out, "<main class=\"cf-coursebook__body\">{body}</main></div></div>");
    out
}

/// Searchable card grid with category filter chips.
#[must_use]
pub fn render_toolkit(frame: &PageFrame<'_>, items: &[PageItem]) -> String {
    let mut out = String::new();
    frame.open(Template::ToolkitDashboard, &mut out);
    frame.header(&mut out);
    let _ = write!(
        out,
        "<div class=\"cf-toolkit__bar\"><input type=\"search\" class=\"cf-toolkit__search\" id=\"{}\" placeholder=\"Search activities\" aria-label=\"Search activities\" data-cf-toolkit-search data-cf-no-persist><div class=\"cf-toolkit__filters\" role=\"group\" aria-label=\"Filter by category\"><button type=\"button\" class=\"cf-chip\" aria-pressed=\"true\" data-cf-toolkit-filter=\"all\">All</button>",
        html::dom_id(frame.root_id(), "search")
    );
    for category in Category::ALL {
        if items.iter().any(|item| item.category == Some(category)) {
            let _ = write!(
                out,
                "<button type=\"button\" class=\"cf-chip\" aria-pressed=\"false\" data-cf-toolkit-filter=\"{}\">{}</button>",
                category.as_str(),
                category.label()
            );
        }
    }
    out.push_str("</div></div>");
    grid(&items.iter().collect::<Vec<_>>(), &mut out);
    out.push_str("<p class=\"cf-empty\" data-cf-toolkit-empty hidden>No activities match your search.</p></div>");
    out
}
