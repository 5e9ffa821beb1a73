//! Small scanners over compiled module HTML.
//!
//! These read markup the compiler produced itself, so they only need to
//! understand well-formed tags with double-quoted attributes. They are not
//! general HTML parsers.

use composer_core::snapshot::is_persistable;
use composer_core::FormControl;
use serde::Serialize;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 8] = ["area", "br", "hr", "img", "input", "link", "meta", "source"];

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Heading element id.
    pub id: String,
    /// Heading text, tags stripped and entities decoded.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    name: String,
    attrs: Vec<(String, Option<String>)>,
    closing: bool,
    self_closing: bool,
    /// Byte offset just past the closing `>`.
    end: usize,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    fn has(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Decode the entities the compiler emits.
#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn parse_tag(html: &str, start: usize) -> Option<Tag> {
    let bytes = html.as_bytes();
    let mut pos = start + 1;
    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }
    let name_start = pos;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = html[name_start..pos].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match bytes.get(pos) {
            None => return None,
            Some(b'>') => {
                pos += 1;
                break;
            }
            Some(b'/') => {
                self_closing = true;
                pos += 1;
                continue;
            }
            Some(_) => {}
        }
        let key_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        if pos == key_start {
            pos += 1;
            continue;
        }
        let key = html[key_start..pos].to_ascii_lowercase();
        if bytes.get(pos) == Some(&b'=') && bytes.get(pos + 1) == Some(&b'"') {
            let value_start = pos + 2;
            let value_end = html[value_start..].find('"')? + value_start;
            attrs.push((key, Some(unescape(&html[value_start..value_end]))));
            pos = value_end + 1;
        } else {
            attrs.push((key, None));
        }
    }

    Some(Tag {
        name,
        attrs,
        closing,
        self_closing,
        end: pos,
    })
}

/// Iterate tags in document order.
fn tags(html: &str) -> impl Iterator<Item = Tag> + '_ {
    let mut cursor = 0;
    std::iter::from_fn(move || loop {
        let offset = html[cursor..].find('<')?;
        let start = cursor + offset;
        match parse_tag(html, start) {
            Some(tag) => {
                cursor = tag.end;
                return Some(tag);
            }
            None => cursor = start + 1,
        }
    })
}

fn strip_tags(fragment: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    unescape(text.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
}

/// Collect `<h2>`/`<h3>` headings that carry an `id`, in document order.
#[must_use]
pub fn scan_headings(html: &str) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    for tag in tags(html) {
        if tag.closing {
            continue;
        }
        let level = match tag.name.as_str() {
            "h2" => 2,
            "h3" => 3,
            _ => continue,
        };
        let Some(id) = tag.attr("id").filter(|id| !id.is_empty()) else {
            continue;
        };
        let close = format!("</{}>", tag.name);
        let Some(len) = html[tag.end..].find(&close) else {
            continue;
        };
        let text = strip_tags(&html[tag.end..tag.end + len]);
        if !text.is_empty() {
            entries.push(TocEntry {
                level,
                id: id.to_string(),
                text,
            });
        }
    }
    entries
}

struct OpenElement {
    name: String,
    activity: Option<(String, String)>,
    correct_index: Option<String>,
}

fn control_type(tag: &Tag) -> String {
    match tag.name.as_str() {
        "textarea" => "textarea".to_string(),
        "select" => String::from(if tag.has("multiple") {
            "select-multiple"
        } else {
            "select-one"
        }),
        _ => tag
            .attr("type")
            .map(str::to_ascii_lowercase)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string()),
    }
}

fn select_value(html: &str, from: usize) -> String {
    let end = html[from..].find("</select>").map_or(html.len(), |i| from + i);
    let mut first = None;
    for tag in tags(&html[from..end]) {
        if tag.closing || tag.name != "option" {
            continue;
        }
        let value = tag.attr("value").unwrap_or("").to_string();
        if tag.has("selected") {
            return value;
        }
        first.get_or_insert(value);
    }
    first.unwrap_or_default()
}

/// Persistable controls in the order the runtime's snapshot walk visits them.
///
/// Each control records its innermost owning activity (`data-cf-activity`
/// and `data-cf-title` of the closest wrapper) and its `data-cf-label` and
/// `data-cf-option` annotations.
#[must_use]
pub fn scan_persistable_controls(html: &str) -> Vec<FormControl> {
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut controls = Vec::new();

    for tag in tags(html) {
        if tag.closing {
            if let Some(pos) = stack.iter().rposition(|open| open.name == tag.name) {
                stack.truncate(pos);
            }
            continue;
        }

        if matches!(tag.name.as_str(), "input" | "textarea" | "select") {
            let kind = control_type(&tag);
            if is_persistable(&tag.name, &kind) && !tag.has("data-cf-no-persist") {
                let owner = stack.iter().rev().find_map(|open| open.activity.clone());
                let correct = if kind == "radio" {
                    stack
                        .iter()
                        .rev()
                        .find_map(|open| open.correct_index.as_deref())
                        .map(|index| tag.attr("value") == Some(index))
                } else {
                    None
                };
                let value = match tag.name.as_str() {
                    "textarea" => {
                        let end = html[tag.end..]
                            .find("</textarea>")
                            .map_or(tag.end, |i| tag.end + i);
                        unescape(&html[tag.end..end])
                    }
                    "select" => select_value(html, tag.end),
                    _ => tag.attr("value").unwrap_or("").to_string(),
                };
                controls.push(FormControl {
                    tag: tag.name.clone(),
                    control_type: kind,
                    value,
                    checked: tag.has("checked"),
                    activity_id: owner.as_ref().map(|(id, _)| id.clone()),
                    section: owner
                        .map(|(_, title)| title)
                        .filter(|title| !title.is_empty()),
                    label: tag.attr("data-cf-label").map(str::to_string),
                    option: tag.attr("data-cf-option").map(str::to_string),
                    correct,
                });
            }
        }

        if !tag.is_void() {
            let activity = tag.attr("data-cf-activity").map(|id| {
                (
                    id.to_string(),
                    tag.attr("data-cf-title").unwrap_or("").to_string(),
                )
            });
            let correct_index = tag.attr("data-cf-correct-index").map(str::to_string);
            stack.push(OpenElement {
                name: tag.name,
                activity,
                correct_index,
            });
        }
    }
    controls
}
