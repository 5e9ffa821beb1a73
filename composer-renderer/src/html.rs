//! HTML building helpers shared by every activity kind.

use std::fmt::Write;

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Turn plain text into `<p>` paragraphs, splitting on blank lines and
/// keeping single newlines as `<br>`.
#[must_use]
pub fn paragraphs(text: &str) -> String {
    let mut out = String::new();
    let normalized = text.replace("\r\n", "\n");
    for block in normalized.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let lines: Vec<String> = block.lines().map(|line| escape(line.trim())).collect();
        let _ = write!(out, "<p>{}</p>", lines.join("<br>"));
    }
    out
}

/// Accept only URLs that cannot execute script: `http(s)`, protocol
/// relative, `mailto:`, in-page/relative paths and `data:image/`.
#[must_use]
pub fn safe_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    let has_scheme = lower
        .split_once(':')
        .is_some_and(|(scheme, _)| !scheme.contains('/') && !scheme.contains('?') && !scheme.contains('#'));
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("data:image/")
        || !has_scheme;
    allowed.then_some(trimmed)
}

/// Accept only absolute `http(s)` URLs (used for iframes).
#[must_use]
pub fn http_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(trimmed)
}

/// Stable DOM id derived from an activity id and a suffix.
#[must_use]
pub fn dom_id(activity_id: &str, suffix: &str) -> String {
    let mut id = String::from("cf-");
    for ch in activity_id.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            id.push(ch);
        } else {
            id.push('_');
        }
    }
    if !suffix.is_empty() {
        id.push('-');
        id.push_str(suffix);
    }
    id
}

/// Activity title heading with a stable id, or nothing for a blank title.
#[must_use]
pub fn heading(level: u8, activity_id: &str, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return String::new();
    }
    let level = level.clamp(2, 6);
    format!(
        "<h{level} class=\"cf-activity__title\" id=\"{}\">{}</h{level}>",
        dom_id(activity_id, "title"),
        escape(title)
    )
}

/// Visibly flagged fallback fragment for a recoverable problem.
#[must_use]
pub fn flagged(kind: &str, message: &str) -> String {
    format!(
        "<div class=\"cf-flag cf-flag--{}\" role=\"note\" data-cf-flag=\"{}\"><strong>{}</strong></div>",
        escape(kind),
        escape(kind),
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(
            escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        assert_eq!(
            paragraphs("First line\nsecond\n\n\nThird <b>"),
            "<p>First line<br>second</p><p>Third &lt;b&gt;</p>"
        );
        assert_eq!(paragraphs("   "), "");
    }

    #[test]
    fn test_safe_url_rejects_script_schemes() {
        assert_eq!(safe_url(" https://example.com/a "), Some("https://example.com/a"));
        assert_eq!(safe_url("files/guide.pdf"), Some("files/guide.pdf"));
        assert_eq!(safe_url("#section"), Some("#section"));
        assert!(safe_url("javascript:alert(1)").is_none());
        assert!(safe_url("JavaScript:alert(1)").is_none());
        assert!(safe_url("data:text/html,hi").is_none());
        assert!(safe_url("").is_none());
    }

    #[test]
    fn test_http_url_requires_scheme() {
        assert!(http_url("https://video.example/embed/1").is_some());
        assert!(http_url("//video.example").is_none());
    }

    #[test]
    fn test_dom_id_sanitizes() {
        assert_eq!(dom_id("a b/c", "title"), "cf-a_b_c-title");
        assert_eq!(dom_id("x", ""), "cf-x");
    }

    #[test]
    fn test_heading_blank_title_is_empty() {
        assert_eq!(heading(3, "a", "  "), "");
        assert_eq!(
            heading(3, "a", "Plan"),
            "<h3 class=\"cf-activity__title\" id=\"cf-a-title\">Plan</h3>"
        );
    }
}
