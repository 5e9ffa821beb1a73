//! Content kinds: `content_block`, `embed` and `resource`.

use std::fmt::Write;

use serde_json::{json, Value};

use super::title_issue;
use crate::data;
use crate::html::{self, escape};
use crate::registry::{CompileContext, Issue};

/// Default iframe height in pixels.
pub const DEFAULT_EMBED_HEIGHT: i64 = 360;

/// Embed height bounds in pixels.
pub const EMBED_HEIGHT_RANGE: (i64, i64) = (120, 1200);

/// Default content block data.
#[must_use]
pub fn content_block_default() -> Value {
    json!({
        "title": "New section",
        "body": "Write the lesson content here.",
        "imageUrl": "",
        "imageAlt": ""
    })
}

/// Compile a content block.
#[must_use]
pub fn compile_content_block(ctx: &CompileContext<'_>) -> String {
    let data = ctx.data;
    let mut out = ctx.heading(&data::text(data, "title"));
    out.push_str("<div class=\"cf-content\">");
    if let Some(url) = html::safe_url(&data::text(data, "imageUrl")) {
        let _ = write!(
            out,
            "<figure class=\"cf-content__media\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></figure>",
            escape(url),
            escape(&data::text(data, "imageAlt"))
        );
    }
    out.push_str(&html::paragraphs(&data::text(data, "body")));
    out.push_str("</div>");
    out
}

/// Validate a content block.
#[must_use]
pub fn validate_content_block(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "content block").into_iter().collect();
    let image = data::text(data, "imageUrl");
    if data::text(data, "body").is_empty() && image.is_empty() {
        issues.push(Issue::warn("content block has no body text or image"));
    }
    if !image.is_empty() {
        if html::safe_url(&image).is_none() {
            issues.push(Issue::error("content block image URL is not allowed"));
        } else if data::text(data, "imageAlt").is_empty() {
            issues.push(Issue::warn("content block image has no alt text"));
        }
    }
    issues
}

/// Default embed data.
#[must_use]
pub fn embed_default() -> Value {
    json!({
        "title": "Video",
        "url": "",
        "height": DEFAULT_EMBED_HEIGHT,
        "caption": ""
    })
}

fn embed_height(data: &Value) -> i64 {
    data::int(data, "height")
        .unwrap_or(DEFAULT_EMBED_HEIGHT)
        .clamp(EMBED_HEIGHT_RANGE.0, EMBED_HEIGHT_RANGE.1)
}

/// Compile an embed; a missing or non-http URL yields a flagged fragment.
#[must_use]
pub fn compile_embed(ctx: &CompileContext<'_>) -> String {
    let data = ctx.data;
    let title = data::text(data, "title");
    let mut out = ctx.heading(&title);
    let url = data::text(data, "url");
    match html::http_url(&url) {
        Some(src) => {
            let frame_title = if title.is_empty() { "Embedded content" } else { title.as_str() };
            let _ = write!(
                out,
                "<div class=\"cf-embed\" style=\"height:{}px\"><iframe src=\"{}\" title=\"{}\" loading=\"lazy\" allowfullscreen referrerpolicy=\"strict-origin-when-cross-origin\"></iframe></div>",
                embed_height(data),
                escape(src),
                escape(frame_title)
            );
        }
        None => out.push_str(&html::flagged("embed-missing-url", "Embed missing URL")),
    }
    let caption = data::text(data, "caption");
    if !caption.is_empty() {
        let _ = write!(out, "<p class=\"cf-embed__caption\">{}</p>", escape(&caption));
    }
    out
}

/// Validate an embed.
#[must_use]
pub fn validate_embed(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "embed").into_iter().collect();
    let url = data::text(data, "url");
    if url.is_empty() {
        issues.push(Issue::error("embed has no URL"));
    } else if html::http_url(&url).is_none() {
        issues.push(Issue::error("embed URL must start with http:// or https://"));
    }
    if let Some(height) = data::int(data, "height") {
        if !(EMBED_HEIGHT_RANGE.0..=EMBED_HEIGHT_RANGE.1).contains(&height) {
            issues.push(Issue::warn(format!(
                "embed height {height} clamped to {}",
                embed_height(data)
            )));
        }
    }
    issues
}

const RESOURCE_LINKS: [(&str, &str, bool); 3] = [
    ("viewUrl", "View", false),
    ("downloadUrl", "Download", true),
    ("readUrl", "Read", false),
];

/// Default resource data.
#[must_use]
pub fn resource_default() -> Value {
    json!({
        "title": "Resource",
        "description": "",
        "viewUrl": "",
        "downloadUrl": "",
        "readUrl": ""
    })
}

/// Compile a resource card.
#[must_use]
pub fn compile_resource(ctx: &CompileContext<'_>) -> String {
    let data = ctx.data;
    let mut out = ctx.heading(&data::text(data, "title"));
    out.push_str(&html::paragraphs(&data::text(data, "description")));

    let mut links = String::new();
    for (key, label, download) in RESOURCE_LINKS {
        if let Some(url) = html::safe_url(&data::text(data, key)) {
            let _ = write!(
                links,
                "<a class=\"cf-button cf-resource__link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"{}>{label}</a>",
                escape(url),
                if download { " download" } else { "" }
            );
        }
    }
    if links.is_empty() {
        out.push_str(&html::flagged(
            "resource-missing-source",
            "Resource has no link yet",
        ));
    } else {
        let _ = write!(out, "<div class=\"cf-resource__links\">{links}</div>");
    }
    out
}

/// Validate a resource.
#[must_use]
pub fn validate_resource(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "resource").into_iter().collect();
    let mut any = false;
    for (key, label, _) in RESOURCE_LINKS {
        let url = data::text(data, key);
        if url.is_empty() {
            continue;
        }
        any = true;
        if html::safe_url(&url).is_none() {
            issues.push(Issue::error(format!(
                "resource {} link is not allowed",
                label.to_lowercase()
            )));
        }
    }
    if !any {
        issues.push(Issue::warn("resource has no view/download/read source"));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(data: &Value) -> CompileContext<'_> {
        CompileContext::new(data, 0, "a1")
    }

    #[test]
    fn test_content_block_renders_paragraphs_and_image() {
        let data = json!({"title": "Budget", "body": "One\n\nTwo", "imageUrl": "img/a.png", "imageAlt": "Chart"});
        let html = compile_content_block(&ctx(&data));
        assert!(html.contains("<h3 class=\"cf-activity__title\" id=\"cf-a1-title\">Budget</h3>"));
        assert!(html.contains("<p>One</p><p>Two</p>"));
        assert!(html.contains("alt=\"Chart\""));
    }

    #[test]
    fn test_content_block_drops_script_image() {
        let data = json!({"imageUrl": "javascript:alert(1)"});
        let html = compile_content_block(&ctx(&data));
        assert!(!html.contains("<img"));
        assert!(validate_content_block(&data)
            .iter()
            .any(|i| i.message.contains("not allowed")));
    }

    #[test]
    fn test_embed_missing_url_is_flagged() {
        let data = json!({"title": "Clip", "url": ""});
        let html = compile_embed(&ctx(&data));
        assert!(html.contains("Embed missing URL"));
        assert!(!html.contains("<iframe"));
    }

    #[test]
    fn test_embed_height_clamped() {
        let data = json!({"url": "https://video.example/e/1", "height": 9000});
        let html = compile_embed(&ctx(&data));
        assert!(html.contains("height:1200px"));
        assert!(validate_embed(&data)
            .iter()
            .any(|i| i.message == "embed height 9000 clamped to 1200"));
    }

    #[test]
    fn test_resource_without_links_warns() {
        let data = json!({"title": "Guide"});
        let issues = validate_resource(&data);
        assert_eq!(
            issues,
            vec![Issue::warn("resource has no view/download/read source")]
        );
        assert!(compile_resource(&ctx(&data)).contains("data-cf-flag"));
    }

    #[test]
    fn test_resource_download_link() {
        let data = json!({"title": "Guide", "downloadUrl": "files/guide.pdf"});
        let html = compile_resource(&ctx(&data));
        assert!(html.contains("href=\"files/guide.pdf\""));
        assert!(html.contains(" download>Download</a>"));
        assert!(validate_resource(&data).is_empty());
    }
}
