//! Module stylesheet: shared component CSS, the theme palette and the
//! layout grid derived from the normalized composer layout.

use std::fmt::Write;

use composer_core::{ComposerLayout, LayoutMode, Template, Theme};

const BASE_CSS: &str = include_str!("assets/composer.css");

/// Viewport width below which every grid collapses to one column.
pub const MOBILE_BREAKPOINT_PX: u32 = 720;

/// CSS custom-property palette for a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Buttons, active tabs, pins.
    pub accent: &'static str,
    /// Text on accent backgrounds.
    pub accent_contrast: &'static str,
    /// Page background.
    pub background: &'static str,
    /// Card surfaces.
    pub surface: &'static str,
    /// Body text.
    pub text: &'static str,
    /// Secondary text.
    pub muted: &'static str,
    /// Hairlines.
    pub border: &'static str,
    /// Font stack.
    pub font: &'static str,
}

const SANS: &str = "system-ui,-apple-system,\"Segoe UI\",Roboto,sans-serif";
const SERIF: &str = "Georgia,\"Times New Roman\",serif";

impl Palette {
    /// Palette for a theme.
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Classic => Self {
                accent: "#2563eb",
                accent_contrast: "#ffffff",
                background: "#f8fafc",
                surface: "#ffffff",
                text: "#0f172a",
                muted: "#64748b",
                border: "#e2e8f0",
                font: SANS,
            },
            Theme::Ocean => Self {
                accent: "#0e7490",
                accent_contrast: "#ffffff",
                background: "#ecfeff",
                surface: "#ffffff",
                text: "#083344",
                muted: "#4b7280",
                border: "#bae6fd",
                font: SANS,
            },
            Theme::Forest => Self {
                accent: "#15803d",
                accent_contrast: "#ffffff",
                background: "#f0fdf4",
                surface: "#ffffff",
                text: "#14281d",
                muted: "#55705f",
                border: "#cfe8d6",
                font: SERIF,
            },
            Theme::Sunset => Self {
                accent: "#c2410c",
                accent_contrast: "#ffffff",
                background: "#fff7ed",
                surface: "#ffffff",
                text: "#3b1d0f",
                muted: "#8a5a44",
                border: "#fed7aa",
                font: SANS,
            },
            Theme::Slate => Self {
                accent: "#38bdf8",
                accent_contrast: "#0f172a",
                background: "#0f172a",
                surface: "#1e293b",
                text: "#e2e8f0",
                muted: "#94a3b8",
                border: "#334155",
                font: SANS,
            },
        }
    }

    /// Custom-property block scoped to the module root.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "[data-cf-module]{{--cf-accent:{};--cf-accent-contrast:{};--cf-background:{};--cf-surface:{};--cf-text:{};--cf-muted:{};--cf-border:{};--cf-font:{}}}\n",
            self.accent,
            self.accent_contrast,
            self.background,
            self.surface,
            self.text,
            self.muted,
            self.border,
            self.font
        )
    }
}

/// Grid rules for the activity area.
///
/// Simple mode rows grow with content, starting at the configured row
/// height; with `simpleMatchTallestRow` every item in a row stretches to
/// the tallest one. Canvas mode uses fixed-height rows so `h` maps to
/// pixels.
#[must_use]
pub fn grid_css(layout: &ComposerLayout) -> String {
    let mut css = String::new();
    let [margin_x, margin_y] = layout.margin;
    let [pad_x, pad_y] = layout.container_padding;
    let (auto_rows, align) = match layout.mode {
        LayoutMode::Simple => (
            format!("minmax({}px,auto)", layout.row_height),
            if layout.simple_match_tallest_row {
                "stretch"
            } else {
                "start"
            },
        ),
        LayoutMode::Canvas => (format!("{}px", layout.row_height), "stretch"),
    };
    let _ = writeln!(
        css,
        ".cf-grid{{display:grid;grid-template-columns:repeat({},minmax(0,1fr));grid-auto-rows:{auto_rows};column-gap:{margin_x}px;row-gap:{margin_y}px;padding:{pad_y}px {pad_x}px;align-items:{align}}}",
        layout.max_columns
    );
    if layout.mode == LayoutMode::Canvas {
        css.push_str(".cf-grid>.cf-activity{overflow:auto}\n");
    }
    let _ = writeln!(
        css,
        "@media (max-width:{MOBILE_BREAKPOINT_PX}px){{.cf-grid{{grid-template-columns:minmax(0,1fr);grid-auto-rows:auto}}.cf-grid>.cf-activity{{grid-column:auto!important;grid-row:auto!important}}.cf-hero,.cf-coursebook{{grid-template-columns:minmax(0,1fr)}}.cf-toc{{position:static}}}}"
    );
    css
}

/// Full stylesheet for a compiled module.
#[must_use]
pub fn module_css(layout: &ComposerLayout, template: Template, theme: Theme) -> String {
    let mut css = String::with_capacity(BASE_CSS.len() + 1024);
    let _ = writeln!(
        css,
        "/* course composer: template {}, theme {} */",
        template.as_str(),
        theme.as_str()
    );
    css.push_str(&Palette::for_theme(theme).to_css());
    css.push_str(BASE_CSS);
    css.push_str(&grid_css(layout));
    css
}
