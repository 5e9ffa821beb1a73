//! `worksheet`: headed sections of fillable fields.
//!
//! Modern data is a `blocks` sequence of `title` and `field` blocks.
//! Legacy data has a single `instructions` string and a flat `fields` list;
//! it is upgraded into the block sequence when read.

use std::fmt::Write;

use serde_json::{json, Value};
use tracing::debug;

use super::title_issue;
use crate::data;
use crate::html::{self, escape};
use crate::registry::{CompileContext, Issue, Normalized};

/// Input type of a worksheet field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Single-line text.
    #[default]
    Text,
    /// Multi-line text.
    Textarea,
    /// Numeric input.
    Number,
}

impl FieldType {
    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "number" => Some(Self::Number),
            _ => None,
        }
    }
}

/// One canonical worksheet block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorksheetBlock {
    /// Section heading with optional instructions.
    Title {
        /// Heading text; may be empty when only instructions are given.
        text: String,
        /// Instructions shown under the heading.
        instructions: String,
    },
    /// A fillable field.
    Field {
        /// Field label.
        label: String,
        /// Input type.
        field_type: FieldType,
        /// Helper text under the input.
        helper: String,
    },
}

/// Default worksheet data.
#[must_use]
pub fn default_data() -> Value {
    json!({
        "title": "Worksheet",
        "blocks": [
            {"type": "title", "text": "Part 1", "instructions": "Answer each prompt in your own words."},
            {"type": "field", "label": "Your answer", "fieldType": "textarea", "helper": ""}
        ]
    })
}

fn read_field(number: usize, item: &Value, adjustments: &mut Vec<String>) -> WorksheetBlock {
    let declared = {
        let explicit = data::text(item, "fieldType");
        if explicit.is_empty() {
            data::text(item, "inputType")
        } else {
            explicit
        }
    };
    let field_type = if declared.is_empty() {
        FieldType::Text
    } else {
        FieldType::parse(&declared).unwrap_or_else(|| {
            adjustments.push(format!(
                "field {number}: unknown field type \"{declared}\" read as text"
            ));
            FieldType::Text
        })
    };
    WorksheetBlock::Field {
        label: data::text(item, "label"),
        field_type,
        helper: data::text(item, "helper"),
    }
}

/// Normalize either data shape into the canonical block list.
#[must_use]
pub fn normalize_blocks(data: &Value) -> Normalized<Vec<WorksheetBlock>> {
    let mut adjustments = Vec::new();
    let mut blocks = Vec::new();
    let mut field_number = 0;

    if data.get("blocks").is_some() {
        for (i, item) in data::array(data, "blocks").iter().enumerate() {
            match data::text(item, "type").as_str() {
                "title" => blocks.push(WorksheetBlock::Title {
                    text: data::text(item, "text"),
                    instructions: data::text(item, "instructions"),
                }),
                "field" => {
                    field_number += 1;
                    blocks.push(read_field(field_number, item, &mut adjustments));
                }
                other => adjustments.push(format!(
                    "block {}: unknown block type \"{other}\" skipped",
                    i + 1
                )),
            }
        }
    } else {
        debug!("Upgrading legacy worksheet fields into blocks");
        let instructions = data::text(data, "instructions");
        if !instructions.is_empty() {
            blocks.push(WorksheetBlock::Title {
                text: String::new(),
                instructions,
            });
        }
        for item in data::array(data, "fields") {
            field_number += 1;
            let block = match item {
                Value::String(label) => WorksheetBlock::Field {
                    label: label.trim().to_string(),
                    field_type: FieldType::Text,
                    helper: String::new(),
                },
                _ => {
                    let mut block = read_field(field_number, item, &mut adjustments);
                    if let WorksheetBlock::Field { field_type, .. } = &mut block {
                        if let Some(legacy) = FieldType::parse(&data::text(item, "type")) {
                            *field_type = legacy;
                        }
                    }
                    block
                }
            };
            blocks.push(block);
        }
    }
    Normalized {
        value: blocks,
        adjustments,
    }
}

/// Compile a worksheet.
#[must_use]
pub fn compile(ctx: &CompileContext<'_>) -> String {
    let blocks = normalize_blocks(ctx.data).value;
    let section_level = (ctx.heading_level + 1).min(6);
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str("<div class=\"cf-worksheet\">");
    if blocks.is_empty() {
        out.push_str("<p class=\"cf-empty\">No fields yet.</p>");
    }
    let mut field_number = 0;
    for block in &blocks {
        match block {
            WorksheetBlock::Title { text, instructions } => {
                if !text.is_empty() {
                    let _ = write!(
                        out,
                        "<h{section_level} class=\"cf-worksheet__section\">{}</h{section_level}>",
                        escape(text)
                    );
                }
                if !instructions.is_empty() {
                    let _ = write!(
                        out,
                        "<div class=\"cf-worksheet__instructions\">{}</div>",
                        html::paragraphs(instructions)
                    );
                }
            }
            WorksheetBlock::Field {
                label,
                field_type,
                helper,
            } => {
                field_number += 1;
                let id = ctx.dom_id(&format!("f{field_number}"));
                let shown = if label.is_empty() {
                    format!("Field {field_number}")
                } else {
                    label.clone()
                };
                let helper_id = ctx.dom_id(&format!("f{field_number}-help"));
                let described = if helper.is_empty() {
                    String::new()
                } else {
                    format!(" aria-describedby=\"{helper_id}\"")
                };
                let _ = write!(
                    out,
                    "<div class=\"cf-field\"><label for=\"{id}\">{}</label>",
                    escape(&shown)
                );
                let _ = match field_type {
                    FieldType::Textarea => write!(
                        out,
                        "<textarea id=\"{id}\" rows=\"4\" data-cf-label=\"{}\"{described}></textarea>",
                        escape(&shown)
                    ),
                    FieldType::Text | FieldType::Number => write!(
                        out,
                        "<input id=\"{id}\" type=\"{}\" data-cf-label=\"{}\"{described}>",
                        if *field_type == FieldType::Number { "number" } else { "text" },
                        escape(&shown)
                    ),
                };
                if !helper.is_empty() {
                    let _ = write!(
                        out,
                        "<p class=\"cf-field__helper\" id=\"{helper_id}\">{}</p>",
                        escape(helper)
                    );
                }
                out.push_str("</div>");
            }
        }
    }
    out.push_str("</div>");
    out
}

/// Validate a worksheet.
#[must_use]
pub fn validate(data: &Value) -> Vec<Issue> {
    let normalized = normalize_blocks(data);
    let mut issues: Vec<Issue> = title_issue(data, "worksheet").into_iter().collect();
    let mut fields = 0;
    for block in &normalized.value {
        if let WorksheetBlock::Field { label, .. } = block {
            fields += 1;
            if label.is_empty() {
                issues.push(Issue::warn(format!("field {fields} has no label")));
            }
        }
    }
    if fields == 0 {
        issues.push(Issue::warn("worksheet has no fields"));
    }
    issues.extend(normalized.warnings());
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_fields_upgraded() {
        let data = json!({
            "title": "Budget",
            "instructions": "Fill in",
            "fields": ["Income", {"label": "Savings", "type": "number", "helper": "Monthly"}]
        });
        let normalized = normalize_blocks(&data);
        assert_eq!(
            normalized.value,
            vec![
                WorksheetBlock::Title {
                    text: String::new(),
                    instructions: "Fill in".into()
                },
                WorksheetBlock::Field {
                    label: "Income".into(),
                    field_type: FieldType::Text,
                    helper: String::new()
                },
                WorksheetBlock::Field {
                    label: "Savings".into(),
                    field_type: FieldType::Number,
                    helper: "Monthly".into()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_field_type_reads_as_text() {
        let data = json!({"blocks": [{"type": "field", "label": "A", "fieldType": "color"}]});
        let normalized = normalize_blocks(&data);
        assert_eq!(
            normalized.adjustments,
            vec!["field 1: unknown field type \"color\" read as text".to_string()]
        );
    }

    #[test]
    fn test_unknown_block_skipped() {
        let data = json!({"blocks": [{"type": "video"}, {"type": "field", "label": "A"}]});
        let normalized = normalize_blocks(&data);
        assert_eq!(normalized.value.len(), 1);
        assert_eq!(normalized.adjustments.len(), 1);
    }

    #[test]
    fn test_compile_renders_labelled_controls() {
        let data = json!({"title": "W", "blocks": [
            {"type": "title", "text": "Part A", "instructions": "Do it"},
            {"type": "field", "label": "Goal", "fieldType": "textarea", "helper": "Be specific"},
            {"type": "field", "label": "Amount", "fieldType": "number"}
        ]});
        let html = compile(&CompileContext::new(&data, 0, "ws"));
        assert!(html.contains("<h4 class=\"cf-worksheet__section\">Part A</h4>"));
        assert!(html.contains("<textarea id=\"cf-ws-f1\""));
        assert!(html.contains("aria-describedby=\"cf-ws-f1-help\""));
        assert!(html.contains("type=\"number\" data-cf-label=\"Amount\""));
    }

    #[test]
    fn test_validate_empty_worksheet() {
        let issues = validate(&json!({"title": "W", "blocks": []}));
        assert_eq!(issues, vec![Issue::warn("worksheet has no fields")]);
    }
}
