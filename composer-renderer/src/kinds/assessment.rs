//! `knowledge_check`: multiple-choice and short-answer questions.
//!
//! Documents come in two shapes. Modern data carries a `questions` array;
//! legacy data is a single question spread over `question`, `options` and
//! `correctIndex`. The presence of `questions` decides which shape is read,
//! and both normalize into the same [`Question`] list.

use std::fmt::Write;

use serde_json::{json, Value};
use tracing::debug;

use super::title_issue;
use crate::data;
use crate::html::escape;
use crate::registry::{CompileContext, Issue, Normalized};

/// Question type tag for graded choices.
pub const MULTIPLE_CHOICE: &str = "multiple_choice";

/// Question type tag for free text.
pub const SHORT_ANSWER: &str = "short_answer";

/// One canonical question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Graded single choice.
    MultipleChoice {
        /// Question text.
        prompt: String,
        /// Answer options in display order.
        options: Vec<String>,
        /// Index of the correct option, always in range when options exist.
        correct_index: usize,
    },
    /// Ungraded free text.
    ShortAnswer {
        /// Question text.
        prompt: String,
        /// Textarea placeholder.
        placeholder: String,
    },
}

impl Question {
    /// Question text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            Self::MultipleChoice { prompt, .. } | Self::ShortAnswer { prompt, .. } => prompt,
        }
    }
}

/// Default knowledge check data.
#[must_use]
pub fn default_data() -> Value {
    json!({
        "title": "Check your understanding",
        "questions": [
            {
                "type": MULTIPLE_CHOICE,
                "prompt": "Which choice is correct?",
                "options": ["Option A", "Option B", "Option C"],
                "correctIndex": 0
            }
        ]
    })
}

fn multiple_choice(
    number: usize,
    prompt: String,
    options: Vec<String>,
    raw_index: Option<i64>,
    adjustments: &mut Vec<String>,
) -> Question {
    let requested = raw_index.unwrap_or(0);
    let max = i64::try_from(options.len().saturating_sub(1)).unwrap_or(i64::MAX);
    let clamped = requested.clamp(0, max);
    if raw_index.is_some() && clamped != requested {
        adjustments.push(format!(
            "question {number}: correct answer index {requested} clamped to {clamped}"
        ));
    }
    Question::MultipleChoice {
        prompt,
        options,
        correct_index: usize::try_from(clamped).unwrap_or(0),
    }
}

fn read_question(number: usize, item: &Value, adjustments: &mut Vec<String>) -> Question {
    let prompt = data::text(item, "prompt");
    let options = data::strings(item, "options");
    let declared = data::text(item, "type");
    let is_short = match declared.as_str() {
        SHORT_ANSWER => true,
        MULTIPLE_CHOICE => false,
        other => {
            if !other.is_empty() {
                adjustments.push(format!(
                    "question {number}: unknown question type \"{other}\" read as {}",
                    if options.is_empty() { SHORT_ANSWER } else { MULTIPLE_CHOICE }
                ));
            }
            options.is_empty()
        }
    };
    if is_short {
        Question::ShortAnswer {
            prompt,
            placeholder: data::text(item, "placeholder"),
        }
    } else {
        multiple_choice(
            number,
            prompt,
            options,
            data::int(item, "correctIndex"),
            adjustments,
        )
    }
}

/// Normalize either data shape into the canonical question list.
#[must_use]
pub fn normalize_questions(data: &Value) -> Normalized<Vec<Question>> {
    let mut adjustments = Vec::new();
    let value = if data.get("questions").is_some() {
        data::array(data, "questions")
            .iter()
            .enumerate()
            .map(|(i, item)| read_question(i + 1, item, &mut adjustments))
            .collect()
    } else if data.get("question").is_some() || data.get("options").is_some() {
        debug!("Upgrading legacy single-question knowledge check");
        vec![multiple_choice(
            1,
            data::text(data, "question"),
            data::strings(data, "options"),
            data::int(data, "correctIndex"),
            &mut adjustments,
        )]
    } else {
        Vec::new()
    };
    Normalized { value, adjustments }
}

/// Compile a knowledge check.
#[must_use]
pub fn compile(ctx: &CompileContext<'_>) -> String {
    let questions = normalize_questions(ctx.data).value;
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str("<div class=\"cf-kc\" data-cf-kc>");
    if questions.is_empty() {
        out.push_str("<p class=\"cf-empty\">No questions yet.</p>");
    }
    for (i, question) in questions.iter().enumerate() {
        let number = i + 1;
        let label = format!("Q{number}: {}", question.prompt());
        match question {
            Question::MultipleChoice {
                prompt,
                options,
                correct_index,
            } => {
                let _ = write!(
                    out,
                    "<fieldset class=\"cf-kc__question\" data-cf-question=\"{number}\" data-cf-qtype=\"{MULTIPLE_CHOICE}\" data-cf-prompt=\"{}\" data-cf-correct-index=\"{correct_index}\"><legend>{number}. {}</legend>",
                    escape(prompt),
                    escape(prompt)
                );
                let name = ctx.dom_id(&format!("q{number}"));
                for (o, option) in options.iter().enumerate() {
                    let _ = write!(
                        out,
                        "<label class=\"cf-choice\"><input type=\"radio\" name=\"{name}\" value=\"{o}\" data-cf-label=\"{}\" data-cf-option=\"{}\"> <span>{}</span></label>",
                        escape(&label),
                        escape(option),
                        escape(option)
                    );
                }
                out.push_str("<p class=\"cf-kc__feedback\" data-cf-feedback aria-live=\"polite\"></p></fieldset>");
            }
            Question::ShortAnswer {
                prompt,
                placeholder,
            } => {
                let id = ctx.dom_id(&format!("q{number}"));
                let _ = write!(
                    out,
                    "<div class=\"cf-kc__question\" data-cf-question=\"{number}\" data-cf-qtype=\"{SHORT_ANSWER}\" data-cf-prompt=\"{}\"><label for=\"{id}\">{number}. {}</label><textarea id=\"{id}\" rows=\"3\" placeholder=\"{}\" data-cf-label=\"{}\"></textarea></div>",
                    escape(prompt),
                    escape(prompt),
                    escape(placeholder),
                    escape(&label)
                );
            }
        }
    }
    if questions
        .iter()
        .any(|q| matches!(q, Question::MultipleChoice { .. }))
    {
        out.push_str("<div class=\"cf-actions\"><button type=\"button\" class=\"cf-button\" data-cf-action=\"kc-check\">Check answers</button></div>");
    }
    out.push_str("</div>");
    out
}

/// Validate a knowledge check.
#[must_use]
pub fn validate(data: &Value) -> Vec<Issue> {
    let normalized = normalize_questions(data);
    let mut issues: Vec<Issue> = title_issue(data, "knowledge check").into_iter().collect();
    if normalized.value.is_empty() {
        issues.push(Issue::warn("knowledge check has no questions"));
    }
    for (i, question) in normalized.value.iter().enumerate() {
        let number = i + 1;
        if question.prompt().is_empty() {
            issues.push(Issue::error(format!("question {number} has no prompt")));
        }
        if let Question::MultipleChoice { options, .. } = question {
            if options.len() < 2 {
                issues.push(Issue::error(format!(
                    "question {number} needs at least 2 options"
                )));
            }
            if options.iter().any(String::is_empty) {
                issues.push(Issue::warn(format!("question {number} has an empty option")));
            }
        }
    }
    issues.extend(normalized.warnings());
    issues
}
