//! `decision_lab`: weighted sliders with a derived score and outcome.
//!
//! The score is `sum(value * weight)` over all variables. The outcome is the
//! label of the outcome with the highest `min` not above the score. The
//! runtime recomputes both from the slider values on every input and after a
//! snapshot restore.

use std::fmt::Write;

use serde_json::{json, Value};

use super::title_issue;
use crate::data;
use crate::html::{self, escape};
use crate::registry::{CompileContext, Issue, Normalized};

/// One slider.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Slider label.
    pub label: String,
    /// Lower bound.
    pub min: f64,
    /// Upper bound, always above `min`.
    pub max: f64,
    /// Positive step.
    pub step: f64,
    /// Initial value within bounds.
    pub value: f64,
    /// Score multiplier.
    pub weight: f64,
}

/// One outcome band.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Minimum score for this outcome.
    pub min: f64,
    /// Outcome text.
    pub label: String,
}

/// Canonical decision lab.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionModel {
    /// Sliders in display order.
    pub variables: Vec<Variable>,
    /// Outcomes sorted by ascending `min`.
    pub outcomes: Vec<Outcome>,
}

impl DecisionModel {
    /// Weighted score of the initial values.
    #[must_use]
    pub fn initial_score(&self) -> f64 {
        self.variables.iter().map(|v| v.value * v.weight).sum()
    }

    /// Outcome label for a score, if any band applies.
    #[must_use]
    pub fn outcome_for(&self, score: f64) -> Option<&str> {
        self.outcomes
            .iter()
            .rev()
            .find(|o| o.min <= score)
            .map(|o| o.label.as_str())
    }
}

/// Default decision lab data.
#[must_use]
pub fn default_data() -> Value {
    json!({
        "title": "Decision lab",
        "prompt": "Adjust the sliders to see how your choices add up.",
        "variables": [
            {"label": "Savings rate", "min": 0, "max": 10, "step": 1, "value": 5, "weight": 1},
            {"label": "Spending", "min": 0, "max": 10, "step": 1, "value": 5, "weight": -1}
        ],
        "outcomes": [
            {"min": -10, "label": "Rethink your plan."},
            {"min": 0, "label": "Balanced."},
            {"min": 5, "label": "Strong position."}
        ]
    })
}

/// Normalize variables and outcomes.
#[must_use]
pub fn normalize_decision(data: &Value) -> Normalized<DecisionModel> {
    let mut adjustments = Vec::new();
    let variables = data::array(data, "variables")
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let number = i + 1;
            let min = data::float(item, "min").unwrap_or(0.0);
            let mut max = data::float(item, "max").unwrap_or(10.0);
            if min >= max {
                adjustments.push(format!(
                    "variable {number}: max {max} raised to {}",
                    min + 1.0
                ));
                max = min + 1.0;
            }
            let step = data::float(item, "step")
                .filter(|s| *s > 0.0)
                .unwrap_or(1.0);
            let raw_value = data::float(item, "value").unwrap_or(min);
            let value = raw_value.clamp(min, max);
            if (value - raw_value).abs() > f64::EPSILON {
                adjustments.push(format!(
                    "variable {number}: value {raw_value} clamped to {value}"
                ));
            }
            Variable {
                label: data::text(item, "label"),
                min,
                max,
                step,
                value,
                weight: data::float(item, "weight").unwrap_or(1.0),
            }
        })
        .collect();

    let mut outcomes: Vec<Outcome> = data::array(data, "outcomes")
        .iter()
        .map(|item| Outcome {
            min: data::float(item, "min").unwrap_or(f64::NEG_INFINITY),
            label: data::text(item, "label"),
        })
        .collect();
    outcomes.sort_by(|a, b| a.min.total_cmp(&b.min));

    Normalized {
        value: DecisionModel {
            variables,
            outcomes,
        },
        adjustments,
    }
}

/// Compile a decision lab.
#[must_use]
pub fn compile(ctx: &CompileContext<'_>) -> String {
    let model = normalize_decision(ctx.data).value;
    let mut out = ctx.heading(&data::text(ctx.data, "title"));
    out.push_str(&html::paragraphs(&data::text(ctx.data, "prompt")));
    let _ = write!(
        out,
        "<div class=\"cf-decision\" data-cf-decision=\"{}\">",
        escape(&ctx.state_key())
    );
    for (i, variable) in model.variables.iter().enumerate() {
        let id = ctx.dom_id(&format!("v{i}"));
        let label = if variable.label.is_empty() {
            format!("Variable {}", i + 1)
        } else {
            variable.label.clone()
        };
        let _ = write!(
            out,
            "<div class=\"cf-field cf-decision__variable\"><label for=\"{id}\">{} <output data-cf-decision-value>{}</output></label><input type=\"range\" id=\"{id}\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\" data-cf-weight=\"{}\" data-cf-label=\"{}\"></div>",
            escape(&label),
            variable.value,
            variable.min,
            variable.max,
            variable.step,
            variable.value,
            variable.weight,
            escape(&label)
        );
    }
    out.push_str("<ul class=\"cf-decision__outcomes\" hidden>");
    for outcome in &model.outcomes {
        let min = if outcome.min.is_finite() {
            outcome.min.to_string()
        } else {
            String::from("-Infinity")
        };
        let _ = write!(
            out,
            "<li data-cf-outcome=\"{min}\">{}</li>",
            escape(&outcome.label)
        );
    }
    let score = model.initial_score();
    let _ = write!(
        out,
        "</ul><p class=\"cf-decision__result\" aria-live=\"polite\">Score: <output data-cf-decision-score>{score}</output> <span class=\"cf-decision__outcome\" data-cf-decision-outcome>{}</span></p></div>",
        escape(model.outcome_for(score).unwrap_or(""))
    );
    out
}

/// Validate a decision lab.
#[must_use]
pub fn validate(data: &Value) -> Vec<Issue> {
    let mut issues: Vec<Issue> = title_issue(data, "decision lab").into_iter().collect();
    let variables = data::array(data, "variables");
    if variables.is_empty() {
        issues.push(Issue::warn("decision lab has no variables"));
    }
    for (i, item) in variables.iter().enumerate() {
        let min = data::float(item, "min").unwrap_or(0.0);
        let max = data::float(item, "max").unwrap_or(10.0);
        if min >= max {
            issues.push(Issue::error(format!(
                "variable {}: min must be less than max",
                i + 1
            )));
        }
        if data::text(item, "label").is_empty() {
            issues.push(Issue::warn(format!("variable {} has no label", i + 1)));
        }
    }
    if data::array(data, "outcomes").is_empty() {
        issues.push(Issue::warn("decision lab has no outcomes"));
    }
    let normalized = normalize_decision(data);
    issues.extend(
        normalized
            .warnings()
            .into_iter()
            .filter(|issue| !issue.message.contains("raised to")),
    );
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score_and_outcome() {
        let model = normalize_decision(&default_data()).value;
        assert!(model.initial_score().abs() < f64::EPSILON);
        assert_eq!(model.outcome_for(0.0), Some("Balanced."));
        assert_eq!(model.outcome_for(7.0), Some("Strong position."));
        assert_eq!(model.outcome_for(-50.0), None);
    }

    #[test]
    fn test_inverted_bounds_repaired_and_reported() {
        let data = json!({"title": "D", "variables": [{"label": "A", "min": 5, "max": 5, "value": 9}], "outcomes": [{"min": 0, "label": "ok"}]});
        let normalized = normalize_decision(&data);
        let variable = &normalized.value.variables[0];
        assert!((variable.max - 6.0).abs() < f64::EPSILON);
        assert!((variable.value - 6.0).abs() < f64::EPSILON);
        let issues = validate(&data);
        assert!(issues.contains(&Issue::error("variable 1: min must be less than max")));
        assert!(issues
            .iter()
            .any(|i| i.message == "variable 1: value 9 clamped to 6"));
    }

    #[test]
    fn test_compile_emits_weighted_ranges() {
        let html = compile(&CompileContext::new(&default_data(), 0, "dl"));
        assert!(html.contains("data-cf-decision=\"dl\""));
        assert!(html.contains("type=\"range\" id=\"cf-dl-v1\" min=\"0\" max=\"10\" step=\"1\" value=\"5\" data-cf-weight=\"-1\""));
        assert!(html.contains("<li data-cf-outcome=\"5\">Strong position.</li>"));
        assert!(html.contains("data-cf-decision-outcome>Balanced.</span>"));
    }
}
