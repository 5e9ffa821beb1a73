//! Compiler property tests
//!
//! - Compilation is total over arbitrary type strings and data shapes
//! - Every root activity gets exactly one top-level wrapper
//! - Arbitrary container reference graphs terminate

use composer_core::{Activity, Module, Template};
use composer_renderer::{compile_module, ActivityKind, CompileOptions};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_type() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(ActivityKind::ALL.to_vec()).prop_map(|k| k.as_str().to_string()),
        "[a-z_]{0,12}",
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        ".{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::btree_map(
                prop::sample::select(vec![
                    "title", "body", "items", "cards", "tabs", "questions", "blocks", "rows",
                    "columns", "cells", "rowCount", "columnCount", "spots", "variables",
                    "outcomes", "url", "imageUrl", "activityId", "activity", "activityIds",
                ])
                .prop_map(str::to_string),
                inner,
                0..6,
            )
            .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_module() -> impl Strategy<Value = Module> {
    (
        prop::collection::vec((arb_type(), arb_json()), 0..8),
        prop::sample::select(Template::ALL.to_vec()),
    )
        .prop_map(|(entries, template)| {
            let mut module = Module::new("Generated");
            module.template = Some(template.as_str().to_string());
            for (i, (activity_type, data)) in entries.into_iter().enumerate() {
                module = module.with_activity(Activity::new(activity_type, data).with_id(format!("g{i}")));
            }
            module
        })
}

/// Containers referencing arbitrary module members, including themselves.
fn arb_reference_graph() -> impl Strategy<Value = Module> {
    prop::collection::vec(prop::collection::vec(0usize..6, 0..4), 1..6).prop_map(|targets| {
        let count = targets.len();
        let mut module = Module::new("Graph");
        for (i, refs) in targets.into_iter().enumerate() {
            let cards: Vec<Value> = refs
                .into_iter()
                .map(|t| json!({"title": format!("to {}", t % count), "activityId": format!("n{}", t % count)}))
                .collect();
            let activity_type = if i % 2 == 0 { "card_list" } else { "tab_group" };
            let key = if i % 2 == 0 { "cards" } else { "tabs" };
            let mut data = json!({"title": format!("node {i}")});
            data[key] = Value::from(cards);
            module = module.with_activity(Activity::new(activity_type, data).with_id(format!("n{i}")));
        }
        module
    })
}

fn top_level_wrappers(html: &str) -> usize {
    html.matches("<section class=\"cf-activity").count()
}

proptest! {
    #[test]
    fn prop_compile_is_total(module in arb_module()) {
        let compiled = compile_module(&module, &CompileOptions::new());
        prop_assert!(compiled.html.contains("data-cf-module="));
        prop_assert!(!compiled.css.is_empty());
        prop_assert!(compiled.script.contains("__cfComposerBound"));
    }

    #[test]
    fn prop_plain_activities_each_get_one_wrapper(module in arb_module()) {
        let containers = module
            .activities
            .iter()
            .filter(|a| a.activity_type == "tab_group" || a.activity_type == "card_list")
            .count();
        prop_assume!(containers == 0);
        let compiled = compile_module(&module, &CompileOptions::new());
        prop_assert_eq!(top_level_wrappers(&compiled.html), module.activities.len());
    }

    #[test]
    fn prop_reference_graphs_terminate(module in arb_reference_graph()) {
        let compiled = compile_module(&module, &CompileOptions::new());
        prop_assert!(top_level_wrappers(&compiled.html) >= 1);
        for activity in &module.activities {
            let marker = format!("data-cf-activity=\"{}\"", activity.id);
            prop_assert!(compiled.html.contains(&marker));
        }
    }
}
