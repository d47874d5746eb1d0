use std::time::Instant;

use wikiextract::config::ExtractorConfig;
use wikiextract::constants::{EXPR_ERROR_MARKER, MAX_PLACEHOLDER_NESTING};
use wikiextract::core::DiscardCause;
use wikiextract::extractor::{Document, Extractor};
use wikiextract::scanner::balance_brackets;
use wikiextract::templating::{
    ExpansionSettings, InMemoryTemplateStore, Template, TemplateExpander, TemplateNode,
};
use wikiextract::test_utils::{init_test_logging, plain_config, store_from};

fn nested(open: &str, inner: &str, close: &str, depth: usize) -> String {
    format!("{}{inner}{}", open.repeat(depth), close.repeat(depth))
}

#[test]
fn test_doubling_template_is_discarded() {
    init_test_logging(None);
    let store = store_from(&[("Twice", "{{twice}}{{twice}}")]);
    let settings = ExpansionSettings::default();
    let start = Instant::now();

    let mut expander = TemplateExpander::new(&store, &settings, "Bomb");
    let discard = expander.expand_all("{{twice}}").unwrap_err();

    println!("doubling template discarded in {:?}", start.elapsed());
    assert!(matches!(discard.cause, DiscardCause::RecursionLimit { depth: 30 }));
    assert_eq!(expander.stats().template_depth_exceeded, 1);
}

#[test]
fn test_mutual_recursion_with_growing_arguments() {
    let store = store_from(&[
        ("Ping", "{{pong|{{{1}}}{{{1}}}}}"),
        ("Pong", "{{ping|{{{1}}}x}}"),
    ]);
    let extractor = Extractor::new(&plain_config()).unwrap();
    let document = Document::new("1", "Ping pong", "{{ping|a}}");
    let start = Instant::now();

    let extraction = extractor.extract(&store, &document);

    println!("mutual recursion finished in {:?}", start.elapsed());
    assert!(extraction.is_discarded());
}

#[test]
fn test_deep_parser_function_nesting_hits_invocation_ceiling() {
    let store = store_from(&[]);
    let settings = ExpansionSettings::default();
    let text = nested("{{uc:", "deep", "}}", 500);
    let start = Instant::now();

    let mut expander = TemplateExpander::new(&store, &settings, "Deep");
    let result = expander.expand_all(&text).unwrap();

    println!("500 nested invocations expanded in {:?}", start.elapsed());
    assert_eq!(result, "");
    assert_eq!(expander.stats().invocation_depth_exceeded, 1);
}

#[test]
fn test_deep_placeholder_defaults_hit_parameter_ceiling() {
    let body = nested("{{{missing|", "end", "}}}", 200);
    let store = store_from(&[("Defaults", body.as_str())]);
    let settings = ExpansionSettings::default();

    let mut expander = TemplateExpander::new(&store, &settings, "Defaults");
    let result = expander.expand_all("{{defaults}}");

    assert!(result.is_ok());
    assert!(expander.stats().parameter_depth_exceeded >= 1);
}

#[test]
fn test_unbalanced_brace_soup_terminates() {
    let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
    let store = store_from(&[("A", "}}{{{1}}}{{")]);
    let soup = format!(
        "{}{}{{{{a|{}}}}}{}",
        "{".repeat(1000),
        "}}}".repeat(300),
        "{{{".repeat(50),
        "}".repeat(777)
    );
    let start = Instant::now();

    let extraction = extractor.extract(&store, &Document::new("1", "Soup", soup));

    println!(
        "brace soup extracted in {:?} (discarded: {})",
        start.elapsed(),
        extraction.is_discarded()
    );
    assert!(extraction.stats.template_depth_exceeded <= 1);
}

#[test]
fn test_rebalancing_large_input_is_idempotent() {
    let text = format!("{}middle{}", "}".repeat(5000), "{{".repeat(2500));
    let once = balance_brackets(&text);
    assert_eq!(balance_brackets(&once), once);
    assert_eq!(once.len(), text.len() + 5000 + 5000);
    assert!(once.starts_with(&"{".repeat(5000)));
}

#[test]
fn test_branching_self_recursion_stops_at_invocation_ceiling() {
    let branch = "{{#if:x|{{#if:y|{{t}} }} }}";
    let store = store_from(&[("T", branch.repeat(3).as_str())]);
    let settings = ExpansionSettings::default();
    let start = Instant::now();

    let mut expander = TemplateExpander::new(&store, &settings, "Branches");
    let result = expander.expand_all("{{t}}");

    println!("branching recursion finished in {:?}", start.elapsed());
    assert!(result.is_ok());
    let stats = expander.stats();
    assert_eq!(stats.invocation_depth_exceeded, 1);
    assert!(stats.invocations <= settings.limits.max_invocation_depth);
}

#[test]
fn test_binary_template_tree_spends_expansion_budget() {
    let mut store = InMemoryTemplateStore::new();
    for level in 0..25 {
        store.insert(&format!("Level{level}"), format!("{{{{Level{0}}}}}{{{{Level{0}}}}}", level + 1));
    }
    store.insert("Level25", "leaf");
    let settings = ExpansionSettings::default();
    let start = Instant::now();

    let mut expander = TemplateExpander::new(&store, &settings, "Tree");
    let result = expander.expand_all("{{Level0}}");

    println!("binary template tree finished in {:?}", start.elapsed());
    assert!(result.is_ok());
    let stats = expander.stats();
    assert!(stats.expansion_budget_exceeded);
    assert_eq!(stats.invocations, settings.limits.max_expansions);
    assert_eq!(stats.template_depth_exceeded, 0);
}

#[test]
fn test_thousands_of_nested_placeholders() {
    let body = nested("{{{a|", "x", "}}}", 3000);
    let start = Instant::now();
    let template = Template::parse(&body);
    println!("3000 nested placeholders parsed in {:?}", start.elapsed());

    let mut depth = 0;
    let mut current = &template;
    while let Some(TemplateNode::Placeholder(arg)) = current.nodes().first() {
        depth += 1;
        match &arg.default {
            Some(default) => current = default,
            None => break,
        }
    }
    assert!(depth <= MAX_PLACEHOLDER_NESTING);

    let store = store_from(&[("Deep", body.as_str())]);
    let extractor = Extractor::new(&plain_config()).unwrap();
    let extraction = extractor.extract(&store, &Document::new("1", "Deep", "{{deep}}"));
    assert!(!extraction.is_discarded());
    assert!(extraction.stats.parameter_depth_exceeded >= 1);
}

#[test]
fn test_thousands_of_nested_expression_parentheses() {
    let store = store_from(&[]);
    let settings = ExpansionSettings::default();
    let text = format!("{{{{#expr:{}}}}}", nested("(", "1", ")", 3000));

    let mut expander = TemplateExpander::new(&store, &settings, "Parens");
    assert_eq!(expander.expand_all(&text).unwrap(), EXPR_ERROR_MARKER);

    let text = format!("{{{{#expr:{}1}}}}", "-".repeat(3000));
    assert_eq!(expander.expand_all(&text).unwrap(), EXPR_ERROR_MARKER);
}
