use chrono::{TimeZone, Utc};
use wikiextract::config::ExtractorConfig;
use wikiextract::core::{Discard, DiscardCause};
use wikiextract::scanner::balance_brackets;
use wikiextract::templating::functions::{sharp_if, sharp_ifeq, sharp_switch};
use wikiextract::templating::{
    ExpansionSettings, ExpansionStats, InMemoryTemplateStore, ParameterTable, TemplateExpander,
};
use wikiextract::test_utils::{init_test_logging, store_from};

fn settings(discard: &[&str]) -> ExpansionSettings {
    let mut config = ExtractorConfig::default();
    config.discard_templates.extend(discard.iter().map(ToString::to_string));
    ExpansionSettings::from_config(&config).unwrap()
}

fn expand_with(
    store: &InMemoryTemplateStore,
    settings: &ExpansionSettings,
    title: &str,
    text: &str,
) -> (Result<String, Discard>, ExpansionStats) {
    init_test_logging(None);
    let now = Utc.with_ymd_and_hms(2023, 11, 2, 15, 4, 5).unwrap();
    let mut expander = TemplateExpander::at(store, settings, title, now);
    let result = expander.expand_all(text);
    (result, expander.stats())
}

fn expand(templates: &[(&str, &str)], text: &str) -> String {
    let store = store_from(templates);
    expand_with(&store, &settings(&[]), "Sample page", text).0.unwrap()
}

#[test]
fn test_discard_propagates_from_nested_template() {
    let store = store_from(&[("X", "before {{deny}} after"), ("Wrapper", "[{{X}}]")]);
    let (result, stats) = expand_with(&store, &settings(&["deny"]), "Page", "intro {{Wrapper}} outro");

    let discard = result.unwrap_err();
    assert_eq!(discard.template, "deny");
    assert_eq!(discard.cause, DiscardCause::Template);
    assert_eq!(stats.discarded_by.as_deref(), Some("deny"));
}

#[test]
fn test_discard_inside_argument() {
    let store = store_from(&[("Box", "{{{1}}}")]);
    let (result, _) = expand_with(&store, &settings(&["deny"]), "Page", "{{Box|{{Deny}}}}");
    assert!(result.is_err());
}

#[test]
fn test_parameter_precedence() {
    let table = ParameterTable::bind(&["a", "b", "c", "2=B"]);
    assert_eq!(table.get("1"), Some("a"));
    assert_eq!(table.get("2"), Some("B"));
    assert_eq!(table.get("3"), Some("c"));
    assert_eq!(table.len(), 3);
}

#[test]
fn test_conditionals() {
    assert_eq!(sharp_if("", "yes", Some("no")), "no");
    assert_eq!(sharp_ifeq(" a ", "a", "match", "nomatch"), "match");
    let cases: Vec<String> = ["x=1", "y=2", "#default=9"].iter().map(ToString::to_string).collect();
    assert_eq!(sharp_switch("z", &cases), "9");
}

#[test]
fn test_parser_functions_through_expander() {
    assert_eq!(expand(&[], "{{#if:|yes|no}}"), "no");
    assert_eq!(expand(&[], "{{#ifeq: a |a|match|nomatch}}"), "match");
    assert_eq!(expand(&[], "{{#switch: b |a=1|b=2|#default=3}}"), "2");
    assert_eq!(expand(&[], "{{#expr: 2 * (3 + 4)}}"), "14");
    assert_eq!(expand(&[], "{{uc:paris}} {{lcfirst:Rome}}"), "PARIS rome");
}

#[test]
fn test_template_drives_parser_function() {
    let templates = [("Plural", "{{{1}}} {{#ifeq:{{{1}}}|1|item|items}}")];
    assert_eq!(expand(&templates, "{{plural|1}}, {{plural|3}}"), "1 item, 3 items");
}

#[test]
fn test_magic_words() {
    assert_eq!(expand(&[], "{{PAGENAME}} on {{SITENAME}}"), "Sample page on Wikipedia");
    assert_eq!(expand(&[], "{{CURRENTYEAR}}-{{CURRENTMONTH}}"), "2023-11");
    assert_eq!(expand(&[], "a{{!}}b"), "a|b");
}

#[test]
fn test_redirect_and_inclusion_control() {
    let templates = [
        ("Old name", "#REDIRECT [[Template:New name]]"),
        ("New name", "<noinclude>Documentation.</noinclude>Body {{{1}}}<includeonly>!</includeonly>"),
    ];
    assert_eq!(expand(&templates, "{{old name|one}}"), "Body one!");
}

#[test]
fn test_onlyinclude() {
    let templates = [("Partial", "hidden<onlyinclude>shown</onlyinclude>hidden")];
    assert_eq!(expand(&templates, "{{Partial}}"), "shown");
}

#[test]
fn test_missing_template_is_empty() {
    let store = InMemoryTemplateStore::new();
    let (result, stats) = expand_with(&store, &settings(&[]), "Page", "a{{Nowhere|x}}b");
    assert_eq!(result.unwrap(), "ab");
    assert_eq!(stats.cache_misses, 1);
    assert!(!stats.has_errors());
}

#[test]
fn test_subst_prefix() {
    assert_eq!(expand(&[("Greet", "Hi {{{1}}}")], "{{subst:Greet|Bo}}"), "Hi Bo");
}

#[test]
fn test_brace_rebalancing() {
    assert_eq!(balance_brackets("a}}b"), "{{a}}b");
    assert_eq!(balance_brackets("{{a"), "{{a}}");
    let once = balance_brackets("}x{{y");
    assert_eq!(balance_brackets(&once), once);
}
