use wikiextract::config::ExtractorConfig;
use wikiextract::extractor::{Document, Extractor, OutputFormat, Outcome, render};
use wikiextract::test_utils::{init_test_logging, plain_config, store_from};

const ARTICLE: &str = "\
{{Infobox settlement|name=Paris|population=2,102,650}}
'''Paris''' is the [[capital city|capital]] of [[France]].<ref>{{cite web|url=https://x.org}}</ref> \
It has a population of {{convert|2.1|million}}.
<!-- editors: keep this short -->
== History ==
The city was founded as ''Lutetia''.

== Gallery ==

== References ==
{{reflist}}
* [https://example.org An example source]
[[Category:Capitals in Europe]]
";

fn templates() -> wikiextract::templating::InMemoryTemplateStore {
    store_from(&[("Convert", "{{{1}}} {{{2}}}"), ("Reflist", "(refs)")])
}

fn config() -> ExtractorConfig {
    let mut config = plain_config();
    config.discard_sections.insert("References".to_string());
    config.discard_templates.insert("Disambiguation".to_string());
    config
}

#[test]
fn test_article_end_to_end() {
    init_test_logging(None);
    let extractor = Extractor::new(&config()).unwrap();
    let document = Document::new("681159", "Paris", ARTICLE);
    let extraction = extractor.extract(&templates(), &document);

    assert_eq!(
        extraction.blocks().unwrap(),
        [
            "Paris is the capital of France. It has a population of 2.1 million.",
            "",
            "History.",
            "The city was founded as \"Lutetia\".",
        ]
    );
}

#[test]
fn test_markdown_headers_and_links() {
    let mut config = config();
    config.output.markdown_headers = true;
    config.output.keep_links = true;
    let extractor = Extractor::new(&config).unwrap();
    let document = Document::new("1", "Paris", "See [[Eiffel Tower]].\n== Sights ==\nMany.");
    let extraction = extractor.extract(&templates(), &document);

    assert_eq!(
        extraction.blocks().unwrap(),
        ["See <a href=\"Eiffel+Tower\">Eiffel Tower</a>.", "", "## Sights.", "Many."]
    );
}

#[test]
fn test_disambiguation_page_is_discarded() {
    let extractor = Extractor::new(&config()).unwrap();
    let store = store_from(&[("Disambig", "{{Disambiguation}}")]);
    let document = Document::new("2", "Mercury", "'''Mercury''' may refer to:\n* a planet\n{{disambig}}");
    let extraction = extractor.extract(&store, &document);

    match extraction.outcome {
        Outcome::Discarded(discard) => assert_eq!(discard.template, "Disambiguation"),
        Outcome::Extracted(blocks) => panic!("expected a discard, got {blocks:?}"),
    }
}

#[test]
fn test_self_recursive_template_discards_document() {
    let extractor = Extractor::new(&config()).unwrap();
    let store = store_from(&[("Again", "more {{again|{{{1}}}x}}")]);
    let document = Document::new("3", "Loop", "start {{again|a}}");
    let extraction = extractor.extract(&store, &document);

    assert!(extraction.is_discarded());
    assert_eq!(extraction.stats.template_depth_exceeded, 1);
}

#[test]
fn test_html_safe_escapes_output() {
    let mut config = config();
    config.output.html_safe = true;
    let extractor = Extractor::new(&config).unwrap();
    let document = Document::new("4", "Inequality", "We know that 1 &lt; 2 &amp; 3 &gt; 2.");
    let extraction = extractor.extract(&templates(), &document);
    assert_eq!(extraction.blocks().unwrap(), ["We know that 1 &lt; 2 &amp; 3 &gt; 2."]);
}

#[test]
fn test_serialized_json_document() {
    let extractor = Extractor::new(&config()).unwrap();
    let document = Document::new("12", "Lyon", "'''Lyon''' is a city.")
        .with_url_base("https://fr.wikipedia.org/wiki")
        .with_language(Some("fr".to_string()));
    let extraction = extractor.extract(&templates(), &document);
    let json = render(OutputFormat::Json, &document, extraction.blocks().unwrap()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["document_id"], "12");
    assert_eq!(value["url"], "https://fr.wikipedia.org/wiki?curid=12");
    assert_eq!(value["language"], "fr");
    assert_eq!(value["text"], "Lyon is a city.");
}
