//! Document serializers.

use serde::Serialize;

use super::Document;
use crate::constants::FILE_SEPARATOR;
use crate::core::WikiError;

/// Output format of an extracted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Title line followed by the blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// `<doc>` envelope
    Doc,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    document_id: &'a str,
    title: &'a str,
    url: &'a str,
    language: Option<&'a str>,
    text: String,
}

/// Render one extracted document. The result always ends in a newline.
pub fn render(
    format: OutputFormat,
    document: &Document,
    blocks: &[String],
) -> Result<String, WikiError> {
    let body = blocks.join("\n");
    match format {
        OutputFormat::Text => Ok(format!("{}\n\n{body}\n{FILE_SEPARATOR}", document.title)),
        OutputFormat::Json => {
            let record = JsonRecord {
                document_id: &document.id,
                title: &document.title,
                url: &document.url,
                language: document.language.as_deref(),
                text: body,
            };
            Ok(format!("{}\n", serde_json::to_string(&record)?))
        }
        OutputFormat::Doc => Ok(format!(
            "<doc id=\"{}\" url=\"{}\" title=\"{}\">\n{}\n\n{body}\n</doc>\n",
            html_escape::encode_double_quoted_attribute(&document.id),
            html_escape::encode_double_quoted_attribute(&document.url),
            html_escape::encode_double_quoted_attribute(&document.title),
            document.title,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new("7", "Café \"Central\"", "")
            .with_url_base("https://en.wikipedia.org/wiki")
            .with_language(Some("en".to_string()))
    }

    fn blocks() -> Vec<String> {
        vec!["First paragraph.".to_string(), "Second.".to_string()]
    }

    #[test]
    fn test_text() {
        let out = render(OutputFormat::Text, &document(), &blocks()).unwrap();
        assert_eq!(out, "Café \"Central\"\n\nFirst paragraph.\nSecond.\n\n");
    }

    #[test]
    fn test_json() {
        let out = render(OutputFormat::Json, &document(), &blocks()).unwrap();
        assert!(out.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["document_id"], "7");
        assert_eq!(value["title"], "Café \"Central\"");
        assert_eq!(value["url"], "https://en.wikipedia.org/wiki?curid=7");
        assert_eq!(value["language"], "en");
        assert_eq!(value["text"], "First paragraph.\nSecond.");
    }

    #[test]
    fn test_json_without_language() {
        let doc = Document::new("1", "T", "");
        let out = render(OutputFormat::Json, &doc, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["language"].is_null());
        assert_eq!(value["text"], "");
    }

    #[test]
    fn test_doc_envelope_escapes_attributes() {
        let out = render(OutputFormat::Doc, &document(), &blocks()).unwrap();
        assert!(out.starts_with(
            "<doc id=\"7\" url=\"https://en.wikipedia.org/wiki?curid=7\" title=\"Café &quot;Central&quot;\">\n"
        ));
        assert!(out.ends_with("First paragraph.\nSecond.\n</doc>\n"));
    }
}
