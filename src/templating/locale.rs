//! Language display names for `lang-XX` templates.

/// Resolves an ISO 639 code to a language name written in another language.
pub trait LocaleResolver: Send + Sync {
    /// Name of `iso_code` as written in `target`, e.g. (`fr`, `en`) -> `French`.
    fn display_name(&self, iso_code: &str, target: &str) -> Option<String>;
}

/// Name table for the most common codes in English, Catalan and Spanish.
///
/// Other target languages resolve nothing, so `lang-XX` keeps only its text.
/// A fuller resolver can be passed to
/// [`TemplateExpander::with_locales`](crate::templating::TemplateExpander::with_locales).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocales;

// (code, English, Catalan, Spanish)
const NAMES: &[(&str, &str, &str, &str)] = &[
    ("ar", "Arabic", "àrab", "árabe"),
    ("ca", "Catalan", "català", "catalán"),
    ("cs", "Czech", "txec", "checo"),
    ("cy", "Welsh", "gal·lès", "galés"),
    ("da", "Danish", "danès", "danés"),
    ("de", "German", "alemany", "alemán"),
    ("el", "Greek", "grec", "griego"),
    ("en", "English", "anglès", "inglés"),
    ("eo", "Esperanto", "esperanto", "esperanto"),
    ("es", "Spanish", "espanyol", "español"),
    ("et", "Estonian", "estonià", "estonio"),
    ("eu", "Basque", "basc", "euskera"),
    ("fa", "Persian", "persa", "persa"),
    ("fi", "Finnish", "finès", "finés"),
    ("fr", "French", "francès", "francés"),
    ("ga", "Irish", "irlandès", "irlandés"),
    ("gl", "Galician", "gallec", "gallego"),
    ("he", "Hebrew", "hebreu", "hebreo"),
    ("hi", "Hindi", "hindi", "hindi"),
    ("hu", "Hungarian", "hongarès", "húngaro"),
    ("hy", "Armenian", "armeni", "armenio"),
    ("is", "Icelandic", "islandès", "islandés"),
    ("it", "Italian", "italià", "italiano"),
    ("ja", "Japanese", "japonès", "japonés"),
    ("ko", "Korean", "coreà", "coreano"),
    ("la", "Latin", "llatí", "latín"),
    ("lt", "Lithuanian", "lituà", "lituano"),
    ("nl", "Dutch", "neerlandès", "neerlandés"),
    ("no", "Norwegian", "noruec", "noruego"),
    ("oc", "Occitan", "occità", "occitano"),
    ("pl", "Polish", "polonès", "polaco"),
    ("pt", "Portuguese", "portuguès", "portugués"),
    ("ro", "Romanian", "romanès", "rumano"),
    ("ru", "Russian", "rus", "ruso"),
    ("sa", "Sanskrit", "sànscrit", "sánscrito"),
    ("sv", "Swedish", "suec", "sueco"),
    ("tr", "Turkish", "turc", "turco"),
    ("uk", "Ukrainian", "ucraïnès", "ucraniano"),
    ("zh", "Chinese", "xinès", "chino"),
];

impl LocaleResolver for BuiltinLocales {
    fn display_name(&self, iso_code: &str, target: &str) -> Option<String> {
        let code = iso_code.trim().to_lowercase();
        let code = code.split(['_', '-']).next().unwrap_or_default();
        let target = target.trim().to_lowercase();
        let &(_, en, ca, es) = NAMES.iter().find(|(c, ..)| *c == code)?;
        let name = match target.split(['_', '-']).next().unwrap_or_default() {
            "en" => en,
            "ca" => ca,
            "es" => es,
            _ => return None,
        };
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let locales = BuiltinLocales;
        assert_eq!(locales.display_name("fr", "en").as_deref(), Some("French"));
        assert_eq!(locales.display_name("DE", "ca").as_deref(), Some("alemany"));
        assert_eq!(locales.display_name("pt_BR", "es").as_deref(), Some("portugués"));
    }

    #[test]
    fn test_unknown_code_or_target() {
        let locales = BuiltinLocales;
        assert_eq!(locales.display_name("grc", "en"), None);
        assert_eq!(locales.display_name("fr", "xx"), None);
    }
}
