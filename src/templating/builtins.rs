//! Pseudo-templates answered without a template body.
//!
//! These families show up constantly in article text but their real
//! definitions depend on modules and data tables that are not available
//! offline, so their visible text is computed directly from the arguments.
//! Every function receives the raw, unexpanded invocation parts (title first)
//! and degrades to an empty string on malformed input.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{CENTURY_BCE_SUFFIX, CENTURY_TEMPLATE, COORD_COMPONENT_SUFFIXES};
use crate::templating::locale::LocaleResolver;

static COORD_OPTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w*(=|:)\w*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoTemplate {
    /// `{{lang-fr|texte}}`
    LangVariant,
    /// `{{lang|fr|texte}}`
    Lang,
    /// `{{IPA-es|ˈmaðɾið}}`
    Ipa,
    /// `{{segle|XIX}}`
    Century,
    /// `{{coord|41|23|N|2|11|E}}`
    Coord,
    /// `{{audio|file.ogg|label}}`
    Audio,
}

fn has_prefix_ignore_case(title: &str, prefix: &str) -> bool {
    title.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

impl PseudoTemplate {
    /// Classify an expanded title by case-insensitive prefix.
    #[must_use]
    pub fn classify(title: &str) -> Option<Self> {
        if has_prefix_ignore_case(title, "lang-") {
            Some(Self::LangVariant)
        } else if has_prefix_ignore_case(title, "lang") {
            Some(Self::Lang)
        } else if has_prefix_ignore_case(title, "IPA") {
            Some(Self::Ipa)
        } else if has_prefix_ignore_case(title, CENTURY_TEMPLATE) {
            Some(Self::Century)
        } else if has_prefix_ignore_case(title, "coord") {
            Some(Self::Coord)
        } else if has_prefix_ignore_case(title, "audio") {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

fn part(parts: &[String], index: usize) -> Option<&str> {
    parts.get(index).map(String::as_str)
}

/// `{{lang-XX|text}}` -> `<language name>:text`.
///
/// Without a target language the template vanishes; an unknown code keeps
/// only the text.
#[must_use]
pub fn lang_variant(
    title: &str,
    parts: &[String],
    language: Option<&str>,
    locales: &dyn LocaleResolver,
) -> String {
    let Some(language) = language else {
        return String::new();
    };
    let text = part(parts, 1);
    let iso_code = title.split('-').nth(1).map(str::trim).unwrap_or_default();

    match (locales.display_name(iso_code, language), text) {
        (Some(name), Some(text)) => format!("{name}:{text}"),
        (None, Some(text)) => {
            tracing::debug!("no display name for language code '{iso_code}'");
            text.to_string()
        }
        (_, None) => String::new(),
    }
}

/// `{{lang|code|text}}` -> `text`.
#[must_use]
pub fn lang(parts: &[String]) -> String {
    part(parts, 2).unwrap_or_default().to_string()
}

/// `{{IPA|transcription}}` -> `transcription`.
#[must_use]
pub fn ipa(parts: &[String]) -> String {
    part(parts, 1).unwrap_or_default().to_string()
}

/// Label of a century whose numeral has already been upper-cased.
#[must_use]
pub fn century(numeral: &str, era: Option<&str>) -> String {
    let mut label = format!("{CENTURY_TEMPLATE} {numeral}");
    if era.is_some_and(|e| e.trim() == "-") {
        label.push_str(CENTURY_BCE_SUFFIX);
    }
    label
}

/// `{{audio|file|label}}` -> `label`, only in its three-part form.
#[must_use]
pub fn audio(parts: &[String]) -> String {
    if parts.len() == 3 { parts[2].clone() } else { String::new() }
}

fn is_direction(component: &str, letters: [char; 2]) -> bool {
    component.chars().next().is_some_and(|c| letters.contains(&c.to_ascii_uppercase()))
}

/// `{{coord|...}}` -> human-readable latitude and longitude.
///
/// The decimal form `{{coord|lat|lon}}` becomes `latºN, lon ºW`. Otherwise
/// degree, minute and second components are collected before the N/S marker
/// and before the E/W marker; the two halves must have the same number of
/// components.
#[must_use]
pub fn coord(parts: &[String]) -> String {
    if parts.len() == 3 {
        return format!("{}ºN, {} ºW", parts[1], parts[2]);
    }

    let mut latitude: Vec<&str> = Vec::new();
    let mut longitude: Vec<&str> = Vec::new();
    let mut latitude_dir = "";
    let mut longitude_dir = "";
    let mut latitude_done = false;

    for component in parts.iter().skip(1).map(|p| p.trim()) {
        if is_direction(component, ['N', 'S']) {
            latitude_dir = component;
            latitude_done = true;
        } else if !latitude_done {
            latitude.push(component);
        } else if is_direction(component, ['W', 'E']) {
            longitude_dir = component;
            break;
        } else if !COORD_OPTION.is_match(component) {
            longitude.push(component);
        } else {
            break;
        }
    }

    if latitude.iter().all(|c| c.is_empty()) || latitude.len() != longitude.len() {
        return String::new();
    }

    let mut first = String::new();
    let mut second = String::new();
    for ((lat, lon), suffix) in latitude.iter().zip(&longitude).zip(COORD_COMPONENT_SUFFIXES) {
        first.push_str(lat);
        first.push_str(suffix);
        second.push_str(lon);
        second.push_str(suffix);
    }
    first.push_str(latitude_dir);
    second.push_str(longitude_dir);
    format!("{first}, {second}")
}
