//! Label translation for the rendered directory.
//!
//! Every label printed in the PDF goes through a [`Translator`] bound to one
//! [`Language`]. Dictionaries are static tables built once on first use and
//! never mutated. Adding a language means adding a [`Language`] variant and
//! one entry in [`dictionary_for`]; nothing else in the pipeline changes.
//!
//! Compound labels such as `"Phone (work, mobile)"` are not looked up as
//! opaque strings: the base label and each type tag are translated on their
//! own and reassembled, so a tag combination never seen before still comes
//! out fully localized.

use crate::error::ScribeError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Output languages with a label dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default).
    #[default]
    En,
    /// Spanish.
    Es,
}

/// Ordered list of supported languages.
pub const SUPPORTED_LANGUAGES: &[Language] = &[Language::En, Language::Es];

impl Language {
    pub const fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Parse a language code (case-insensitive, tolerant of region tags like
    /// `es-ES` or `en_GB`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|l| l.code() == lang)
    }

    /// Comma-separated list of supported codes, for error messages.
    pub fn supported_codes() -> String {
        SUPPORTED_LANGUAGES
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::parse(s).ok_or_else(|| ScribeError::UnsupportedLanguage {
            code: s.to_string(),
            supported: Language::supported_codes(),
        })
    }
}

/// Canonical label → localized display string, for one language.
pub type LabelDictionary = HashMap<&'static str, &'static str>;

// ── Dictionaries ─────────────────────────────────────────────────────────

// English canonical labels map to themselves; the Spanish column headers of
// common phone exports map to their English equivalents.
const EN_ENTRIES: &[(&str, &str)] = &[
    ("Export date", "Export date"),
    ("First name", "First name"),
    ("Last name", "Last name"),
    ("Display name", "Display name"),
    ("Nickname", "Nickname"),
    ("Phone", "Phone"),
    ("Email", "Email"),
    ("Address", "Address"),
    ("Organization", "Organization"),
    ("Title", "Title"),
    ("Note", "Note"),
    ("Birthday", "Birthday"),
    ("Website", "Website"),
    ("work", "work"),
    ("home", "home"),
    ("mobile", "mobile"),
    ("cell", "cell"),
    ("fax", "fax"),
    ("voice", "voice"),
    ("pref", "pref"),
    ("internet", "internet"),
    ("other", "other"),
    ("Nombre", "First name"),
    ("Apellidos", "Last name"),
    ("Nombre completo", "Full name"),
    ("Nombre mostrado", "Display name"),
    ("Apodo", "Nickname"),
    ("Teléfono", "Phone"),
    ("Teléfono particular", "Home phone"),
    ("Teléfono móvil", "Mobile phone"),
    ("Dirección de correo electrónico principal", "Primary email"),
    ("Dirección de correo electrónico secundaria", "Secondary email"),
    ("Dirección personal", "Home address"),
    ("Dirección personal 2", "Home address 2"),
    ("Dirección de trabajo", "Work address"),
    ("Dirección de trabajo 2", "Work address 2"),
    ("Ciudad donde vive", "City"),
    ("Ciudad", "City"),
    ("Provincia", "Region"),
    ("Código postal", "Postal code"),
    ("País de residencia", "Country"),
    ("País", "Country"),
    ("Puesto", "Title"),
    ("Departamento", "Department"),
    ("Organización", "Organization"),
    ("Página web 1", "Website 1"),
    ("Página web 2", "Website 2"),
    ("Notas", "Notes"),
    ("Día de nacimiento", "Birth day"),
    ("Mes de nacimiento", "Birth month"),
    ("Año de nacimiento", "Birth year"),
    ("Fecha de nacimiento", "Birthday"),
    ("Trabajo", "Work"),
    ("Particular", "Home"),
    ("Móvil", "Mobile"),
];

const ES_ENTRIES: &[(&str, &str)] = &[
    ("Export date", "Fecha de exportación"),
    ("First name", "Nombre"),
    ("Last name", "Apellidos"),
    ("Display name", "Nombre mostrado"),
    ("Nickname", "Apodo"),
    ("Phone", "Teléfono"),
    ("Email", "Correo electrónico"),
    ("Address", "Dirección"),
    ("Organization", "Organización"),
    ("Title", "Puesto"),
    ("Note", "Nota"),
    ("Birthday", "Fecha de nacimiento"),
    ("Website", "Página web"),
    ("work", "Trabajo"),
    ("home", "Particular"),
    ("mobile", "Móvil"),
    ("cell", "Móvil"),
    ("fax", "Fax"),
    ("voice", "Voz"),
    ("pref", "Preferido"),
    ("internet", "Internet"),
    ("other", "Otro"),
];

static EN: Lazy<LabelDictionary> = Lazy::new(|| EN_ENTRIES.iter().copied().collect());
static ES: Lazy<LabelDictionary> = Lazy::new(|| ES_ENTRIES.iter().copied().collect());

/// The static dictionary registered for `language`.
pub fn dictionary_for(language: Language) -> &'static LabelDictionary {
    match language {
        Language::En => &EN,
        Language::Es => &ES,
    }
}

// ── Translator ───────────────────────────────────────────────────────────

/// Translates field labels into one language. Never fails: unknown labels
/// and tags come back unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    dictionary: Option<&'static LabelDictionary>,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self {
            dictionary: Some(dictionary_for(language)),
        }
    }

    /// Bind to a raw language code; unknown codes give the identity translator.
    pub fn for_code(code: &str) -> Self {
        match Language::parse(code) {
            Some(lang) => Self::new(lang),
            None => Self::identity(),
        }
    }

    pub fn identity() -> Self {
        Self { dictionary: None }
    }

    /// Translate a plain or compound (`"Base (tag1, tag2)"`) label.
    pub fn translate(&self, label: &str) -> String {
        let Some(dict) = self.dictionary else {
            return label.to_string();
        };
        if let Some(hit) = dict.get(label) {
            return (*hit).to_string();
        }

        let Some((base, rest)) = label.split_once('(') else {
            return label.to_string();
        };
        let tags = rest.strip_suffix(')').unwrap_or(rest);
        let base = base.trim_end();
        let base = dict.get(base).copied().unwrap_or(base);
        let tags = tags
            .split(',')
            .map(|t| translate_tag(dict, t.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{base} ({tags})")
    }
}

/// Tags keep their source case (`WORK`, `cell`), so try the exact text
/// first and then its lowercase form.
fn translate_tag(dict: &LabelDictionary, tag: &str) -> String {
    if let Some(hit) = dict.get(tag) {
        return (*hit).to_string();
    }
    let lower = tag.to_lowercase();
    dict.get(lower.as_str())
        .map(|hit| (*hit).to_string())
        .unwrap_or_else(|| tag.to_string())
}

/// One-shot helper: translate `label` into the language named by `code`.
pub fn translate(label: &str, code: &str) -> String {
    Translator::for_code(code).translate(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_canonical_labels_are_identity() {
        let tr = Translator::new(Language::En);
        for (key, value) in EN_ENTRIES {
            if key == value {
                assert_eq!(tr.translate(key), *key);
            }
        }
    }

    #[test]
    fn compound_label_to_spanish() {
        assert_eq!(
            translate("Phone (work, mobile)", "es"),
            "Teléfono (Trabajo, Móvil)"
        );
    }

    #[test]
    fn compound_tags_fall_back_case_insensitively() {
        assert_eq!(translate("Phone (WORK)", "es"), "Teléfono (Trabajo)");
        assert_eq!(translate("Email (INTERNET, x-custom)", "es"), "Correo electrónico (Internet, x-custom)");
    }

    #[test]
    fn empty_parenthetical_survives() {
        assert_eq!(translate("Phone ()", "es"), "Teléfono ()");
    }

    #[test]
    fn unknown_language_is_identity() {
        assert_eq!(translate("Phone (work)", "fr"), "Phone (work)");
        assert_eq!(translate("Export date", ""), "Export date");
    }

    #[test]
    fn spanish_headers_read_as_english() {
        assert_eq!(translate("Teléfono (Trabajo)", "en"), "Phone (Work)");
        assert_eq!(translate("Nombre mostrado", "en"), "Display name");
        assert_eq!(translate("Día de nacimiento", "en"), "Birth day");
        assert_eq!(translate("Mes de nacimiento", "en"), "Birth month");
        assert_eq!(translate("Año de nacimiento", "en"), "Birth year");
    }

    #[test]
    fn unknown_label_passes_through() {
        assert_eq!(translate("Custom field", "es"), "Custom field");
    }

    #[test]
    fn parse_language_codes() {
        assert_eq!(Language::parse("ES"), Some(Language::Es));
        assert_eq!(Language::parse("en_GB"), Some(Language::En));
        assert_eq!(Language::parse("fr"), None);
        assert!("de".parse::<Language>().is_err());
        assert_eq!("es".parse::<Language>().unwrap(), Language::Es);
    }
}
