//! The fixed language table offered by the translation form.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "LanguageEntry")]
pub enum Language {
    English,
    French,
    Spanish,
    German,
    Italian,
    Portuguese,
    Russian,
    Chinese,
    Japanese,
    Arabic,
}

/// Display order of the language selects.
pub const LANGUAGES: [Language; 10] = [
    Language::English,
    Language::French,
    Language::Spanish,
    Language::German,
    Language::Italian,
    Language::Portuguese,
    Language::Russian,
    Language::Chinese,
    Language::Japanese,
    Language::Arabic,
];

pub const AUTO: &str = "auto";

impl Language {
    /// ISO 639-1 code, also the model's language id.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Arabic => "ar",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Arabic => "Arabic",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        LANGUAGES
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    pub fn all() -> &'static [Language] {
        &LANGUAGES
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Serialize)]
struct LanguageEntry {
    name: &'static str,
    code: &'static str,
}

impl From<Language> for LanguageEntry {
    fn from(lang: Language) -> Self {
        Self {
            name: lang.name(),
            code: lang.code(),
        }
    }
}

/// Source language as picked in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelection {
    Auto,
    Fixed(Language),
}

impl SourceSelection {
    /// `None` for a code outside the table.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case(AUTO) {
            Some(SourceSelection::Auto)
        } else {
            Language::from_code(value).map(SourceSelection::Fixed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_ten_languages_in_form_order() {
        let codes: Vec<_> = Language::all().iter().map(|l| l.code()).collect();
        assert_eq!(codes, ["en", "fr", "es", "de", "it", "pt", "ru", "zh", "ja", "ar"]);
    }

    #[test]
    fn codes_round_trip() {
        for lang in Language::all() {
            assert_eq!(Language::from_code(lang.code()), Some(*lang));
        }
    }

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(Language::from_code("FR"), Some(Language::French));
        assert_eq!(Language::from_code(" de "), Some(Language::German));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(Language::from_code("ko"), None);
        assert_eq!(Language::from_code(""), None);
        assert_eq!(Language::from_code("English"), None);
    }

    #[test]
    fn source_selection() {
        assert_eq!(SourceSelection::parse("auto"), Some(SourceSelection::Auto));
        assert_eq!(
            SourceSelection::parse("ja"),
            Some(SourceSelection::Fixed(Language::Japanese))
        );
        assert_eq!(SourceSelection::parse("xx"), None);
    }

    #[test]
    fn serializes_as_name_and_code() {
        let value = serde_json::to_value(Language::Arabic).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Arabic", "code": "ar"}));
    }
}
