use whatlang::Lang;

use crate::error::AppError;
use super::languages::Language;

/// Outcome of language detection: either one of the supported languages
/// or the raw code of something we can't translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedLanguage {
    Supported(Language),
    Unsupported(String),
}

pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<DetectedLanguage, AppError>;
}

/// Detector backed by `whatlang` trigram profiles.
#[derive(Debug, Default, Clone)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<DetectedLanguage, AppError> {
        let info = whatlang::detect(text).ok_or(AppError::DetectionFailed)?;
        tracing::debug!(
            lang = info.lang().code(),
            confidence = info.confidence(),
            reliable = info.is_reliable(),
            "Detected language"
        );
        Ok(match supported(info.lang()) {
            Some(lang) => DetectedLanguage::Supported(lang),
            None => DetectedLanguage::Unsupported(short_code(info.lang()).to_string()),
        })
    }
}

fn supported(lang: Lang) -> Option<Language> {
    match lang {
        Lang::Eng => Some(Language::English),
        Lang::Fra => Some(Language::French),
        Lang::Spa => Some(Language::Spanish),
        Lang::Deu => Some(Language::German),
        Lang::Ita => Some(Language::Italian),
        Lang::Por => Some(Language::Portuguese),
        Lang::Rus => Some(Language::Russian),
        Lang::Cmn => Some(Language::Chinese),
        Lang::Jpn => Some(Language::Japanese),
        Lang::Ara => Some(Language::Arabic),
        _ => None,
    }
}

/// ISO 639-1 code where one exists, otherwise whatlang's 639-3 code.
fn short_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Epo => "eo",
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Ben => "bn",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ukr => "uk",
        Lang::Kat => "ka",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Heb => "he",
        Lang::Yid => "yi",
        Lang::Pol => "pl",
        Lang::Amh => "am",
        Lang::Jav => "jv",
        Lang::Kor => "ko",
        Lang::Nob => "nb",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Nld => "nl",
        Lang::Hun => "hu",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Bel => "be",
        Lang::Mar => "mr",
        Lang::Kan => "kn",
        Lang::Ron => "ro",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Mkd => "mk",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        Lang::Tam => "ta",
        Lang::Vie => "vi",
        Lang::Urd => "ur",
        Lang::Tha => "th",
        Lang::Guj => "gu",
        Lang::Uzb => "uz",
        Lang::Pan => "pa",
        Lang::Aze => "az",
        Lang::Ind => "id",
        Lang::Tel => "te",
        Lang::Pes => "fa",
        Lang::Mal => "ml",
        Lang::Ori => "or",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Sin => "si",
        Lang::Khm => "km",
        Lang::Tuk => "tk",
        Lang::Aka => "ak",
        Lang::Zul => "zu",
        Lang::Sna => "sn",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Slk => "sk",
        Lang::Cat => "ca",
        Lang::Tgl => "tl",
        Lang::Hye => "hy",
        #[allow(unreachable_patterns)]
        other => other.code(),
    }
}

/// Resolve detection into a language we can translate from.
pub fn resolve_detected(detected: DetectedLanguage) -> Result<Language, AppError> {
    match detected {
        DetectedLanguage::Supported(lang) => Ok(lang),
        DetectedLanguage::Unsupported(code) => Err(AppError::UnsupportedLanguage(code)),
    }
}
