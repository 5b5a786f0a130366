pub mod languages;
pub mod detect;
pub mod interface;
pub mod client;

pub use languages::{Language, SourceSelection};
pub use detect::{LanguageDetector, WhatlangDetector};
pub use interface::TranslationModel;
pub use client::HubTranslator;
