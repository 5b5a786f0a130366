pub mod interface;
pub mod client;
pub mod factory;
pub mod assets;

pub use interface::SpeechSynthesizer;
pub use factory::TtsFactory;
pub use assets::AudioAssetStore;
