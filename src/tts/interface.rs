use async_trait::async_trait;

use crate::translate::Language;

/// Text-to-speech engine producing MP3 audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text`, spoken in `language`, into MP3 bytes.
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, anyhow::Error>;
}
