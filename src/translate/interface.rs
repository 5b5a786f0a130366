use async_trait::async_trait;

use super::languages::Language;

/// A pretrained translation model behind some serving backend.
#[async_trait]
pub trait TranslationModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Translate `text` from `source` to `target`, returning decoded text
    /// without special tokens.
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, anyhow::Error>;
}
