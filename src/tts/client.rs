use async_trait::async_trait;
use anyhow::Context;
use reqwest::Client;
use tracing::debug;

use crate::config::TtsConfig;
use crate::translate::Language;
use crate::utils::sentence_divider::split_into_chunks;
use crate::utils::tts_preprocessor::{tts_filter, SpeechFilter};
use super::interface::SpeechSynthesizer;

/// Client for a gTTS-compatible `translate_tts` endpoint. Long text is
/// fetched in chunks and the MP3 streams are concatenated.
pub struct GoogleTtsClient {
    client: Client,
    base_url: String,
    max_chars: usize,
    slow: bool,
    filter: SpeechFilter,
}

impl GoogleTtsClient {
    pub fn new(config: &TtsConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build TTS HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_chars: config.max_chars_per_request,
            slow: config.slow,
            filter: SpeechFilter::default(),
        })
    }

    /// Text chunks that will be requested, in order.
    pub fn plan(&self, text: &str) -> Vec<String> {
        split_into_chunks(&tts_filter(text, self.filter), self.max_chars)
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, anyhow::Error> {
        let speed = if self.slow { "0.3" } else { "1" };
        let total_param = total.to_string();
        let idx_param = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
                ("total", total_param.as_str()),
                ("idx", idx_param.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("TTS service returned {} for chunk {}/{}", status, idx + 1, total);
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Language tag understood by the speech endpoint.
pub fn speech_language(language: Language) -> &'static str {
    match language {
        Language::Chinese => "zh-CN",
        other => other.code(),
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, anyhow::Error> {
        let chunks = self.plan(text);
        if chunks.is_empty() {
            anyhow::bail!("No speakable text");
        }
        let lang = speech_language(language);
        let total = chunks.len();
        debug!("Synthesizing {} chunk(s) in {}", total, lang);

        let parts = futures::future::try_join_all(
            chunks
                .iter()
                .enumerate()
                .map(|(idx, chunk)| self.fetch_chunk(chunk, lang, idx, total)),
        )
        .await?;

        Ok(parts.concat())
    }
}
