use std::sync::Arc;
use anyhow::Result;
use tracing::info;

use crate::config::TtsConfig;
use super::client::GoogleTtsClient;
use super::interface::SpeechSynthesizer;

/// Factory for creating TTS engines/clients
pub struct TtsFactory;

impl TtsFactory {
    /// `None` when speech output is switched off.
    pub fn create_tts(tts_config: &TtsConfig) -> Result<Option<Arc<dyn SpeechSynthesizer>>> {
        if !tts_config.enabled {
            info!("TTS disabled");
            return Ok(None);
        }
        info!("Initializing TTS engine: {}", tts_config.base_url);
        Ok(Some(Arc::new(GoogleTtsClient::new(tts_config)?)))
    }
}
