use std::sync::Arc;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::chat::{ChatModel, ChatModelFactory};
use crate::config::Config;
use crate::conversations::SessionStore;
use crate::inference_service::InferenceServiceClient;
use crate::translate::{HubTranslator, LanguageDetector, TranslationModel, WhatlangDetector};
use crate::tts::{AudioAssetStore, SpeechSynthesizer, TtsFactory};

/// URL prefix the static directory is mounted under.
pub const STATIC_URL_PREFIX: &str = "/static";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub inference: Arc<InferenceServiceClient>,
    pub translator: Arc<dyn TranslationModel>,
    pub detector: Arc<dyn LanguageDetector>,
    pub chat_model: Arc<dyn ChatModel>,
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
    pub audio_assets: Arc<AudioAssetStore>,
    pub sessions: Arc<SessionStore>,
}

/// The model-facing parts of the state, swappable as a unit.
pub struct Backends {
    pub translator: Arc<dyn TranslationModel>,
    pub detector: Arc<dyn LanguageDetector>,
    pub chat_model: Arc<dyn ChatModel>,
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let inference = Arc::new(InferenceServiceClient::new(&config.inference_config)?);
        let backends = Backends {
            translator: Arc::new(HubTranslator::new(
                &config.translation_config,
                inference.clone(),
            )),
            detector: Arc::new(WhatlangDetector::new()),
            chat_model: ChatModelFactory::create_chat_model(&config.chat_config, inference.clone())?,
            tts: TtsFactory::create_tts(&config.tts_config)?,
        };

        let state = Self::from_parts(config, inference, backends);
        state.audio_assets.adopt_existing().await?;
        Ok(state)
    }

    pub fn from_parts(
        config: Config,
        inference: Arc<InferenceServiceClient>,
        backends: Backends,
    ) -> Self {
        let audio_assets = Arc::new(AudioAssetStore::new(
            &config.system_config.static_dir,
            STATIC_URL_PREFIX,
            &config.asset_config,
        ));
        let sessions = Arc::new(SessionStore::new(&config.session_config));

        Self {
            config: Arc::new(config),
            inference,
            translator: backends.translator,
            detector: backends.detector,
            chat_model: backends.chat_model,
            tts: backends.tts,
            audio_assets,
            sessions,
        }
    }

    /// Periodically evict expired speech assets and idle chat sessions.
    pub fn spawn_housekeeping(&self) -> JoinHandle<()> {
        let assets = self.audio_assets.clone();
        let sessions = self.sessions.clone();
        let period = self.config.asset_config.sweep_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!("Housekeeping every {:?}", period);
            loop {
                ticker.tick().await;
                let now = Utc::now();
                let assets_evicted = assets.evict_expired(now).await;
                let sessions_evicted = sessions.evict_idle(now);
                if assets_evicted + sessions_evicted > 0 {
                    info!(
                        "Housekeeping removed {} speech assets and {} idle sessions",
                        assets_evicted, sessions_evicted
                    );
                }
            }
        })
    }
}
