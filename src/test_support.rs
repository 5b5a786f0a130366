//! In-process fakes for the model backends and a ready-made app around them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use tempfile::TempDir;

use crate::chat::ChatModel;
use crate::config::Config;
use crate::conversations::ConversationTurn;
use crate::error::AppError;
use crate::inference_service::InferenceServiceClient;
use crate::routes::build_app;
use crate::state::{AppState, Backends};
use crate::translate::detect::DetectedLanguage;
use crate::translate::{Language, LanguageDetector, TranslationModel};
use crate::tts::SpeechSynthesizer;

/// Echoes `[src->tgt] text`.
#[derive(Default)]
pub struct FakeTranslator {
    calls: AtomicUsize,
    last_pair: Mutex<Option<(Language, Language)>>,
}

impl FakeTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_pair(&self) -> Option<(Language, Language)> {
        *self.last_pair.lock().unwrap()
    }
}

#[async_trait]
impl TranslationModel for FakeTranslator {
    fn model_name(&self) -> &str {
        "fake-translator"
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_pair.lock().unwrap() = Some((source, target));
        Ok(format!("[{}->{}] {}", source.code(), target.code(), text))
    }
}

/// Returns whatever it was last told to. `Err(())` means detection failed.
pub struct FakeDetector {
    outcome: Mutex<Result<DetectedLanguage, ()>>,
}

impl FakeDetector {
    pub fn set(&self, outcome: Result<DetectedLanguage, ()>) {
        *self.outcome.lock().unwrap() = outcome;
    }
}

impl Default for FakeDetector {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(Ok(DetectedLanguage::Supported(Language::English))),
        }
    }
}

impl LanguageDetector for FakeDetector {
    fn detect(&self, _text: &str) -> Result<DetectedLanguage, AppError> {
        self.outcome
            .lock()
            .unwrap()
            .clone()
            .map_err(|_| AppError::DetectionFailed)
    }
}

/// Numbered replies for chat, `"{prompt} bright"` for completions.
#[derive(Default)]
pub struct FakeChat {
    replies: AtomicUsize,
    last_history_len: AtomicUsize,
    failing: AtomicBool,
}

impl FakeChat {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_history_len(&self) -> usize {
        self.last_history_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for FakeChat {
    fn model_name(&self) -> &str {
        "fake-chat"
    }

    async fn reply(&self, history: &[ConversationTurn]) -> Result<String, anyhow::Error> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("model unavailable");
        }
        self.last_history_len.store(history.len(), Ordering::SeqCst);
        let n = self.replies.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("reply #{n}"))
    }

    async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("model unavailable");
        }
        Ok(format!("{prompt} bright"))
    }
}

#[derive(Default)]
pub struct FakeTts {
    failing: AtomicBool,
}

impl FakeTts {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeTts {
    async fn synthesize(&self, _text: &str, _language: Language) -> Result<Vec<u8>, anyhow::Error> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("speech service returned 503");
        }
        Ok(b"ID3fake".to_vec())
    }
}

pub struct Fixture {
    pub app: Router,
    pub state: AppState,
    pub translator: Arc<FakeTranslator>,
    pub detector: Arc<FakeDetector>,
    pub chat: Arc<FakeChat>,
    pub tts: Arc<FakeTts>,
    pub static_dir: TempDir,
}

pub fn fixture() -> Fixture {
    let static_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.system_config.static_dir = static_dir.path().to_string_lossy().to_string();

    let inference = Arc::new(InferenceServiceClient::new(&config.inference_config).unwrap());
    let translator = Arc::new(FakeTranslator::default());
    let detector = Arc::new(FakeDetector::default());
    let chat = Arc::new(FakeChat::default());
    let tts = Arc::new(FakeTts::default());

    let state = AppState::from_parts(
        config,
        inference,
        Backends {
            translator: translator.clone(),
            detector: detector.clone(),
            chat_model: chat.clone(),
            tts: Some(tts.clone()),
        },
    );

    Fixture {
        app: build_app(state.clone()),
        state,
        translator,
        detector,
        chat,
        tts,
        static_dir,
    }
}
