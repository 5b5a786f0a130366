use serde::Deserialize;
use tracing::{debug, info};

use crate::conversations::{ConversationTurn, Session};
use crate::error::AppError;
use crate::render::TranslatePage;
use crate::state::AppState;
use crate::translate::detect::resolve_detected;
use crate::translate::languages::AUTO;
use crate::translate::{Language, SourceSelection};

pub const NO_PROMPT: &str = "No prompt provided";
pub const EMPTY_CHAT_PROMPT: &str = "Please enter a prompt.";

#[derive(Debug, Default, Deserialize)]
pub struct TranslateForm {
    #[serde(default)]
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiChatRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Run the translate form: detect, translate, speak. Errors end up on the
/// page next to whatever was produced before the failure.
pub async fn handle_translate(state: &AppState, form: TranslateForm) -> TranslatePage {
    let mut page = TranslatePage {
        input_text: form.text,
        source_lang: form.source_lang.unwrap_or_else(|| AUTO.to_string()),
        target_lang: form
            .target_lang
            .unwrap_or_else(|| Language::English.code().to_string()),
        ..TranslatePage::default()
    };

    if page.input_text.trim().is_empty() {
        return page;
    }

    if let Err(e) = translate_and_speak(state, &mut page).await {
        e.log();
        page.error = Some(e.to_string());
    }
    page
}

async fn translate_and_speak(state: &AppState, page: &mut TranslatePage) -> Result<(), AppError> {
    let target = Language::from_code(&page.target_lang)
        .ok_or_else(|| AppError::UnknownLanguage(page.target_lang.clone()))?;

    let selection = SourceSelection::parse(&page.source_lang)
        .ok_or_else(|| AppError::UnknownLanguage(page.source_lang.clone()))?;
    let source = match selection {
        SourceSelection::Fixed(lang) => lang,
        SourceSelection::Auto => {
            let lang = resolve_detected(state.detector.detect(&page.input_text)?)?;
            debug!("Auto-detected source language {}", lang);
            page.source_lang = lang.code().to_string();
            lang
        }
    };

    page.translation = state
        .translator
        .translate(&page.input_text, source, target)
        .await
        .map_err(AppError::Translation)?;
    info!(
        "Translated {} -> {} with {}",
        source,
        target,
        state.translator.model_name()
    );

    if page.translation.trim().is_empty() {
        return Ok(());
    }
    if let Some(tts) = &state.tts {
        let audio = tts
            .synthesize(&page.translation, target)
            .await
            .map_err(AppError::Synthesis)?;
        let asset = state.audio_assets.store(&audio).await?;
        page.audio_url = Some(asset.url);
    }
    Ok(())
}

pub fn validate_chat_prompt(prompt: &str) -> Result<&str, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation(EMPTY_CHAT_PROMPT.to_string()));
    }
    Ok(prompt)
}

/// One chat turn for `session`. Both turns are appended only once the model
/// has replied, so a failed turn leaves the history untouched.
pub async fn handle_chat_turn(
    state: &AppState,
    session: &Session,
    prompt: &str,
) -> Result<(), AppError> {
    let _turn = session.begin_turn().await;

    let user_turn = ConversationTurn::user(prompt);
    let mut history = session.turns();
    history.push(user_turn.clone());

    let reply = state
        .chat_model
        .reply(&history)
        .await
        .map_err(AppError::Generation)?;
    debug!("Session {} got a {}-char reply", session.id(), reply.chars().count());

    session.push_exchange(user_turn, ConversationTurn::assistant(reply));
    Ok(())
}

pub async fn handle_api_chat(state: &AppState, body: &[u8]) -> Result<String, AppError> {
    let invalid = || AppError::Validation("Invalid JSON body".to_string());
    let body: serde_json::Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    if !body.is_object() {
        return Err(invalid());
    }
    let request: ApiChatRequest = serde_json::from_value(body).map_err(|_| invalid())?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation(NO_PROMPT.to_string()));
    }

    state
        .chat_model
        .complete(prompt)
        .await
        .map_err(AppError::Generation)
}
