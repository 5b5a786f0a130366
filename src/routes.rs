use axum::{
    body::Bytes,
    extract::{Form, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::conversations::ConversationTurn;
use crate::error::AppError;
use crate::handlers::{self, ChatForm, TranslateForm};
use crate::render::{render_chat_page, render_translate_page, ChatPage, TranslatePage};
use crate::state::{AppState, STATIC_URL_PREFIX};
use crate::translate::Language;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let static_dir = state.config.system_config.static_dir.clone();

    Router::new()
        // Pages
        .route("/", get(translate_page).post(translate_submit))
        .route("/chat", get(chat_page).post(chat_submit))
        .route("/chat/reset", post(chat_reset))

        // JSON API
        .route("/api-chat", post(api_chat))
        .route("/api/health", get(health_check))
        .route("/api/languages", get(languages))

        // Generated speech
        .nest_service(STATIC_URL_PREFIX, ServeDir::new(static_dir))
}

/// Full application with middleware, ready to serve.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn translate_page() -> Html<String> {
    Html(render_translate_page(&TranslatePage::default()))
}

async fn translate_submit(
    State(state): State<AppState>,
    Form(form): Form<TranslateForm>,
) -> Html<String> {
    let page = handlers::handle_translate(&state, form).await;
    Html(render_translate_page(&page))
}

async fn chat_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let turns = session_turns(&state, session_id(&headers, &state));
    Html(render_chat_page(&ChatPage { turns, error: None }))
}

async fn chat_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let existing = session_id(&headers, &state);

    let prompt = match handlers::validate_chat_prompt(&form.prompt) {
        Ok(prompt) => prompt,
        Err(e) => {
            e.log();
            let turns = session_turns(&state, existing);
            return Html(render_chat_page(&ChatPage {
                turns,
                error: Some(e.to_string()),
            }))
            .into_response();
        }
    };

    let (session, created) = state.sessions.get_or_create(existing);
    let mut response = match handlers::handle_chat_turn(&state, &session, prompt).await {
        Ok(()) => Redirect::to("/chat").into_response(),
        Err(e) => {
            e.log();
            let turns = session.turns();
            Html(render_chat_page(&ChatPage {
                turns,
                error: Some(e.to_string()),
            }))
            .into_response()
        }
    };

    if created {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            state.config.session_config.cookie_name,
            session.id()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

async fn chat_reset(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = session_id(&headers, &state) {
        state.sessions.reset(&id);
    }
    Redirect::to("/chat")
}

async fn api_chat(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let response = handlers::handle_api_chat(&state, &body).await?;
    Ok(Json(json!({ "response": response })))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let inference_healthy = state.inference.health_check().await.unwrap_or(false);
    Json(json!({
        "status": "ok",
        "inference_service": inference_healthy
    }))
}

async fn languages() -> Json<&'static [Language]> {
    Json(Language::all())
}

/// Session id from the session cookie, if it is a well-formed UUID.
fn session_id(headers: &HeaderMap, state: &AppState) -> Option<Uuid> {
    let cookie_name = state.config.session_config.cookie_name.as_str();
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_turns(state: &AppState, id: Option<Uuid>) -> Vec<ConversationTurn> {
    match id {
        Some(id) => state.sessions.snapshot(&id),
        None => Vec::new(),
    }
}
