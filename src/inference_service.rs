use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::InferenceConfig;

/// HTTP client for the model-serving service that hosts the pretrained
/// translation and language models.
#[derive(Debug, Clone)]
pub struct InferenceServiceClient {
    client: Client,
    base_url: String,
    permits: Arc<Semaphore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub model: String,
    pub inputs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_bos_token: Option<String>,
    pub truncation: bool,
    pub max_new_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// Generation knobs forwarded untouched to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingParameters {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    pub return_full_text: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub inputs: String,
    pub parameters: SamplingParameters,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: Message,
}

impl InferenceServiceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build inference HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse> {
        self.post_json("translate", request).await
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.post_json("generate", request).await
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post_json("v1/chat/completions", request).await
    }

    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        // Bounded fan-out towards the model server
        let _permit = self.permits.acquire().await?;
        debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", path, status, body.trim());
        }
        let result = response
            .json::<Resp>()
            .await
            .with_context(|| format!("Malformed response from {}", path))?;
        Ok(result)
    }
}
