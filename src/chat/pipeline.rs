use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::ChatConfig;
use crate::conversations::ConversationTurn;
use crate::inference_service::{ChatCompletionRequest, InferenceServiceClient, Message};
use super::interface::ChatModel;

pub const NO_RESPONSE: &str = "No response.";

/// Chat through a role-aware text-generation pipeline (DeepSeek-R1 style):
/// the history goes over as role/content messages.
pub struct PipelineChat {
    service: Arc<InferenceServiceClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl PipelineChat {
    pub fn new(config: &ChatConfig, service: Arc<InferenceServiceClient>) -> Self {
        info!("Initialized PipelineChat: model={}", config.model);
        Self {
            service,
            model: config.model.clone(),
            max_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub fn build_request(&self, messages: Vec<Message>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    async fn send(&self, messages: Vec<Message>) -> Result<String, anyhow::Error> {
        let response = self
            .service
            .chat_completion(&self.build_request(messages))
            .await?;
        let reply = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_else(|| NO_RESPONSE.to_string());
        Ok(reply)
    }
}

pub fn to_messages(history: &[ConversationTurn]) -> Vec<Message> {
    history
        .iter()
        .map(|turn| Message {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        })
        .collect()
}

#[async_trait]
impl ChatModel for PipelineChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn reply(&self, history: &[ConversationTurn]) -> Result<String, anyhow::Error> {
        self.send(to_messages(history)).await
    }

    async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error> {
        self.send(vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;

    #[test]
    fn history_maps_to_role_messages() {
        let history = vec![
            ConversationTurn::user("Who are you?"),
            ConversationTurn::assistant("A model."),
            ConversationTurn::user("Which one?"),
        ];
        let messages = to_messages(&history);
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
        assert_eq!(messages[2].content, "Which one?");
    }

    #[test]
    fn request_carries_sampling_settings() {
        let config = ChatConfig {
            backend: "chat_pipeline".to_string(),
            model: "deepseek-ai/DeepSeek-R1".to_string(),
            ..ChatConfig::default()
        };
        let service = Arc::new(InferenceServiceClient::new(&InferenceConfig::default()).unwrap());
        let chat = PipelineChat::new(&config, service);
        let request = chat.build_request(Vec::new());
        assert_eq!(request.model, "deepseek-ai/DeepSeek-R1");
        assert_eq!(request.max_tokens, 50);
    }
}
