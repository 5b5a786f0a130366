use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::conversations::{ConversationTurn, Role};
use crate::inference_service::{GenerateRequest, InferenceServiceClient, SamplingParameters};
use super::interface::ChatModel;

const USER_PREFIX: &str = "User:";
const AI_PREFIX: &str = "AI:";

/// Chat on top of a plain causal LM (GPT-2, OPT): the history is flattened
/// into a `User:` / `AI:` transcript and the model continues it.
pub struct CausalLmChat {
    service: Arc<InferenceServiceClient>,
    model: String,
    parameters: SamplingParameters,
}

impl CausalLmChat {
    pub fn new(config: &ChatConfig, service: Arc<InferenceServiceClient>) -> Self {
        info!(
            "Initialized CausalLmChat: model={}, temperature={}, top_p={}",
            config.model, config.temperature, config.top_p
        );
        Self {
            service,
            model: config.model.clone(),
            parameters: SamplingParameters {
                max_new_tokens: config.max_new_tokens,
                do_sample: config.do_sample,
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                repetition_penalty: config.repetition_penalty,
                return_full_text: true,
            },
        }
    }

    async fn generate(&self, inputs: String) -> Result<String, anyhow::Error> {
        let request = GenerateRequest {
            model: self.model.clone(),
            inputs,
            parameters: self.parameters.clone(),
        };
        let response = self.service.generate(&request).await?;
        Ok(response.generated_text)
    }
}

/// Flatten the history into the prompt the model continues.
pub fn render_transcript(history: &[ConversationTurn]) -> String {
    let mut transcript = String::new();
    for turn in history {
        let prefix = match turn.role {
            Role::User => USER_PREFIX,
            Role::Assistant => AI_PREFIX,
        };
        transcript.push_str(prefix);
        transcript.push(' ');
        transcript.push_str(&turn.content);
        transcript.push('\n');
    }
    transcript.push_str(AI_PREFIX);
    transcript.push(' ');
    transcript
}

/// The reply is whatever follows the last `AI:` marker.
pub fn extract_reply(generated: &str) -> String {
    generated
        .rsplit(AI_PREFIX)
        .next()
        .unwrap_or(generated)
        .trim()
        .to_string()
}

#[async_trait]
impl ChatModel for CausalLmChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn reply(&self, history: &[ConversationTurn]) -> Result<String, anyhow::Error> {
        let transcript = render_transcript(history);
        debug!("Generating reply from a {}-turn transcript", history.len());
        let generated = self.generate(transcript).await?;
        Ok(extract_reply(&generated))
    }

    async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error> {
        // Prompt plus continuation, as the model returns it
        self.generate(prompt.to_string()).await
    }
}
