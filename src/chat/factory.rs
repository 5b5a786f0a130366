use std::sync::Arc;
use anyhow::Result;
use tracing::info;

use crate::config::ChatConfig;
use crate::inference_service::InferenceServiceClient;
use super::causal_lm::CausalLmChat;
use super::interface::ChatModel;
use super::pipeline::PipelineChat;

/// Factory for creating chat model adapters
pub struct ChatModelFactory;

impl ChatModelFactory {
    pub fn create_chat_model(
        config: &ChatConfig,
        service: Arc<InferenceServiceClient>,
    ) -> Result<Arc<dyn ChatModel>> {
        info!("Initializing chat backend: {}", config.backend);

        match config.backend.as_str() {
            "causal_lm" | "gpt2" | "opt" => Ok(Arc::new(CausalLmChat::new(config, service))),
            "chat_pipeline" | "deepseek" => Ok(Arc::new(PipelineChat::new(config, service))),
            other => Err(anyhow::anyhow!("Unsupported chat backend: {}", other)),
        }
    }
}
