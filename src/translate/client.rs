use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{TranslationConfig, TranslationFamily};
use crate::inference_service::{InferenceServiceClient, TranslateRequest};
use super::interface::TranslationModel;
use super::languages::Language;

/// Translation adapter for hub-hosted seq2seq models (M2M100, MarianMT).
pub struct HubTranslator {
    service: Arc<InferenceServiceClient>,
    model: String,
    family: TranslationFamily,
    max_new_tokens: u32,
    truncation: bool,
}

impl HubTranslator {
    pub fn new(config: &TranslationConfig, service: Arc<InferenceServiceClient>) -> Self {
        info!(
            "Initialized HubTranslator: model={}, family={:?}",
            config.model, config.family
        );
        Self {
            service,
            model: config.model.clone(),
            family: config.family.clone(),
            max_new_tokens: config.max_new_tokens,
            truncation: config.truncation,
        }
    }

    /// Shape the request the way the model family expects its language
    /// metadata.
    pub fn build_request(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<TranslateRequest, anyhow::Error> {
        let request = match &self.family {
            TranslationFamily::M2m100 => TranslateRequest {
                model: self.model.clone(),
                inputs: text.to_string(),
                src_lang: Some(source.code().to_string()),
                forced_bos_token: Some(format!("__{}__", target.code())),
                truncation: self.truncation,
                max_new_tokens: self.max_new_tokens,
            },
            TranslationFamily::MarianMultilingual => TranslateRequest {
                model: self.model.clone(),
                inputs: format!(">{}< {}", source.code(), text),
                src_lang: None,
                forced_bos_token: None,
                truncation: true,
                max_new_tokens: self.max_new_tokens,
            },
            TranslationFamily::MarianPair { source: from, target: to } => {
                if !source.code().eq_ignore_ascii_case(from)
                    || !target.code().eq_ignore_ascii_case(to)
                {
                    anyhow::bail!(
                        "Model {} only translates {} to {}, not {} to {}",
                        self.model,
                        from,
                        to,
                        source,
                        target
                    );
                }
                TranslateRequest {
                    model: self.model.clone(),
                    inputs: text.to_string(),
                    src_lang: None,
                    forced_bos_token: None,
                    truncation: self.truncation,
                    max_new_tokens: self.max_new_tokens,
                }
            }
        };
        Ok(request)
    }
}

#[async_trait]
impl TranslationModel for HubTranslator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, anyhow::Error> {
        let request = self.build_request(text, source, target)?;
        debug!("Translating {} chars {} -> {}", text.chars().count(), source, target);
        let response = self.service.translate(&request).await?;
        Ok(response.translated_text.trim().to_string())
    }
}
