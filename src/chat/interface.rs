use async_trait::async_trait;

use crate::conversations::ConversationTurn;

/// A language model that can continue a conversation.
/// Stateless: the caller owns the history and passes it on every call.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Reply to `history`, whose last turn is the pending user message.
    async fn reply(&self, history: &[ConversationTurn]) -> Result<String, anyhow::Error>;

    /// One-shot completion for a bare prompt.
    async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error>;
}
