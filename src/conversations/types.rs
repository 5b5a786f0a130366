use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered history of one chat session.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    last_active: DateTime<Utc>,
    max_turns: usize,
}

impl Conversation {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            last_active: Utc::now(),
            max_turns,
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Append a completed user/assistant exchange, dropping the oldest
    /// exchanges once `max_turns` is exceeded.
    pub fn push_exchange(&mut self, user: ConversationTurn, assistant: ConversationTurn) {
        self.turns.push(user);
        self.turns.push(assistant);
        if self.max_turns > 0 && self.turns.len() > self.max_turns {
            let mut excess = self.turns.len() - self.max_turns;
            // keep pairs aligned
            excess += excess % 2;
            self.turns.drain(..excess.min(self.turns.len()));
        }
        self.touch();
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.touch();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchanges_append_in_order() {
        let mut conversation = Conversation::new(0);
        conversation.push_exchange(ConversationTurn::user("hi"), ConversationTurn::assistant("hello"));
        conversation.push_exchange(ConversationTurn::user("how are you"), ConversationTurn::assistant("fine"));

        let roles: Vec<_> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(conversation.turns()[2].content, "how are you");
    }

    #[test]
    fn bounded_history_drops_oldest_pairs() {
        let mut conversation = Conversation::new(4);
        for i in 0..3 {
            conversation.push_exchange(
                ConversationTurn::user(format!("q{i}")),
                ConversationTurn::assistant(format!("a{i}")),
            );
        }
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.turns()[0].content, "q1");
        assert_eq!(conversation.turns()[0].role, Role::User);
    }

    #[test]
    fn odd_limit_still_keeps_pairs() {
        let mut conversation = Conversation::new(3);
        for i in 0..3 {
            conversation.push_exchange(
                ConversationTurn::user(format!("q{i}")),
                ConversationTurn::assistant(format!("a{i}")),
            );
        }
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.turns()[0].content, "q2");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
        assert_eq!(Role::User.as_str(), "user");
    }
}
