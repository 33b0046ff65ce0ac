use crate::domain::{ChatId, UserId};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: String,
}

impl IncomingUpdate {
    /// Classify raw message text: `/name@bot args` becomes a command, anything
    /// else is plain text.
    pub fn from_text(
        chat_id: ChatId,
        user_id: UserId,
        username: Option<String>,
        text: &str,
    ) -> Self {
        if text.trim_start().starts_with('/') {
            let (name, _args) = crate::commands::parse_command(text);
            return IncomingUpdate::Command(Command {
                chat_id,
                user_id,
                username,
                name,
            });
        }

        IncomingUpdate::Text(TextMessage {
            chat_id,
            user_id,
            username,
            text: text.to_string(),
        })
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.chat_id,
            IncomingUpdate::Text(t) => t.chat_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_text_becomes_command() {
        let u = IncomingUpdate::from_text(ChatId(10), UserId(7), None, "/createbulk@demo_bot now");
        assert_eq!(
            u,
            IncomingUpdate::Command(Command {
                chat_id: ChatId(10),
                user_id: UserId(7),
                username: None,
                name: "createbulk".to_string(),
            })
        );
    }

    #[test]
    fn plain_text_stays_text() {
        let u = IncomingUpdate::from_text(ChatId(10), UserId(7), Some("ann".into()), "3");
        assert_eq!(u.chat_id(), ChatId(10));
        assert!(matches!(u, IncomingUpdate::Text(t) if t.user_id == UserId(7) && t.text == "3"));
    }
}
