//! Telegram update handlers.
//!
//! Each message is converted into a transport-neutral `IncomingUpdate` and
//! handed to the core router. Failures are logged and end with this update.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use gbot_core::{
    domain::{ChatId, UserId},
    messaging::types::IncomingUpdate,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = to_update(&msg) else {
        return Ok(());
    };

    let chat_id = update.chat_id().0;
    if let Err(e) = state.bot.handle(update).await {
        tracing::warn!(chat_id, error = %e, "update handling failed");
    }
    Ok(())
}

/// Only text messages with a known sender are routed; everything else is dropped.
fn to_update(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;
    Some(update_from_parts(
        msg.chat.id.0,
        user.id.0,
        user.username.clone(),
        text,
    ))
}

fn update_from_parts(
    chat_id: i64,
    user_id: u64,
    username: Option<String>,
    text: &str,
) -> IncomingUpdate {
    IncomingUpdate::from_text(ChatId(chat_id), UserId(user_id as i64), username, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbot_core::messaging::types::{Command, TextMessage};

    #[test]
    fn command_text_routes_as_command() {
        let u = update_from_parts(-100123, 42, Some("ann".to_string()), "/listaccounts@demo_bot");
        assert_eq!(
            u,
            IncomingUpdate::Command(Command {
                chat_id: ChatId(-100123),
                user_id: UserId(42),
                username: Some("ann".to_string()),
                name: "listaccounts".to_string(),
            })
        );
    }

    #[test]
    fn plain_text_routes_as_text() {
        let u = update_from_parts(7, 7, None, "5");
        assert_eq!(
            u,
            IncomingUpdate::Text(TextMessage {
                chat_id: ChatId(7),
                user_id: UserId(7),
                username: None,
                text: "5".to_string(),
            })
        );
    }
}
