//! Test doubles shared by the core's unit tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Sent { msg: MessageRef, html: String },
    Edited { msg: MessageRef, html: String },
}

#[derive(Default)]
pub struct RecordingMessenger {
    next_id: Mutex<i32>,
    log: Mutex<Vec<Outbound>>,
    fail_edits: AtomicBool,
    fail_sends: AtomicBool,
}

impl RecordingMessenger {
    pub fn failing_edits() -> Self {
        let m = Self::default();
        m.fail_edits.store(true, Ordering::SeqCst);
        m
    }

    pub fn failing_sends() -> Self {
        let m = Self::default();
        m.fail_sends.store(true, Ordering::SeqCst);
        m
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub fn log(&self) -> Vec<Outbound> {
        self.log.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(MessageRef, String)> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Sent { msg, html } => Some((msg, html)),
                Outbound::Edited { .. } => None,
            })
            .collect()
    }

    pub fn sent_texts(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(m, _)| m.chat_id == chat_id)
            .map(|(_, html)| html)
            .collect()
    }

    pub fn edits_of(&self, msg: MessageRef) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Edited { msg: m, html } if m == msg => Some(html),
                _ => None,
            })
            .collect()
    }

    pub fn edit_count(&self) -> usize {
        self.log()
            .iter()
            .filter(|o| matches!(o, Outbound::Edited { .. }))
            .count()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::External("send rejected".to_string()));
        }
        let msg = self.alloc(chat_id);
        self.log.lock().unwrap().push(Outbound::Sent {
            msg,
            html: html.to_string(),
        });
        Ok(msg)
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(Error::External("edit rejected".to_string()));
        }
        self.log.lock().unwrap().push(Outbound::Edited {
            msg,
            html: html.to_string(),
        });
        Ok(())
    }
}
