//! Command router: one inbound update in, exactly one handler run.

use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    accounts::{Account, AccountStore},
    commands::BotCommand,
    config::Config,
    domain::ChatId,
    formatting::escape_html,
    messaging::{
        port::MessagingPort,
        types::{Command, IncomingUpdate, TextMessage},
    },
    session::{ChatLocks, ConversationKey, ConversationState, SessionEvent, SessionStore},
    status::StatusReporter,
    work::{parse_bulk_count, run_bulk, WorkSimulator, MAX_BULK_GROUPS},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkTiming {
    pub group_create: Duration,
    pub bulk_step: Duration,
}

impl Default for WorkTiming {
    fn default() -> Self {
        Self {
            group_create: Duration::from_millis(1500),
            bulk_step: Duration::from_millis(1000),
        }
    }
}

impl From<&Config> for WorkTiming {
    fn from(cfg: &Config) -> Self {
        Self {
            group_create: cfg.group_create_delay,
            bulk_step: cfg.bulk_step_delay,
        }
    }
}

const HELP_TEXT: &str = "🤖 <b>Online Group Bot (24/7)</b>\n\n\
I'm running on a free server! Always online.\n\n\
<b>Commands:</b>\n\
/addaccount - Add your Telegram account\n\
/creategroup - Create a single group\n\
/createbulk - Create multiple groups\n\
/listaccounts - Show your accounts\n\
/status - Check bot status\n\n\
📊 Status: ✅ Online 24/7";

const ADD_ACCOUNT_TEXT: &str = "📱 <b>Add Account Demo</b>\n\n\
Since this is a demo bot, accounts are stored temporarily.\n\n\
To add real account:\n\
1. Get API from https://my.telegram.org\n\
2. Contact developer for full version\n\n\
For now, demo account added!";

const NO_ACCOUNTS_TEXT: &str = "No accounts yet. Use /addaccount";
const CREATING_GROUP_TEXT: &str = "⏳ Creating demo group...";

fn bulk_prompt() -> String {
    format!("How many groups? (1-{MAX_BULK_GROUPS}):")
}

fn bulk_reprompt() -> String {
    format!("Please enter 1-{MAX_BULK_GROUPS}:")
}

/// `Test Group` plus the last six digits of the millisecond timestamp.
pub fn group_name(epoch_ms: i64) -> String {
    let digits = epoch_ms.to_string();
    let tail = &digits[digits.len().saturating_sub(6)..];
    format!("Test Group {tail}")
}

pub fn progress_text(count: u32, progress: Option<(u32, u32)>) -> String {
    match progress {
        None => format!("Creating {count} groups...\nProgress: 0%"),
        Some((done, percent)) => {
            format!("Creating {count} groups...\nProgress: {percent}% ({done}/{count})")
        }
    }
}

pub struct GroupBot {
    accounts: Arc<AccountStore>,
    sessions: SessionStore,
    chat_locks: ChatLocks,
    status: Arc<StatusReporter>,
    messenger: Arc<dyn MessagingPort>,
    work: Arc<dyn WorkSimulator>,
    timing: WorkTiming,
}

impl GroupBot {
    pub fn new(
        accounts: Arc<AccountStore>,
        status: Arc<StatusReporter>,
        messenger: Arc<dyn MessagingPort>,
        work: Arc<dyn WorkSimulator>,
        timing: WorkTiming,
    ) -> Self {
        Self {
            accounts,
            sessions: SessionStore::new(),
            chat_locks: ChatLocks::default(),
            status,
            messenger,
            work,
            timing,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one update. Updates of the same chat run one at a time.
    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        let _guard = self.chat_locks.lock_chat(update.chat_id()).await;
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => self.handle_text(msg).await,
        }
    }

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        let Ok(command) = cmd.name.parse::<BotCommand>() else {
            tracing::debug!(command = %cmd.name, chat_id = cmd.chat_id.0, "ignoring unknown command");
            return Ok(());
        };
        let key = ConversationKey::new(cmd.chat_id, cmd.user_id);

        match command {
            BotCommand::Start => self.reply(cmd.chat_id, HELP_TEXT).await,

            BotCommand::AddAccount => {
                let account = Account::synthetic(cmd.user_id, &mut rand::thread_rng());
                self.accounts.add(account).await;
                tracing::info!(
                    user_id = cmd.user_id.0,
                    username = cmd.username.as_deref().unwrap_or("unknown"),
                    "demo account added"
                );
                // Recorded whether or not the confirmation gets through.
                self.reply(cmd.chat_id, ADD_ACCOUNT_TEXT).await
            }

            BotCommand::CreateGroup => {
                self.reply(cmd.chat_id, CREATING_GROUP_TEXT).await?;
                self.work.pause(self.timing.group_create).await;
                let name = group_name(Utc::now().timestamp_millis());
                let body = format!(
                    "✅ <b>Demo Group Created!</b>\n\n\
Group Name: {name}\n\
Features: 'hello' message, open permissions\n\n\
📊 Server Status: ✅ Online\n\
⏰ Uptime: 24/7",
                    name = escape_html(&name)
                );
                self.reply(cmd.chat_id, &body).await
            }

            BotCommand::CreateBulk => {
                let (before, _) = self.sessions.apply(key, SessionEvent::BulkRequested).await;
                if before == ConversationState::WaitingForCount {
                    tracing::debug!(chat_id = cmd.chat_id.0, "createbulk while already waiting");
                }
                self.reply(cmd.chat_id, &bulk_prompt()).await
            }

            BotCommand::ListAccounts => {
                let mine = self.accounts.list_for(cmd.user_id).await;
                if mine.is_empty() {
                    return self.reply(cmd.chat_id, NO_ACCOUNTS_TEXT).await;
                }

                let mut body = String::from("📱 <b>Your Accounts:</b>\n\n");
                for (idx, acc) in mine.iter().enumerate() {
                    body.push_str(&format!(
                        "{}. {}\nAdded: {}\n\n",
                        idx + 1,
                        escape_html(&acc.phone),
                        acc.added.format("%-m/%-d/%Y")
                    ));
                }
                self.reply(cmd.chat_id, body.trim_end()).await
            }

            BotCommand::Status => {
                let body = self.status.chat_html().await;
                self.reply(cmd.chat_id, &body).await
            }
        }
    }

    async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        let key = ConversationKey::new(msg.chat_id, msg.user_id);
        if self.sessions.state(key).await != ConversationState::WaitingForCount {
            return Ok(());
        }

        let Some(count) = parse_bulk_count(&msg.text) else {
            self.sessions.apply(key, SessionEvent::InvalidCount).await;
            return self.reply(msg.chat_id, &bulk_reprompt()).await;
        };

        tracing::info!(chat_id = msg.chat_id.0, count, "starting simulated bulk run");
        let outcome = self.run_bulk_progress(msg.chat_id, count).await;
        // Consumed even when the run failed part way.
        self.sessions.apply(key, SessionEvent::CountConsumed).await;
        outcome
    }

    async fn run_bulk_progress(&self, chat_id: ChatId, count: u32) -> Result<()> {
        let progress = self
            .messenger
            .send_html(chat_id, &progress_text(count, None))
            .await?;

        let messenger = self.messenger.clone();
        run_bulk(count, self.timing.bulk_step, self.work.as_ref(), |step| {
            let messenger = messenger.clone();
            async move {
                messenger
                    .edit_html(
                        progress,
                        &progress_text(step.total, Some((step.done, step.percent))),
                    )
                    .await
            }
        })
        .await?;

        let summary = format!(
            "✅ <b>Created {count} groups!</b>\n\
Server: {host} (Free Tier)\n\
Uptime: 24/7\n\
Status: ✅ Online",
            host = escape_html(self.status.host_label())
        );
        self.reply(chat_id, &summary).await
    }

    async fn reply(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.messenger.send_html(chat_id, html).await?;
        Ok(())
    }
}
