use std::{sync::Arc, time::Duration};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

use gbot_core::{
    accounts::AccountStore,
    bot::{GroupBot, WorkTiming},
    config::Config,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    status::StatusReporter,
    work::SleepSimulator,
};

use crate::handlers;
use crate::TelegramMessenger;

pub struct AppState {
    pub bot: GroupBot,
}

/// Log in, then long-poll Telegram until `shutdown` fires.
///
/// A failed login (bad or placeholder token, no network) is returned to the
/// caller before any update is consumed.
pub async fn run_polling(
    cfg: Arc<Config>,
    accounts: Arc<AccountStore>,
    status: Arc<StatusReporter>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("telegram login failed: {e}"))?;
    let username = me.username().to_string();
    tracing::info!("✅ Bot is running online! @{username}");
    status.set_bot_username(username);

    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = if cfg.telegram_throttle {
        Arc::new(ThrottledMessenger::new(
            raw_messenger,
            ThrottleConfig::default(),
        ))
    } else {
        raw_messenger
    };

    let state = Arc::new(AppState {
        bot: GroupBot::new(
            accounts,
            status,
            messenger,
            Arc::new(SleepSimulator),
            WorkTiming::from(cfg.as_ref()),
        ),
    });

    if shutdown.is_cancelled() {
        return Ok(());
    }

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        tracing::info!("stopping Telegram dispatcher");
        // Shutdown is refused while the dispatcher is still starting up.
        loop {
            if let Ok(done) = token.shutdown() {
                done.await;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    dispatcher.dispatch().await;
    tracing::info!("Telegram dispatcher stopped");

    Ok(())
}
