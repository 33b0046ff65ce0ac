use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use tokio_util::sync::CancellationToken;

use gbot_core::{accounts::AccountStore, config::Config, status::StatusReporter};

#[tokio::main]
async fn main() -> Result<(), gbot_core::Error> {
    gbot_core::logging::init("gbot")?;

    let cfg = Arc::new(Config::load()?);
    if cfg.has_placeholder_token() {
        tracing::warn!("BOT_TOKEN is not set; the Telegram bot will fail to authenticate");
    }
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let accounts = Arc::new(AccountStore::new());
    let status = Arc::new(StatusReporter::new(
        accounts.clone(),
        cfg.host_label.clone(),
        cfg.host_url.clone(),
    ));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cfg.http_port));
    // A web server that fails to start cancels `shutdown`, stopping polling too.
    let web = tokio::spawn(gbot_web::serve(addr, status.clone(), shutdown.clone()));

    tracing::info!("🚀 Starting Telegram Bot...");
    if let Some(url) = &cfg.public_url {
        tracing::info!("🌐 Health check: {url}");
    }

    // A transport that cannot log in leaves the status page up until shutdown.
    if let Err(e) =
        gbot_telegram::router::run_polling(cfg.clone(), accounts, status, shutdown.clone()).await
    {
        tracing::error!("❌ Bot failed: {e}");
    }

    match web.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(gbot_core::Error::External(format!("web server failed: {e}"))),
        Err(e) => Err(gbot_core::Error::External(format!("web server task failed: {e}"))),
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let signal = wait_for_signal().await;
    tracing::info!("received {signal}, shutting down");
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
