use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Token used when `BOT_TOKEN` is missing. Telegram rejects it at `get_me`,
/// so the failure surfaces at transport startup instead of config load.
pub const PLACEHOLDER_BOT_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

/// Typed configuration for the bot and its status page.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub telegram_throttle: bool,

    // HTTP status page
    pub http_port: u16,
    pub host_label: String,
    pub host_url: String,
    pub public_url: Option<String>,

    // Simulated work
    pub group_create_delay: Duration,
    pub bulk_step_delay: Duration,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .unwrap_or_else(|| PLACEHOLDER_BOT_TOKEN.to_string());
        let telegram_throttle = lookup("TELEGRAM_THROTTLE")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        let http_port = match lookup("PORT").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT must be a valid port number ({raw}): {e}")))?,
            None => 3000,
        };

        let host_label = lookup("HOST_LABEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "Render.com".to_string());
        let host_url = lookup("HOST_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "https://render.com".to_string());
        let public_url = lookup("PUBLIC_URL").and_then(non_empty);

        let group_create_delay = Duration::from_millis(
            lookup("GROUP_CREATE_DELAY_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1500),
        );
        let bulk_step_delay = Duration::from_millis(
            lookup("BULK_STEP_DELAY_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1000),
        );

        Ok(Self {
            bot_token,
            telegram_throttle,
            http_port,
            host_label,
            host_url,
            public_url,
            group_create_delay,
            bulk_step_delay,
        })
    }

    pub fn has_placeholder_token(&self) -> bool {
        self.bot_token == PLACEHOLDER_BOT_TOKEN
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
