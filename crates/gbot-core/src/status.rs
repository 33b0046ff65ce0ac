use std::{
    fs,
    sync::{Arc, OnceLock},
    time::Instant,
};

use serde::Serialize;

use crate::{accounts::AccountStore, formatting::escape_html};

/// Point-in-time view of the process and the account store.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub uptime_seconds: u64,
    pub memory_mb: f64,
    pub total_accounts: usize,
    pub distinct_users: usize,
}

pub struct StatusReporter {
    started: Instant,
    accounts: Arc<AccountStore>,
    host_label: String,
    host_url: String,
    bot_username: OnceLock<String>,
}

impl StatusReporter {
    pub fn new(
        accounts: Arc<AccountStore>,
        host_label: impl Into<String>,
        host_url: impl Into<String>,
    ) -> Self {
        Self {
            started: Instant::now(),
            accounts,
            host_label: host_label.into(),
            host_url: host_url.into(),
            bot_username: OnceLock::new(),
        }
    }

    /// Record the bot's username once the transport has logged in.
    pub fn set_bot_username(&self, username: impl Into<String>) {
        let _ = self.bot_username.set(username.into());
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.get().map(String::as_str)
    }

    pub fn host_label(&self) -> &str {
        &self.host_label
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            uptime_seconds: self.started.elapsed().as_secs(),
            memory_mb: resident_memory_bytes().unwrap_or(0) as f64 / 1024.0 / 1024.0,
            total_accounts: self.accounts.count().await,
            distinct_users: self.accounts.distinct_users().await,
        }
    }

    pub async fn chat_html(&self) -> String {
        render_chat_html(&self.snapshot().await, &self.host_label)
    }

    pub async fn page_html(&self) -> String {
        render_page(
            &self.snapshot().await,
            &self.host_label,
            &self.host_url,
            self.bot_username(),
        )
    }
}

/// Resident set size of this process (Linux `/proc/self/status`).
pub fn resident_memory_bytes() -> Option<u64> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb = line
        .trim_start_matches("VmRSS:")
        .split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()?;
    Some(kb * 1024)
}

pub fn render_chat_html(s: &StatusSnapshot, host_label: &str) -> String {
    format!(
        "📊 <b>Bot Status:</b>\n\
✅ Online 24/7\n\
🌐 Host: {host}\n\
💾 Memory: {mem}MB\n\
📈 Uptime: {uptime} seconds\n\
📁 Accounts: {accounts}\n\
👥 Users: {users}",
        host = escape_html(host_label),
        mem = s.memory_mb.trunc() as u64,
        uptime = s.uptime_seconds,
        accounts = s.total_accounts,
        users = s.distinct_users,
    )
}

pub fn render_page(
    s: &StatusSnapshot,
    host_label: &str,
    host_url: &str,
    bot_username: Option<&str>,
) -> String {
    let host_label = escape_html(host_label);
    let host_url = escape_html(host_url);
    let open_bot = bot_username
        .map(|u| {
            format!(
                r#"<a href="https://t.me/{u}" class="btn" target="_blank">Open Bot</a>"#,
                u = escape_html(u)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Telegram Bot Status</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>
    body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }}
    .container {{ max-width: 800px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
    .status {{ padding: 20px; border-radius: 5px; margin: 20px 0; }}
    .online {{ background: #d4edda; color: #155724; border: 1px solid #c3e6cb; }}
    .info {{ background: #d1ecf1; color: #0c5460; border: 1px solid #bee5eb; }}
    h1 {{ color: #333; }}
    .btn {{ display: inline-block; padding: 10px 20px; background: #007bff; color: white; text-decoration: none; border-radius: 5px; margin: 10px 5px; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>🤖 Telegram Group Bot</h1>
    <div class="status online">
      <h2>✅ Bot Status: ONLINE</h2>
      <p>Running on {host_label}</p>
    </div>
    <div class="status info">
      <h3>📊 Server Info:</h3>
      <p>Uptime: {minutes} minutes</p>
      <p>Memory: {memory:.2} MB</p>
      <p>Accounts: {accounts}</p>
      <p>Users: {users}</p>
    </div>
    <h3>🔗 Quick Links:</h3>
    {open_bot}
    <a href="{host_url}" class="btn" target="_blank">View Host</a>
    <h3>📖 How to Use:</h3>
    <ol>
      <li>Open Telegram and find your bot</li>
      <li>Send /start to begin</li>
      <li>Use commands to create groups</li>
    </ol>
  </div>
</body>
</html>
"#,
        minutes = s.uptime_seconds / 60,
        memory = s.memory_mb,
        accounts = s.total_accounts,
        users = s.distinct_users,
    )
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{accounts::Account, domain::UserId};

    fn snap() -> StatusSnapshot {
        StatusSnapshot {
            uptime_seconds: 125,
            memory_mb: 12.3456,
            total_accounts: 4,
            distinct_users: 2,
        }
    }

    #[test]
    fn parses_vm_rss_line() {
        let status = "Name:\tgbot\nVmPeak:\t  9000 kB\nVmRSS:\t    2048 kB\nThreads:\t4\n";
        assert_eq!(parse_vm_rss(status), Some(2048 * 1024));
        assert_eq!(parse_vm_rss("Name:\tgbot\n"), None);
    }

    #[test]
    fn chat_text_uses_whole_units() {
        let text = render_chat_html(&snap(), "Render.com");
        assert!(text.contains("Memory: 12MB"));
        assert!(text.contains("Uptime: 125 seconds"));
        assert!(text.contains("Accounts: 4"));
        assert!(text.contains("Users: 2"));
        assert!(text.contains("Host: Render.com"));
    }

    #[test]
    fn page_shows_minutes_two_decimals_and_escapes() {
        let page = render_page(&snap(), "<Local>", "https://example.com", None);
        assert!(page.contains("Uptime: 2 minutes"));
        assert!(page.contains("Memory: 12.35 MB"));
        assert!(page.contains("Accounts: 4"));
        assert!(page.contains("Running on &lt;Local&gt;"));
        assert!(!page.contains("Open Bot"));
    }

    #[test]
    fn page_links_bot_once_username_is_known() {
        let page = render_page(&snap(), "Render.com", "https://render.com", Some("demo_bot"));
        assert!(page.contains(r#"href="https://t.me/demo_bot""#));
    }

    #[tokio::test]
    async fn snapshot_reads_account_store() {
        let accounts = Arc::new(AccountStore::new());
        let mut rng = StdRng::seed_from_u64(3);
        accounts.add(Account::synthetic(UserId(1), &mut rng)).await;
        accounts.add(Account::synthetic(UserId(1), &mut rng)).await;
        accounts.add(Account::synthetic(UserId(2), &mut rng)).await;

        let reporter = StatusReporter::new(accounts, "Render.com", "https://render.com");
        let s = reporter.snapshot().await;
        assert_eq!(s.total_accounts, 3);
        assert_eq!(s.distinct_users, 2);
        assert!(s.memory_mb >= 0.0);

        reporter.set_bot_username("first");
        reporter.set_bot_username("second");
        assert_eq!(reporter.bot_username(), Some("first"));
    }
}
