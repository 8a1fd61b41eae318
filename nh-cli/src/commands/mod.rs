//! CLI command implementations.

pub mod init;
pub mod sync;
pub mod articles;
pub mod feed;
pub mod config;
pub mod upload;
pub mod smoke;

use std::sync::Arc;

use nh_api::{ChannelApi, SlackClient};
use nh_core::config::BakedConfig;
use nh_core::error::{NhError, NhResult};
use nh_core::ResolvedConfig;
use nh_models::{Database, SheetStore};
use nh_services::{ArticleService, Notifier};

/// Environment variable naming the acting user when `--as` is not given.
pub const USER_EMAIL_ENV: &str = "NOTEHUB_USER_EMAIL";

/// Configuration shared by every command.
pub struct AppContext {
    pub baked: BakedConfig,
    pub config: ResolvedConfig,
}

impl AppContext {
    pub fn new(baked: BakedConfig, config: ResolvedConfig) -> Self {
        Self { baked, config }
    }

    /// Open the row store backing the configured spreadsheet.
    pub fn open_store(&self) -> NhResult<Arc<SheetStore>> {
        let path = self.baked.effective_store_path(&self.config.spreadsheet_id)?;
        let db = Database::init(&path, &self.baked.database)?;
        Ok(Arc::new(SheetStore::new(db)))
    }

    /// Slack client for the resolved bot token.
    pub fn slack_api(&self) -> NhResult<Arc<dyn ChannelApi>> {
        let client = SlackClient::new(&self.config.slack_bot_token, &self.baked.sync)?;
        Ok(Arc::new(client))
    }

    /// Article service with notifications wired in when Slack is configured.
    pub fn article_service(&self, store: Arc<SheetStore>) -> NhResult<ArticleService> {
        let service = ArticleService::new(&self.config, store);
        if self.config.is_slack_notify_configured() {
            let notifier = Notifier::new(&self.config, self.slack_api()?);
            Ok(service.with_notifier(notifier))
        } else {
            Ok(service)
        }
    }
}

/// The acting user's email: `--as` if given, else the environment.
pub fn actor_email(flag: Option<String>) -> NhResult<String> {
    flag.or_else(|| std::env::var(USER_EMAIL_ENV).ok())
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .ok_or_else(|| {
            NhError::MissingConfig(format!("acting user email (pass --as or set {USER_EMAIL_ENV})"))
        })
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    let single_line = s.replace('\n', " ");
    if single_line.chars().count() <= max_len {
        single_line
    } else if max_len > 3 {
        let head: String = single_line.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        single_line.chars().take(max_len).collect()
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> NhResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer line of text", 10), "a longe...");
        assert_eq!(truncate("two\nlines", 20), "two lines");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_actor_email_flag_wins() {
        assert_eq!(actor_email(Some(" bob@example.com ".into())).unwrap(), "bob@example.com");
    }
}
