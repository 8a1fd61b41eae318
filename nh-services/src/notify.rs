//! New-article announcements to Slack.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::form_urlencoded;

use nh_api::ChannelApi;
use nh_core::constants::NOTIFICATION_MARKER;
use nh_core::ResolvedConfig;

/// Posts a marker-tagged message to every notification channel.
#[derive(Clone)]
pub struct Notifier {
    api: Arc<dyn ChannelApi>,
    enabled: bool,
    channels: Vec<String>,
    web_app_url: String,
}

impl Notifier {
    pub fn new(config: &ResolvedConfig, api: Arc<dyn ChannelApi>) -> Self {
        Self {
            api,
            enabled: config.is_slack_notify_configured(),
            channels: config.slack_notification_channel_ids.clone(),
            web_app_url: config.web_app_url.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Deep link to an article in the web front-end, if its URL is known.
    pub fn article_link(&self, article_id: &str) -> Option<String> {
        build_article_link(&self.web_app_url, article_id)
    }

    /// Announce a new article. Returns how many channels accepted the post.
    pub async fn notify_new_article(&self, article_id: &str, title: &str, author: &str) -> usize {
        if !self.enabled {
            debug!("notifications disabled, not announcing {article_id}");
            return 0;
        }

        let text = notification_text(self.article_link(article_id).as_deref(), title, author);
        let mut delivered = 0;
        for channel in &self.channels {
            match self.api.post_message(channel, &text).await {
                Ok(_) => delivered += 1,
                Err(e) => warn!(channel = %channel, "slack notification failed: {e}"),
            }
        }
        info!(article = article_id, delivered, "new article announced");
        delivered
    }
}

/// `<base>?articleId=<id>` with the trailing slash of `base` removed.
pub fn build_article_link(web_app_url: &str, article_id: &str) -> Option<String> {
    let base = web_app_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let id: String = form_urlencoded::byte_serialize(article_id.as_bytes()).collect();
    Some(format!("{base}?articleId={id}"))
}

/// Message body. Always carries the marker so ingestion skips it.
pub fn notification_text(link: Option<&str>, title: &str, author: &str) -> String {
    match link {
        Some(link) => format!("{NOTIFICATION_MARKER} New post: <{link}|{title}> by {author}"),
        None => format!("{NOTIFICATION_MARKER} New post: {title} by {author}"),
    }
}
