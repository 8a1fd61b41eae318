//! Unified content feed over articles and ingested Slack messages.

use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::error;

use nh_core::error::NhResult;
use nh_core::ResolvedConfig;
use nh_models::{Article, HeaderIndex, IngestedMessage, RowStore};

use crate::articles::read_articles;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleAuthor {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackAuthor {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// One entry of the feed. `timestamp` is seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Article {
        id: String,
        title: String,
        content: String,
        timestamp: f64,
        created_at: String,
        updated_at: String,
        tags: Vec<String>,
        author: ArticleAuthor,
    },
    Slack {
        id: String,
        content: String,
        timestamp: f64,
        created_at: String,
        tags: Vec<String>,
        author: SlackAuthor,
        channel: ChannelRef,
        link: String,
    },
}

impl ContentItem {
    pub fn from_article(article: &Article) -> Self {
        ContentItem::Article {
            id: article.id.clone(),
            title: article.title.clone(),
            content: article.content.clone(),
            timestamp: article.timestamp_secs(),
            created_at: article.created_at.clone(),
            updated_at: article.updated_at.clone(),
            tags: article.tags.clone(),
            author: ArticleAuthor {
                email: article.author_email.clone(),
                name: article.author_name.clone(),
            },
        }
    }

    pub fn from_message(msg: &IngestedMessage) -> Self {
        let ts = msg.ts();
        let created_at = ts
            .as_ref()
            .and_then(|ts| ts.to_datetime())
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();

        ContentItem::Slack {
            id: msg.id(),
            content: msg.text.clone(),
            timestamp: ts.map(|ts| ts.as_secs_f64()).unwrap_or(0.0),
            created_at,
            tags: vec!["slack".to_string(), format!("channel:{}", msg.channel_name)],
            author: SlackAuthor {
                name: msg.user_name.clone(),
                avatar: msg.user_avatar.clone(),
            },
            channel: ChannelRef {
                id: msg.channel_id.clone(),
                name: msg.channel_name.clone(),
            },
            link: msg.permalink.clone(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentItem::Article { id, .. } | ContentItem::Slack { id, .. } => id,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            ContentItem::Article { timestamp, .. } | ContentItem::Slack { timestamp, .. } => {
                *timestamp
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentItem::Article { .. } => "article",
            ContentItem::Slack { .. } => "slack",
        }
    }

    /// Display title: the article title, or the channel for Slack items.
    pub fn title(&self) -> String {
        match self {
            ContentItem::Article { title, .. } => title.clone(),
            ContentItem::Slack { channel, .. } => format!("#{}", channel.name),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ContentItem::Article { content, .. } | ContentItem::Slack { content, .. } => content,
        }
    }

    pub fn author_name(&self) -> &str {
        match self {
            ContentItem::Article { author, .. } => &author.name,
            ContentItem::Slack { author, .. } => &author.name,
        }
    }

    /// Case-insensitive substring match. `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        fn has(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(needle)
        }
        match self {
            ContentItem::Article {
                title,
                content,
                tags,
                author,
                ..
            } => {
                has(title, needle)
                    || has(content, needle)
                    || tags.iter().any(|t| has(t, needle))
                    || has(&author.email, needle)
                    || has(&author.name, needle)
            }
            ContentItem::Slack {
                content,
                tags,
                author,
                channel,
                ..
            } => {
                has(content, needle)
                    || tags.iter().any(|t| has(t, needle))
                    || has(&author.name, needle)
                    || has(&channel.name, needle)
            }
        }
    }
}

/// Read side over both sheets.
pub struct FeedService {
    store: Arc<dyn RowStore>,
    articles_sheet: String,
    slack_sheet: String,
}

impl FeedService {
    pub fn new(config: &ResolvedConfig, store: Arc<dyn RowStore>) -> Self {
        Self {
            store,
            articles_sheet: config.articles_sheet.clone(),
            slack_sheet: config.slack_sheet.clone(),
        }
    }

    /// Stored Slack messages, newest first, optionally for one channel and
    /// capped at `limit`. A missing sheet or a read failure yields nothing.
    pub fn slack_messages(&self, channel_id: Option<&str>, limit: Option<usize>) -> Vec<IngestedMessage> {
        match self.try_slack_messages(channel_id, limit) {
            Ok(messages) => messages,
            Err(e) => {
                error!("failed to read slack messages: {e}");
                Vec::new()
            }
        }
    }

    fn try_slack_messages(
        &self,
        channel_id: Option<&str>,
        limit: Option<usize>,
    ) -> NhResult<Vec<IngestedMessage>> {
        if !self.store.has_sheet(&self.slack_sheet)? {
            return Ok(Vec::new());
        }
        let mut all = self.store.read_all_rows(&self.slack_sheet)?.into_iter();
        let Some(header) = all.next() else {
            return Ok(Vec::new());
        };
        let index = HeaderIndex::new(&header);

        let mut messages: Vec<IngestedMessage> = all
            .map(|cells| IngestedMessage::from_cells(&index, &cells))
            .filter(|m| channel_id.map_or(true, |c| c.is_empty() || m.channel_id == c))
            .collect();

        // Unparsable timestamps sort last.
        messages.sort_by(|a, b| b.ts().cmp(&a.ts()));
        if let Some(limit) = limit.filter(|l| *l > 0) {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    /// Articles and Slack messages merged, newest first.
    pub fn content(&self) -> Vec<ContentItem> {
        let articles = match self.store.has_sheet(&self.articles_sheet) {
            Ok(true) => read_articles(self.store.as_ref(), &self.articles_sheet).unwrap_or_else(|e| {
                error!("failed to read articles: {e}");
                Vec::new()
            }),
            Ok(false) => Vec::new(),
            Err(e) => {
                error!("failed to read articles: {e}");
                Vec::new()
            }
        };

        let mut items: Vec<ContentItem> = articles.iter().map(ContentItem::from_article).collect();
        items.extend(
            self.slack_messages(None, None)
                .iter()
                .map(ContentItem::from_message),
        );
        items.sort_by(|a, b| b.timestamp().total_cmp(&a.timestamp()));
        items
    }

    /// Feed entries matching `query`. An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<ContentItem> {
        let needle = query.trim().to_lowercase();
        let all = self.content();
        if needle.is_empty() {
            return all;
        }
        all.into_iter().filter(|item| item.matches(&needle)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(ts: &str) -> IngestedMessage {
        IngestedMessage {
            timestamp: ts.into(),
            user_id: "U1".into(),
            user_name: "Alice".into(),
            user_avatar: String::new(),
            text: "Deploy finished".into(),
            channel_id: "C1".into(),
            channel_name: "ops".into(),
            permalink: String::new(),
        }
    }

    #[test]
    fn test_slack_item_fields() {
        let item = ContentItem::from_message(&message("1700000000.500000"));
        assert_eq!(item.kind(), "slack");
        assert_eq!(item.id(), "slack-1700000000.500000-C1");
        assert_eq!(item.timestamp(), 1_700_000_000.5);
        match &item {
            ContentItem::Slack { created_at, tags, .. } => {
                assert_eq!(created_at, "2023-11-14T22:13:20.500Z");
                assert_eq!(tags, &vec!["slack".to_string(), "channel:ops".to_string()]);
            }
            _ => panic!("expected slack item"),
        }
    }

    #[test]
    fn test_bad_ts_item() {
        let item = ContentItem::from_message(&message("garbage"));
        assert_eq!(item.timestamp(), 0.0);
    }

    #[test]
    fn test_matches() {
        let item = ContentItem::from_message(&message("1.0"));
        assert!(item.matches("deploy"));
        assert!(item.matches("channel:ops"));
        assert!(item.matches("alice"));
        assert!(!item.matches("bob"));
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(ContentItem::from_message(&message("1.0"))).unwrap();
        assert_eq!(json["type"], "slack");
        assert_eq!(json["channel"]["name"], "ops");
    }
}
