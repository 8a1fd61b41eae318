//! Post-deployment smoke test.
//!
//! Exercises the whole stack once: sheet setup, an article round trip
//! (add, find, delete), the merged feed and, when configured, a Slack sync.
//! Only the article it created itself is deleted.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use nh_core::ResolvedConfig;
use nh_models::{ArticleDraft, RowStore};

use crate::articles::ArticleService;
use crate::feed::FeedService;
use crate::setup::ensure_sheet_structure;
use crate::sync::ChannelSynchronizer;

/// Title prefix of the throwaway article.
pub const SMOKE_TITLE_PREFIX: &str = "[SMOKE]";

/// Step-by-step results. Each field holds a status or `error: ...`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeReport {
    pub ensure: String,
    pub added: String,
    pub article_count: usize,
    pub found_dummy: bool,
    pub delete: String,
    pub content_count: usize,
    pub slack_sync: String,
}

impl SmokeReport {
    /// Whether no step reported an error.
    pub fn passed(&self) -> bool {
        ![&self.ensure, &self.added, &self.delete, &self.slack_sync]
            .iter()
            .any(|s| s.starts_with("error"))
            && self.found_dummy
    }
}

pub struct SmokeTest {
    config: ResolvedConfig,
    store: Arc<dyn RowStore>,
    articles: ArticleService,
    sync: Option<ChannelSynchronizer>,
    actor_email: String,
}

impl SmokeTest {
    /// `sync` is run only if Slack ingestion is configured.
    pub fn new(
        config: ResolvedConfig,
        store: Arc<dyn RowStore>,
        articles: ArticleService,
        sync: Option<ChannelSynchronizer>,
        actor_email: &str,
    ) -> Self {
        Self {
            config,
            store,
            articles,
            sync,
            actor_email: actor_email.to_string(),
        }
    }

    pub async fn run(&self) -> SmokeReport {
        let mut report = SmokeReport {
            ensure: match ensure_sheet_structure(self.store.as_ref(), &self.config) {
                Ok(()) => "sheets ready".into(),
                Err(e) => format!("error: {e}"),
            },
            ..SmokeReport::default()
        };

        let title = format!("{SMOKE_TITLE_PREFIX} ping {}", Utc::now().to_rfc3339());
        let draft = ArticleDraft {
            title: title.clone(),
            content: "smoke test".into(),
            tags: "smoke".into(),
        };
        report.added = match self.articles.add(&draft, &self.actor_email).await {
            Ok(_) => title.clone(),
            Err(e) => format!("error: {e}"),
        };

        let articles = self.articles.list();
        report.article_count = articles.len();
        let dummy = articles.iter().find(|a| a.title == title);
        report.found_dummy = dummy.is_some();
        report.delete = match dummy {
            Some(article) => match self.articles.delete(&article.id, &self.actor_email) {
                Ok(()) => "deleted".into(),
                Err(e) => format!("error: {e}"),
            },
            None => "skip (not found)".into(),
        };

        report.content_count = FeedService::new(&self.config, self.store.clone()).content().len();

        report.slack_sync = match &self.sync {
            Some(sync) if self.config.is_slack_sync_configured() => {
                let result = sync.sync_all().await;
                if result.failed() > 0 {
                    format!("error: {result}")
                } else {
                    "ok".into()
                }
            }
            _ => "skip (no slack config)".into(),
        };

        info!(passed = report.passed(), "smoke test finished");
        report
    }
}
