//! Incremental Slack channel ingestion.
//!
//! Each run, per channel:
//! - derive the watermark (latest stored timestamp for the channel)
//! - fetch one page of history above it
//! - drop structural messages, our own notifications and the watermark message
//! - enrich authors (cached per run), channel name and permalinks
//! - append the survivors oldest first, as one batch
//!
//! Channels are processed one at a time. A failure is reported on that
//! channel's outcome and never stops the others.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use nh_api::{ChannelApi, SlackMessage};
use nh_core::constants::{
    self, headers, NOTIFICATION_MARKER, STRUCTURAL_SUBTYPES, UNKNOWN_USER_NAME,
};
use nh_core::error::{ErrorKind, NhResult};
use nh_core::ResolvedConfig;
use nh_models::{Cells, HeaderIndex, IngestedMessage, RowStore, SlackTs};

/// What happened to one channel during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome {
    pub channel_id: String,
    pub status: ChannelStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelStatus {
    /// Nothing new above the watermark.
    UpToDate,
    /// New rows were written. `skipped` counts filtered messages.
    Appended { rows: usize, skipped: usize },
    /// The channel was abandoned; nothing was written for it.
    Failed { kind: ErrorKind, message: String },
}

impl ChannelOutcome {
    pub fn rows_appended(&self) -> usize {
        match self.status {
            ChannelStatus::Appended { rows, .. } => rows,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ChannelStatus::Failed { .. })
    }
}

impl fmt::Display for ChannelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ChannelStatus::UpToDate => write!(f, "{}: up to date", self.channel_id),
            ChannelStatus::Appended { rows, skipped } => {
                write!(f, "{}: appended {rows} (skipped {skipped})", self.channel_id)
            }
            ChannelStatus::Failed { message, .. } => {
                write!(f, "{}: failed: {message}", self.channel_id)
            }
        }
    }
}

/// Result of a full sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Set when the run did not start at all.
    pub skipped: Option<String>,
    pub outcomes: Vec<ChannelOutcome>,
}

impl SyncReport {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            outcomes: Vec::new(),
        }
    }

    pub fn rows_appended(&self) -> usize {
        self.outcomes.iter().map(ChannelOutcome::rows_appended).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn up_to_date(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ChannelStatus::UpToDate)
            .count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.skipped {
            return write!(f, "skip ({reason})");
        }
        write!(
            f,
            "channels={}, appended={}, up_to_date={}, failed={}",
            self.outcomes.len(),
            self.rows_appended(),
            self.up_to_date(),
            self.failed()
        )
    }
}

#[derive(Debug, Clone)]
struct Author {
    name: String,
    avatar: String,
}

/// Mirrors Slack channel history into the messages sheet.
pub struct ChannelSynchronizer {
    config: ResolvedConfig,
    store: Arc<dyn RowStore>,
    api: Arc<dyn ChannelApi>,
    page_size: u32,
}

impl ChannelSynchronizer {
    pub fn new(config: ResolvedConfig, store: Arc<dyn RowStore>, api: Arc<dyn ChannelApi>) -> Self {
        Self {
            config,
            store,
            api,
            page_size: constants::DEFAULT_HISTORY_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sync every configured channel, strictly in order.
    pub async fn sync_all(&self) -> SyncReport {
        if self.config.slack_bot_token.is_empty() || self.config.slack_channel_ids.is_empty() {
            warn!("slack sync skipped: bot token or channel ids not configured");
            return SyncReport::skipped("no slack config");
        }

        let mut report = SyncReport::default();
        for channel_id in &self.config.slack_channel_ids {
            report.outcomes.push(self.sync_channel(channel_id).await);
        }
        info!("slack sync finished: {report}");
        report
    }

    /// Sync one channel. Errors are logged and folded into the outcome.
    pub async fn sync_channel(&self, channel_id: &str) -> ChannelOutcome {
        let status = match self.try_sync_channel(channel_id).await {
            Ok(status) => status,
            Err(e) => {
                error!(channel = channel_id, kind = ?e.kind(), "channel sync failed: {e}");
                ChannelStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };
        ChannelOutcome {
            channel_id: channel_id.to_string(),
            status,
        }
    }

    async fn try_sync_channel(&self, channel_id: &str) -> NhResult<ChannelStatus> {
        let sheet = self.config.slack_sheet.as_str();
        if !self.store.has_sheet(sheet)? {
            self.store.ensure_sheet(sheet, headers::SLACK_MESSAGES)?;
        }

        let watermark = self.watermark(channel_id)?;
        let watermark_centis = watermark.as_ref().map(SlackTs::truncated_centis);
        debug!(
            channel = channel_id,
            watermark = watermark.as_ref().map(SlackTs::as_str).unwrap_or(constants::WATERMARK_SENTINEL),
            "fetching history"
        );

        let page = self
            .api
            .fetch_history(channel_id, watermark.as_ref().map(SlackTs::as_str), self.page_size)
            .await?;
        let mut messages = page.messages;
        messages.reverse();

        if messages.is_empty() {
            debug!(channel = channel_id, "no messages above watermark");
            return Ok(ChannelStatus::UpToDate);
        }
        if messages.len() == 1 && watermark_centis.is_some() && truncated(&messages[0]) == watermark_centis {
            debug!(channel = channel_id, "only the watermark message returned");
            return Ok(ChannelStatus::UpToDate);
        }

        let channel_name = self.channel_name(channel_id).await;
        let mut authors: HashMap<String, Author> = HashMap::new();
        let mut rows: Vec<Cells> = Vec::with_capacity(messages.len());
        let mut skipped = 0usize;

        for msg in &messages {
            if let Some(subtype) = msg.subtype.as_deref() {
                if STRUCTURAL_SUBTYPES.contains(&subtype) {
                    skipped += 1;
                    continue;
                }
            }
            if msg.text().contains(NOTIFICATION_MARKER) {
                skipped += 1;
                continue;
            }
            let Ok(ts) = SlackTs::parse(&msg.ts) else {
                warn!(channel = channel_id, ts = %msg.ts, "skipping message with unparsable timestamp");
                skipped += 1;
                continue;
            };
            if Some(ts.truncated_centis()) == watermark_centis {
                skipped += 1;
                continue;
            }

            let user_id = msg.user_id().unwrap_or("");
            let author = self.resolve_author(msg.user_id(), &mut authors).await;
            let permalink = self.permalink(channel_id, ts.as_str()).await;

            let row = IngestedMessage {
                timestamp: ts.as_str().to_string(),
                user_id: user_id.to_string(),
                user_name: author.name,
                user_avatar: author.avatar,
                text: msg.text().to_string(),
                channel_id: channel_id.to_string(),
                channel_name: channel_name.clone(),
                permalink,
            };
            rows.push(row.to_row());
        }

        if rows.is_empty() {
            return Ok(ChannelStatus::UpToDate);
        }

        let appended = self.store.append_rows(sheet, &rows)?;
        info!(channel = channel_id, appended, skipped, "channel synced");
        Ok(ChannelStatus::Appended {
            rows: appended,
            skipped,
        })
    }

    /// Latest stored timestamp for the channel, `None` meaning nothing stored.
    ///
    /// This is the maximum over the channel's rows, not the sheet's last row,
    /// so several channels can share one sheet. Cells that do not parse as a
    /// timestamp are ignored.
    pub fn watermark(&self, channel_id: &str) -> NhResult<Option<SlackTs>> {
        let sheet = self.config.slack_sheet.as_str();
        let index = HeaderIndex::new(&self.store.headers(sheet)?);

        let mut latest: Option<SlackTs> = None;
        for row in self.store.read_rows(sheet)? {
            let stored = IngestedMessage::from_cells(&index, &row.cells);
            if stored.channel_id != channel_id {
                continue;
            }
            match SlackTs::parse(&stored.timestamp) {
                Ok(ts) if !ts.is_zero() => {
                    if latest.as_ref().map_or(true, |cur| ts > *cur) {
                        latest = Some(ts);
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    warn!(
                        channel = channel_id,
                        row = row.id,
                        value = %stored.timestamp,
                        "ignoring non-numeric timestamp cell"
                    );
                }
            }
        }
        Ok(latest)
    }

    async fn channel_name(&self, channel_id: &str) -> String {
        match self.api.fetch_channel_info(channel_id).await {
            Ok(channel) => channel
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| channel_id.to_string()),
            Err(e) => {
                warn!(channel = channel_id, "channel info lookup failed: {e}");
                channel_id.to_string()
            }
        }
    }

    /// Failed lookups are not cached, so the next message by the same
    /// author tries again.
    async fn resolve_author(
        &self,
        user_id: Option<&str>,
        cache: &mut HashMap<String, Author>,
    ) -> Author {
        let unknown = Author {
            name: UNKNOWN_USER_NAME.to_string(),
            avatar: String::new(),
        };
        let Some(user_id) = user_id else {
            return unknown;
        };
        if let Some(hit) = cache.get(user_id) {
            return hit.clone();
        }

        match self.api.fetch_user_info(user_id).await {
            Ok(user) => {
                let author = Author {
                    name: user.display_name().unwrap_or(UNKNOWN_USER_NAME).to_string(),
                    avatar: user.avatar_url().to_string(),
                };
                cache.insert(user_id.to_string(), author.clone());
                author
            }
            Err(e) => {
                warn!(user = user_id, "user info lookup failed: {e}");
                unknown
            }
        }
    }

    async fn permalink(&self, channel_id: &str, ts: &str) -> String {
        match self.api.fetch_permalink(channel_id, ts).await {
            Ok(link) => link,
            Err(e) => {
                warn!(channel = channel_id, ts, "permalink lookup failed: {e}");
                String::new()
            }
        }
    }
}

fn truncated(msg: &SlackMessage) -> Option<u64> {
    SlackTs::parse(&msg.ts).ok().map(|ts| ts.truncated_centis())
}
