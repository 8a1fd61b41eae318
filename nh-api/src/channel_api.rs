//! The messaging-API contract used by ingestion and notifications.

use async_trait::async_trait;

use nh_core::error::NhResult;

use crate::response::{HistoryPage, PostedMessage, SlackChannel, SlackUser};

/// Channel history, enrichment lookups and posting.
///
/// Implementations report an `ok: false` answer as
/// [`nh_core::NhError::ApiRejected`] and network or decoding failures as
/// transport errors.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// One page of history, newest first, bounded below by `oldest` when given.
    async fn fetch_history(
        &self,
        channel: &str,
        oldest: Option<&str>,
        limit: u32,
    ) -> NhResult<HistoryPage>;

    async fn fetch_user_info(&self, user: &str) -> NhResult<SlackUser>;

    async fn fetch_channel_info(&self, channel: &str) -> NhResult<SlackChannel>;

    async fn fetch_permalink(&self, channel: &str, ts: &str) -> NhResult<String>;

    async fn post_message(&self, channel: &str, text: &str) -> NhResult<PostedMessage>;
}
