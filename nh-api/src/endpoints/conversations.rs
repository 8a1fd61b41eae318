//! `conversations.*` methods.

use nh_core::error::{NhError, NhResult};

use crate::client::SlackClient;
use crate::response::{ChannelEnvelope, HistoryPage, SlackChannel};

/// Query for `conversations.history`. `oldest` is omitted when absent.
pub fn history_query(channel: &str, oldest: Option<&str>, limit: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("channel", channel.to_string()), ("limit", limit.to_string())];
    if let Some(oldest) = oldest {
        query.push(("oldest", oldest.to_string()));
    }
    query
}

impl SlackClient {
    /// Fetch one page of channel history, newest first.
    pub async fn conversations_history(
        &self,
        channel: &str,
        oldest: Option<&str>,
        limit: u32,
    ) -> NhResult<HistoryPage> {
        let query = history_query(channel, oldest, limit);
        self.get_method("conversations.history", &query).await
    }

    /// Fetch channel metadata.
    pub async fn conversations_info(&self, channel: &str) -> NhResult<SlackChannel> {
        let envelope: ChannelEnvelope = self
            .get_method("conversations.info", &[("channel", channel)])
            .await?;
        envelope
            .channel
            .ok_or_else(|| NhError::Serialization("conversations.info: missing channel".into()))
    }
}
