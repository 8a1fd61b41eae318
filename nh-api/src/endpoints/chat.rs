//! `chat.*` methods.

use serde_json::json;

use nh_core::error::{NhError, NhResult};

use crate::client::SlackClient;
use crate::response::{PermalinkEnvelope, PostedMessage};

impl SlackClient {
    pub async fn chat_get_permalink(&self, channel: &str, ts: &str) -> NhResult<String> {
        let envelope: PermalinkEnvelope = self
            .get_method(
                "chat.getPermalink",
                &[("channel", channel), ("message_ts", ts)],
            )
            .await?;
        envelope
            .permalink
            .ok_or_else(|| NhError::Serialization("chat.getPermalink: missing permalink".into()))
    }

    /// Post a plain-text message to a channel.
    pub async fn chat_post_message(&self, channel: &str, text: &str) -> NhResult<PostedMessage> {
        let body = json!({ "channel": channel, "text": text });
        self.post_method("chat.postMessage", &body).await
    }
}
