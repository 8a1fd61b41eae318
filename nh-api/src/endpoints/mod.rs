//! Slack Web API methods, grouped by family.

pub mod chat;
pub mod conversations;
pub mod users;

use async_trait::async_trait;

use nh_core::error::NhResult;

use crate::channel_api::ChannelApi;
use crate::client::SlackClient;
use crate::response::{HistoryPage, PostedMessage, SlackChannel, SlackUser};

#[async_trait]
impl ChannelApi for SlackClient {
    async fn fetch_history(
        &self,
        channel: &str,
        oldest: Option<&str>,
        limit: u32,
    ) -> NhResult<HistoryPage> {
        self.conversations_history(channel, oldest, limit).await
    }

    async fn fetch_user_info(&self, user: &str) -> NhResult<SlackUser> {
        self.pace().await;
        self.users_info(user).await
    }

    async fn fetch_channel_info(&self, channel: &str) -> NhResult<SlackChannel> {
        self.conversations_info(channel).await
    }

    async fn fetch_permalink(&self, channel: &str, ts: &str) -> NhResult<String> {
        self.pace().await;
        self.chat_get_permalink(channel, ts).await
    }

    async fn post_message(&self, channel: &str, text: &str) -> NhResult<PostedMessage> {
        self.chat_post_message(channel, text).await
    }
}
