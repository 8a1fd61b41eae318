//! `users.*` methods.

use nh_core::error::{NhError, NhResult};

use crate::client::SlackClient;
use crate::response::{SlackUser, UserEnvelope};

impl SlackClient {
    /// Look up a user profile. Not rate limited here; callers pace through
    /// [`crate::ChannelApi::fetch_user_info`].
    pub async fn users_info(&self, user: &str) -> NhResult<SlackUser> {
        let envelope: UserEnvelope = self.get_method("users.info", &[("user", user)]).await?;
        envelope
            .user
            .ok_or_else(|| NhError::Serialization("users.info: missing user".into()))
    }
}
