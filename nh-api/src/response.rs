//! Slack Web API response types.
//!
//! Every Slack method answers HTTP 200 with an envelope carrying `ok` and,
//! on failure, an `error` code. The method-specific fields sit alongside
//! them at the top level.

use serde::{Deserialize, Serialize};

use nh_core::error::{NhError, NhResult};

/// Standard Slack response envelope.
///
/// ```json
/// { "ok": true, "messages": [ ... ], "has_more": false }
/// { "ok": false, "error": "channel_not_found" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SlackResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> SlackResponse<T> {
    pub fn is_success(&self) -> bool {
        self.ok
    }

    /// The error code, if the call was rejected.
    pub fn error_message(&self) -> Option<String> {
        if self.ok {
            None
        } else {
            Some(self.error.clone().unwrap_or_else(|| "unknown_error".into()))
        }
    }

    /// Unwrap the payload, turning `ok: false` into [`NhError::ApiRejected`].
    pub fn into_result(self, method: &str) -> NhResult<T> {
        match self.error_message() {
            None => Ok(self.payload),
            Some(error) => Err(NhError::ApiRejected {
                method: method.to_string(),
                error,
            }),
        }
    }
}

/// `conversations.history` payload. Messages arrive newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub messages: Vec<SlackMessage>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

impl SlackMessage {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Author id, treating an empty string as absent.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}

/// `users.info` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub user: Option<SlackUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Option<SlackProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackProfile {
    #[serde(default)]
    pub image_48: Option<String>,
}

impl SlackUser {
    /// `real_name`, else `name`. Empty strings count as missing.
    pub fn display_name(&self) -> Option<&str> {
        self.real_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.name.as_deref().filter(|n| !n.is_empty()))
    }

    pub fn avatar_url(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.image_48.as_deref())
            .unwrap_or("")
    }
}

/// `conversations.info` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelEnvelope {
    #[serde(default)]
    pub channel: Option<SlackChannel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackChannel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `chat.getPermalink` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermalinkEnvelope {
    #[serde(default)]
    pub permalink: Option<String>,
}

/// `chat.postMessage` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}
