//! Ingested Slack message rows.

use serde::{Deserialize, Serialize};

use nh_core::constants::headers;

use crate::models::timestamp::SlackTs;
use crate::store::{Cells, HeaderIndex};

/// One row of the messages sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedMessage {
    pub timestamp: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub text: String,
    pub channel_id: String,
    pub channel_name: String,
    pub permalink: String,
}

impl IngestedMessage {
    /// Stable identifier derived from timestamp and channel.
    pub fn id(&self) -> String {
        format!("slack-{}-{}", self.timestamp, self.channel_id)
    }

    pub fn ts(&self) -> Option<SlackTs> {
        SlackTs::parse(&self.timestamp).ok()
    }

    /// Cells in the column order of [`headers::SLACK_MESSAGES`].
    pub fn to_row(&self) -> Cells {
        vec![
            self.timestamp.clone(),
            self.user_id.clone(),
            self.user_name.clone(),
            self.user_avatar.clone(),
            self.text.clone(),
            self.channel_id.clone(),
            self.channel_name.clone(),
            self.permalink.clone(),
        ]
    }

    /// Read a row by header name, so reordered or extra columns still map.
    pub fn from_cells(index: &HeaderIndex, cells: &[String]) -> Self {
        let col = |i: usize| index.get(cells, headers::SLACK_MESSAGES[i]).to_string();
        let timestamp = col(0);
        let timestamp = timestamp
            .strip_prefix('\'')
            .map(str::to_string)
            .unwrap_or(timestamp);
        Self {
            timestamp,
            user_id: col(1),
            user_name: col(2),
            user_avatar: col(3),
            text: col(4),
            channel_id: col(5),
            channel_name: col(6),
            permalink: col(7),
        }
    }
}
