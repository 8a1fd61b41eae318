//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "NoteHub";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker embedded in every notification this system posts to Slack.
/// Messages carrying it are never ingested back.
pub const NOTIFICATION_MARKER: &str = "[NoteHubNotify]";

/// Display name used when a message author cannot be resolved.
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// Author name used for articles without an author email.
pub const UNKNOWN_AUTHOR_NAME: &str = "unknown";

/// Watermark value meaning "nothing ingested yet".
pub const WATERMARK_SENTINEL: &str = "0";

/// Default number of messages fetched per channel per run.
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 200;

/// Default minimum interval between rate-limited Slack calls.
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 1_200;

/// Default Slack API timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 20_000;

/// Slack Web API root.
pub const SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// Slack message subtypes that describe membership changes, not content.
pub const STRUCTURAL_SUBTYPES: &[&str] = &["channel_join", "channel_leave"];

/// Runtime property keys read by the configuration resolver.
pub mod property_keys {
    pub const SPREADSHEET_ID: &str = "SPREADSHEET_ID";
    pub const ARTICLES_SHEET_NAME: &str = "ARTICLES_SHEET_NAME";
    pub const SLACK_SHEET_NAME: &str = "SLACK_SHEET_NAME";
    pub const DRIVE_IMAGES_FOLDER: &str = "DRIVE_IMAGES_FOLDER";
    pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
    pub const SLACK_CHANNEL_IDS: &str = "SLACK_CHANNEL_IDS";
    pub const SLACK_NOTIFICATION_CHANNEL_IDS: &str = "SLACK_NOTIFICATION_CHANNEL_IDS";
    pub const WEB_APP_URL: &str = "WEB_APP_URL";

    /// All keys, in resolution order.
    pub const ALL: &[&str] = &[
        SPREADSHEET_ID,
        ARTICLES_SHEET_NAME,
        SLACK_SHEET_NAME,
        DRIVE_IMAGES_FOLDER,
        SLACK_BOT_TOKEN,
        SLACK_CHANNEL_IDS,
        SLACK_NOTIFICATION_CHANNEL_IDS,
        WEB_APP_URL,
    ];
}

/// Column headers of the two sheets.
pub mod headers {
    pub const ARTICLES: &[&str] = &[
        "ID",
        "Title",
        "Content",
        "CreatedAt",
        "UpdatedAt",
        "Tags",
        "AuthorEmail",
        "AuthorName",
    ];

    pub const SLACK_MESSAGES: &[&str] = &[
        "Timestamp",
        "UserID",
        "UserName",
        "UserAvatar",
        "Text",
        "ChannelID",
        "ChannelName",
        "MessageLink",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_widths() {
        assert_eq!(headers::ARTICLES.len(), 8);
        assert_eq!(headers::SLACK_MESSAGES.len(), 8);
        assert_eq!(headers::SLACK_MESSAGES[0], "Timestamp");
    }

    #[test]
    fn test_property_keys_unique() {
        let mut keys = property_keys::ALL.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), property_keys::ALL.len());
    }
}
