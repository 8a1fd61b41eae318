//! Configuration resolution.
//!
//! Merges the baked configuration with a runtime [`PropertyStore`] into one
//! immutable [`ResolvedConfig`]. Resolution never fails: anything missing or
//! left at a template value degrades to the default.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::config::{BakedConfig, ChannelIds};
use crate::constants::property_keys;
use crate::properties::PropertyStore;

lazy_static! {
    static ref SPREADSHEET_URL: Regex =
        Regex::new(r"spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid spreadsheet regex");
    static ref SCRIPT_URL: Regex =
        Regex::new(r"script\.google\.com/(?:d/|macros/s/|home/projects/)([a-zA-Z0-9_-]+)")
            .expect("valid script regex");
}

const PLACEHOLDER_PREFIX: &str = "PUT_";
const PLACEHOLDER_MARKERS: &[&str] = &["YOUR_SLACK", "COMMA_SEPARATED"];

/// Fully resolved configuration, built once at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub spreadsheet_id: String,
    pub articles_sheet: String,
    pub slack_sheet: String,
    pub images_folder: String,
    pub slack_bot_token: String,
    pub slack_channel_ids: Vec<String>,
    pub slack_notification_channel_ids: Vec<String>,
    pub web_app_url: String,
}

impl ResolvedConfig {
    /// Resolve every field: a non-empty runtime property wins over the baked value.
    pub fn resolve(props: &dyn PropertyStore, baked: &BakedConfig) -> Self {
        let lookup = |key: &str| props.get_property(key).filter(|v| !v.is_empty());

        let spreadsheet_id = extract_id(
            &lookup(property_keys::SPREADSHEET_ID).unwrap_or_else(|| baked.spreadsheet_id.clone()),
        );
        let articles_sheet = lookup(property_keys::ARTICLES_SHEET_NAME)
            .unwrap_or_else(|| baked.sheets.articles.clone());
        let slack_sheet = lookup(property_keys::SLACK_SHEET_NAME)
            .unwrap_or_else(|| baked.sheets.slack_messages.clone());
        let images_folder = lookup(property_keys::DRIVE_IMAGES_FOLDER)
            .unwrap_or_else(|| baked.drive.images_folder_name.clone());
        let web_app_url =
            lookup(property_keys::WEB_APP_URL).unwrap_or_else(|| baked.web_app_url.clone());

        let slack = &baked.slack;
        let slack_bot_token = sanitize_scalar(
            lookup(slack.bot_token_property_key.as_str()).unwrap_or_else(|| slack.bot_token.clone()),
        );
        let slack_channel_ids = resolve_channel_ids(
            lookup(slack.channel_ids_property_key.as_str()),
            &slack.channel_ids,
        );
        let slack_notification_channel_ids = resolve_channel_ids(
            lookup(slack.notification_channel_ids_property_key.as_str()),
            &slack.notification_channel_ids,
        );

        Self {
            spreadsheet_id,
            articles_sheet,
            slack_sheet,
            images_folder,
            slack_bot_token,
            slack_channel_ids,
            slack_notification_channel_ids,
            web_app_url,
        }
    }

    /// Whether channel ingestion can run.
    pub fn is_slack_sync_configured(&self) -> bool {
        !self.slack_bot_token.is_empty() && !self.slack_channel_ids.is_empty()
    }

    /// Whether new-article notifications can be posted.
    pub fn is_slack_notify_configured(&self) -> bool {
        !self.slack_bot_token.is_empty() && !self.slack_notification_channel_ids.is_empty()
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::resolve(&std::collections::HashMap::<String, String>::new(), &BakedConfig::default())
    }
}

fn resolve_channel_ids(property: Option<String>, baked: &ChannelIds) -> Vec<String> {
    let raw = match property {
        Some(csv) => ChannelIds::Csv(csv),
        None => baked.clone(),
    };
    normalize_channel_ids(&sanitize_channel_ids(raw))
}

/// Accept either a raw identifier or a URL containing it, and return the identifier.
pub fn extract_id(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    SPREADSHEET_URL
        .captures(value)
        .or_else(|| SCRIPT_URL.captures(value))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Whether a configured value is still the template text.
pub fn is_placeholder(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value.starts_with(PLACEHOLDER_PREFIX)
        || PLACEHOLDER_MARKERS.iter().any(|marker| value.contains(marker))
}

/// Clear a scalar value left at its template text.
pub fn sanitize_scalar(value: String) -> String {
    if is_placeholder(&value) {
        String::new()
    } else {
        value
    }
}

/// Drop template values from a channel list; a template CSV string is cleared whole.
pub fn sanitize_channel_ids(raw: ChannelIds) -> ChannelIds {
    match raw {
        ChannelIds::List(items) => {
            ChannelIds::List(items.into_iter().filter(|v| !is_placeholder(v)).collect())
        }
        ChannelIds::Csv(csv) => ChannelIds::Csv(sanitize_scalar(csv)),
    }
}

/// Split, trim and drop blanks. Order and duplicates are preserved.
pub fn normalize_channel_ids(raw: &ChannelIds) -> Vec<String> {
    let items: Vec<&str> = match raw {
        ChannelIds::List(items) => items.iter().map(String::as_str).collect(),
        ChannelIds::Csv(csv) => csv.split(',').collect(),
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_placeholder(s))
        .map(String::from)
        .collect()
}
