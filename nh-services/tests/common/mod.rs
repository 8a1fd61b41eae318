//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use nh_api::{ChannelApi, HistoryPage, PostedMessage, SlackChannel, SlackMessage, SlackProfile, SlackUser};
use nh_core::config::DatabaseConfig;
use nh_core::error::{NhError, NhResult};
use nh_core::ResolvedConfig;
use nh_models::{Database, SheetStore, SlackTs};

/// Create a temporary SQLite-backed row store.
/// Returns the store and the TempDir (must be held alive for the duration of the test).
pub fn create_test_store() -> (Arc<SheetStore>, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("spreadsheet.db");
    let db = Database::init(&path, &DatabaseConfig::default()).expect("failed to init test database");
    (Arc::new(SheetStore::new(db)), dir)
}

/// A resolved configuration with Slack ingestion for `channels` and
/// notifications to `N1`.
pub fn slack_config(channels: &[&str]) -> ResolvedConfig {
    ResolvedConfig {
        slack_bot_token: "xoxb-test".into(),
        slack_channel_ids: channels.iter().map(|c| c.to_string()).collect(),
        slack_notification_channel_ids: vec!["N1".into()],
        web_app_url: "https://notehub.example/app/".into(),
        ..ResolvedConfig::default()
    }
}

pub fn msg(ts: &str, user: &str, text: &str) -> SlackMessage {
    SlackMessage {
        ts: ts.into(),
        user: if user.is_empty() { None } else { Some(user.into()) },
        text: Some(text.into()),
        subtype: None,
    }
}

pub fn join(ts: &str, user: &str) -> SlackMessage {
    SlackMessage {
        subtype: Some("channel_join".into()),
        ..msg(ts, user, &format!("<@{user}> has joined the channel"))
    }
}

pub fn leave(ts: &str, user: &str) -> SlackMessage {
    SlackMessage {
        subtype: Some("channel_leave".into()),
        ..msg(ts, user, &format!("<@{user}> has left the channel"))
    }
}

/// Every call made against the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    History {
        channel: String,
        oldest: Option<String>,
        limit: u32,
    },
    UserInfo(String),
    ChannelInfo(String),
    Permalink { channel: String, ts: String },
    Post { channel: String, text: String },
}

#[derive(Default)]
struct FakeState {
    /// Per channel, oldest first.
    history: HashMap<String, Vec<SlackMessage>>,
    history_errors: HashMap<String, String>,
    users: HashMap<String, SlackUser>,
    failing_users: HashSet<String>,
    channel_names: HashMap<String, String>,
    channel_info_fails: bool,
    permalink_fails: bool,
    failing_post_channels: HashSet<String>,
    calls: Vec<Call>,
}

/// In-memory stand-in for the Slack Web API.
///
/// History honours `oldest` inclusively (the worst case for dedup) and
/// returns the newest `limit` messages, newest first.
#[derive(Clone, Default)]
pub struct FakeChannelApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeChannelApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add messages to a channel's history. Order does not matter.
    pub fn post_history(&self, channel: &str, messages: Vec<SlackMessage>) {
        let mut state = self.state.lock().unwrap();
        let entry = state.history.entry(channel.to_string()).or_default();
        entry.extend(messages);
        entry.sort_by_key(|m| SlackTs::parse(&m.ts).ok());
    }

    pub fn reject_history(&self, channel: &str, error: &str) {
        self.state
            .lock()
            .unwrap()
            .history_errors
            .insert(channel.into(), error.into());
    }

    pub fn add_user(&self, id: &str, real_name: &str, name: &str, avatar: &str) {
        let user = SlackUser {
            id: id.into(),
            name: Some(name.into()),
            real_name: Some(real_name.into()),
            profile: Some(SlackProfile {
                image_48: if avatar.is_empty() { None } else { Some(avatar.into()) },
            }),
        };
        self.state.lock().unwrap().users.insert(id.into(), user);
    }

    pub fn fail_user(&self, id: &str) {
        self.state.lock().unwrap().failing_users.insert(id.into());
    }

    pub fn name_channel(&self, id: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .channel_names
            .insert(id.into(), name.into());
    }

    pub fn fail_channel_info(&self) {
        self.state.lock().unwrap().channel_info_fails = true;
    }

    pub fn fail_permalinks(&self) {
        self.state.lock().unwrap().permalink_fails = true;
    }

    pub fn fail_posts_to(&self, channel: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_post_channels
            .insert(channel.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn user_info_calls(&self, user: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::UserInfo(u) if u == user))
            .count()
    }

    pub fn history_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::History { .. }))
            .collect()
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Post { channel, text } => Some((channel, text)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

fn rejected(method: &str, error: &str) -> NhError {
    NhError::ApiRejected {
        method: method.into(),
        error: error.into(),
    }
}

#[async_trait]
impl ChannelApi for FakeChannelApi {
    async fn fetch_history(
        &self,
        channel: &str,
        oldest: Option<&str>,
        limit: u32,
    ) -> NhResult<HistoryPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::History {
            channel: channel.into(),
            oldest: oldest.map(String::from),
            limit,
        });
        if let Some(error) = state.history_errors.get(channel) {
            return Err(rejected("conversations.history", error));
        }

        let floor = oldest.and_then(|o| SlackTs::parse(o).ok());
        let mut page: Vec<SlackMessage> = state
            .history
            .get(channel)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|m| match (&floor, SlackTs::parse(&m.ts)) {
                (Some(floor), Ok(ts)) => ts >= *floor,
                _ => true,
            })
            .collect();
        page.reverse();
        page.truncate(limit as usize);
        Ok(HistoryPage {
            messages: page,
            has_more: false,
        })
    }

    async fn fetch_user_info(&self, user: &str) -> NhResult<SlackUser> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UserInfo(user.into()));
        if state.failing_users.contains(user) {
            return Err(NhError::Timeout("users.info timed out".into()));
        }
        state
            .users
            .get(user)
            .cloned()
            .ok_or_else(|| rejected("users.info", "user_not_found"))
    }

    async fn fetch_channel_info(&self, channel: &str) -> NhResult<SlackChannel> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ChannelInfo(channel.into()));
        if state.channel_info_fails {
            return Err(rejected("conversations.info", "missing_scope"));
        }
        Ok(SlackChannel {
            id: channel.into(),
            name: state.channel_names.get(channel).cloned(),
        })
    }

    async fn fetch_permalink(&self, channel: &str, ts: &str) -> NhResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Permalink {
            channel: channel.into(),
            ts: ts.into(),
        });
        if state.permalink_fails {
            return Err(NhError::Http("connection reset".into()));
        }
        Ok(format!(
            "https://slack.example/archives/{channel}/p{}",
            ts.replace('.', "")
        ))
    }

    async fn post_message(&self, channel: &str, text: &str) -> NhResult<PostedMessage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Post {
            channel: channel.into(),
            text: text.into(),
        });
        if state.failing_post_channels.contains(channel) {
            return Err(rejected("chat.postMessage", "channel_not_found"));
        }
        Ok(PostedMessage {
            channel: Some(channel.into()),
            ts: Some("1800000000.000100".into()),
        })
    }
}
