//! NoteHub API - Slack Web API access.
//!
//! `ChannelApi` is the seam the synchronizer and notifier talk through.
//! `SlackClient` implements it over HTTPS with a bearer token and an
//! injected `RateLimiter` spacing out the per-message enrichment calls.

pub mod channel_api;
pub mod client;
pub mod endpoints;
pub mod limiter;
pub mod response;

// Re-export key types
pub use channel_api::ChannelApi;
pub use client::SlackClient;
pub use limiter::{IntervalLimiter, NoopLimiter, RateLimiter};
pub use response::{
    HistoryPage, PostedMessage, SlackChannel, SlackMessage, SlackProfile, SlackResponse, SlackUser,
};
