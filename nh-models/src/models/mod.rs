//! Typed views over sheet rows.

pub mod article;
pub mod slack_message;
pub mod timestamp;
