//! NoteHub Services - Business logic and service layer.
//!
//! This crate provides the concrete services:
//! - Channel sync (watermark-based incremental Slack ingestion)
//! - Articles (CRUD with author-only edits)
//! - Feed (merged article + Slack content, search)
//! - Notifications (new-article announcements)
//! - Image uploads (file store, naming, sharing fallback)
//! - Sheet setup and the deployment smoke test

pub mod setup;
pub mod sync;
pub mod articles;
pub mod feed;
pub mod notify;
pub mod upload;
pub mod smoke;

// Re-export key types
pub use sync::{ChannelOutcome, ChannelStatus, ChannelSynchronizer, SyncReport};
pub use articles::ArticleService;
pub use feed::{ContentItem, FeedService};
pub use notify::Notifier;
pub use upload::{FileStore, LocalFileStore, SharingScope, UploadResult, UploadService};
pub use smoke::{SmokeReport, SmokeTest};
