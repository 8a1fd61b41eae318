//! NoteHub Models - Row store, schema, migrations, and row models.
//!
//! This crate owns all data persistence. The backing store is modelled as a
//! spreadsheet: named sheets holding append-ordered rows of string cells.
//! `SheetStore` implements that contract on SQLite; the typed models map
//! sheet rows to articles and ingested Slack messages.

pub mod db;
pub mod schema;
pub mod migrations;
pub mod store;
pub mod models;

// Re-export key types
pub use db::{Database, DbPool};
pub use store::{Cells, HeaderIndex, RowStore, SheetStore, StoredRow};
pub use models::article::{Article, ArticleDraft};
pub use models::slack_message::IngestedMessage;
pub use models::timestamp::SlackTs;
