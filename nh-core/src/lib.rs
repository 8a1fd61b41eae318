//! NoteHub Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other NoteHub crates:
//! - Baked (deployment) configuration loaded from TOML
//! - Runtime property stores and the configuration resolver
//! - Global error type with a small error-kind taxonomy
//! - Structured logging with tracing
//! - Platform directories and common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;
pub mod properties;
pub mod resolve;

// Re-export commonly used items at the crate root
pub use config::BakedConfig;
pub use error::{ErrorKind, NhError, NhResult};
pub use logging::init_logging;
pub use platform::Platform;
pub use properties::PropertyStore;
pub use resolve::ResolvedConfig;
