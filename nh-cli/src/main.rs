//! NoteHub CLI - command-line front end for the NoteHub backend.
//!
//! Stands in for the scheduler and the hosted web runtime: run channel
//! syncs, manage articles, read the merged feed, upload images and run the
//! deployment smoke test from the terminal or a cron job.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use nh_core::config::BakedConfig;
use nh_core::error::NhResult;
use nh_core::logging;
use nh_core::properties::{parse_overrides, EnvProperties, LayeredProperties};
use nh_core::ResolvedConfig;

use commands::AppContext;

/// Prefix of environment variables read as runtime properties.
const ENV_PREFIX: &str = "NOTEHUB_";

/// NoteHub - articles and Slack channels in one searchable feed.
#[derive(Parser)]
#[command(
    name = "notehub",
    version,
    about = "NoteHub backend CLI",
    long_about = "A command-line interface for the NoteHub backend.\n\
                   Mirrors Slack channels into the spreadsheet store and manages articles."
)]
struct Cli {
    /// Path to the baked configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Runtime property override, KEY=VALUE. May be repeated.
    #[arg(short = 's', long = "set", global = true, value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create both sheets and write their header rows.
    Init,
    /// Pull new Slack messages into the messages sheet.
    Sync {
        /// Sync only this channel instead of every configured one.
        #[arg(long)]
        channel: Option<String>,
    },
    /// Create, list and edit articles.
    Articles {
        #[command(subcommand)]
        action: commands::articles::ArticlesAction,
    },
    /// Show the merged article and Slack feed, newest first.
    Feed {
        /// Only entries matching this text (case-insensitive).
        #[arg(short, long)]
        query: Option<String>,
        /// Number of entries to show.
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
    },
    /// List stored Slack messages.
    #[command(name = "slack-messages")]
    SlackMessages {
        /// Only messages from this channel id.
        #[arg(long)]
        channel: Option<String>,
        /// Maximum number of messages.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Inspect the resolved configuration.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Upload an image into the configured images folder.
    Upload {
        /// Image file to upload.
        file: String,
        /// MIME type (guessed from the extension if omitted).
        #[arg(long)]
        mime: Option<String>,
    },
    /// Run the end-to-end smoke test against the configured store.
    #[command(name = "smoke-test")]
    SmokeTest {
        /// Email recorded as the author of the throwaway article.
        #[arg(long = "as")]
        actor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> NhResult<()> {
    let cli = Cli::parse();

    // Load baked configuration
    let baked = match cli.config.as_deref() {
        Some(path) => BakedConfig::load_from_file(std::path::Path::new(path))?,
        None => BakedConfig::load_default()?,
    };

    // Initialize logging
    let mut log_config = baked.logging.clone();
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    let _guard = match baked.effective_log_dir() {
        Ok(dir) => Some(logging::init_from_config(&log_config, &dir)?),
        Err(_) => {
            logging::init_console_logging(&log_config.level);
            None
        }
    };

    // Resolve runtime configuration once: --set first, then environment.
    let overrides = parse_overrides(&cli.set);
    let env = EnvProperties::with_prefix(ENV_PREFIX);
    let props = LayeredProperties::new().with(&overrides).with(&env);
    let resolved = ResolvedConfig::resolve(&props, &baked);

    info!("NoteHub CLI v{}", nh_core::constants::APP_VERSION);

    let ctx = AppContext::new(baked, resolved);

    // Dispatch to command handlers
    match cli.command {
        Commands::Init => commands::init::run(&ctx, cli.format).await,
        Commands::Sync { channel } => commands::sync::run(&ctx, channel, cli.format).await,
        Commands::Articles { action } => commands::articles::run(&ctx, action, cli.format).await,
        Commands::Feed { query, limit } => {
            commands::feed::run_feed(&ctx, query, limit, cli.format).await
        }
        Commands::SlackMessages { channel, limit } => {
            commands::feed::run_slack_messages(&ctx, channel, limit, cli.format).await
        }
        Commands::Config { action } => commands::config::run(&ctx, action, cli.format).await,
        Commands::Upload { file, mime } => {
            commands::upload::run(&ctx, file, mime, cli.format).await
        }
        Commands::SmokeTest { actor } => commands::smoke::run(&ctx, actor, cli.format).await,
    }
}
