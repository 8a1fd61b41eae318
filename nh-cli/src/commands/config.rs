//! Config commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use nh_core::config::BakedConfig;
use nh_core::constants::property_keys;
use nh_core::error::{NhError, NhResult};
use nh_core::ResolvedConfig;
use crate::OutputFormat;

use super::AppContext;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved configuration (bot token masked).
    Show,
    /// Get one resolved value by property key (e.g. SLACK_CHANNEL_IDS).
    Get {
        /// Property key.
        key: String,
    },
    /// Print the default baked configuration file path.
    Path,
    /// Write a baked configuration file with default values.
    Init {
        /// Output file path (defaults to the standard location).
        #[arg(long)]
        path: Option<String>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        let visible: String = secret.chars().take(5).collect();
        format!("{visible}********")
    }
}

/// Resolved value for a property key. The bot token is masked.
fn resolved_value(cfg: &ResolvedConfig, key: &str) -> Option<String> {
    match key {
        property_keys::SPREADSHEET_ID => Some(cfg.spreadsheet_id.clone()),
        property_keys::ARTICLES_SHEET_NAME => Some(cfg.articles_sheet.clone()),
        property_keys::SLACK_SHEET_NAME => Some(cfg.slack_sheet.clone()),
        property_keys::DRIVE_IMAGES_FOLDER => Some(cfg.images_folder.clone()),
        property_keys::SLACK_BOT_TOKEN => Some(mask(&cfg.slack_bot_token)),
        property_keys::SLACK_CHANNEL_IDS => Some(cfg.slack_channel_ids.join(",")),
        property_keys::SLACK_NOTIFICATION_CHANNEL_IDS => {
            Some(cfg.slack_notification_channel_ids.join(","))
        }
        property_keys::WEB_APP_URL => Some(cfg.web_app_url.clone()),
        _ => None,
    }
}

pub async fn run(ctx: &AppContext, action: ConfigAction, format: OutputFormat) -> NhResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = &ctx.config;
            match format {
                OutputFormat::Json => {
                    let mut shown = cfg.clone();
                    shown.slack_bot_token = mask(&cfg.slack_bot_token);
                    let store_path = ctx.baked.effective_store_path(&cfg.spreadsheet_id)?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "resolved": shown,
                            "slack_sync_configured": cfg.is_slack_sync_configured(),
                            "slack_notify_configured": cfg.is_slack_notify_configured(),
                            "store_path": store_path.display().to_string(),
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{}", style("Resolved configuration").bold());
                    for key in property_keys::ALL {
                        let value = resolved_value(cfg, key).unwrap_or_default();
                        let value = if value.is_empty() {
                            style("(unset)".to_string()).dim().to_string()
                        } else {
                            value
                        };
                        println!("  {:<32} {value}", key);
                    }
                    println!();
                    let flag = |on: bool| {
                        if on {
                            style("yes").green().to_string()
                        } else {
                            style("no").yellow().to_string()
                        }
                    };
                    println!("  Slack sync configured:   {}", flag(cfg.is_slack_sync_configured()));
                    println!("  Slack notify configured: {}", flag(cfg.is_slack_notify_configured()));
                    println!(
                        "  Store:                   {}",
                        ctx.baked.effective_store_path(&cfg.spreadsheet_id)?.display()
                    );
                }
            }
        }
        ConfigAction::Get { key } => {
            let value = resolved_value(&ctx.config, &key)
                .ok_or_else(|| NhError::InvalidInput(format!("unknown property key: {key}")))?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "key": key, "value": value })),
                OutputFormat::Text => println!("{value}"),
            }
        }
        ConfigAction::Path => {
            let path = BakedConfig::default_config_path()?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "path": path.display().to_string() }));
                }
                OutputFormat::Text => println!("{}", path.display()),
            }
        }
        ConfigAction::Init { path, force } => {
            let path = match path {
                Some(p) => PathBuf::from(p),
                None => BakedConfig::default_config_path()?,
            };
            if path.exists() && !force {
                return Err(NhError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            BakedConfig::default().save_to_file(&path)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "status": "written", "path": path.display().to_string() }));
                }
                OutputFormat::Text => {
                    println!("  {} Wrote {}", style("OK").green().bold(), path.display());
                }
            }
        }
    }
    Ok(())
}
