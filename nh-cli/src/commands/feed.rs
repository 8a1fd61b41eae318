//! Feed and stored Slack message commands.

use chrono::DateTime;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use nh_core::error::NhResult;
use nh_services::{ContentItem, FeedService};
use crate::OutputFormat;

use super::AppContext;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// `YYYY-MM-DD HH:MM` in UTC, or `-` for the epoch.
fn format_secs(secs: f64) -> String {
    if secs <= 0.0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn run_feed(
    ctx: &AppContext,
    query: Option<String>,
    limit: usize,
    format: OutputFormat,
) -> NhResult<()> {
    let store = ctx.open_store()?;
    let feed = FeedService::new(&ctx.config, store);

    let mut items: Vec<ContentItem> = match query.as_deref() {
        Some(q) => feed.search(q),
        None => feed.content(),
    };
    let total = items.len();
    if limit > 0 {
        items.truncate(limit);
    }

    match format {
        OutputFormat::Json => super::print_json(&items)?,
        OutputFormat::Text => {
            if items.is_empty() {
                println!("Nothing in the feed.");
                return Ok(());
            }
            let mut table = new_table(vec!["When", "Type", "Title", "Author", "Content"]);
            for item in &items {
                table.add_row(vec![
                    format_secs(item.timestamp()),
                    item.kind().to_string(),
                    super::truncate(&item.title(), 30),
                    item.author_name().to_string(),
                    super::truncate(item.content(), 50),
                ]);
            }
            println!("{table}");
            println!("\nShowing {} of {total} entries", items.len());
        }
    }
    Ok(())
}

pub async fn run_slack_messages(
    ctx: &AppContext,
    channel: Option<String>,
    limit: Option<usize>,
    format: OutputFormat,
) -> NhResult<()> {
    let store = ctx.open_store()?;
    let feed = FeedService::new(&ctx.config, store);
    let messages = feed.slack_messages(channel.as_deref(), limit);

    match format {
        OutputFormat::Json => super::print_json(&messages)?,
        OutputFormat::Text => {
            if messages.is_empty() {
                println!("No Slack messages stored.");
                return Ok(());
            }
            let mut table = new_table(vec!["Timestamp", "Channel", "User", "Text"]);
            for msg in &messages {
                table.add_row(vec![
                    msg.timestamp.clone(),
                    format!("#{}", msg.channel_name),
                    msg.user_name.clone(),
                    super::truncate(&msg.text, 60),
                ]);
            }
            println!("{table}");
            println!("\n{} messages", messages.len());
        }
    }
    Ok(())
}
