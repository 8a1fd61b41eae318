//! Sync command - pull new Slack messages into the messages sheet.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use nh_core::error::NhResult;
use nh_services::{ChannelOutcome, ChannelStatus, ChannelSynchronizer, SyncReport};
use crate::OutputFormat;

use super::AppContext;

pub async fn run(ctx: &AppContext, channel: Option<String>, format: OutputFormat) -> NhResult<()> {
    let store = ctx.open_store()?;
    let api = ctx.slack_api()?;
    let synchronizer = ChannelSynchronizer::new(ctx.config.clone(), store, api)
        .with_page_size(ctx.baked.sync.page_size);

    if matches!(format, OutputFormat::Text) {
        println!("  {} Syncing Slack channels...\n", style("SYNC").cyan().bold());
    }

    let report = match channel {
        Some(id) if ctx.config.is_slack_sync_configured() => SyncReport {
            skipped: None,
            outcomes: vec![synchronizer.sync_channel(&id).await],
        },
        _ => synchronizer.sync_all().await,
    };

    match format {
        OutputFormat::Json => {
            let outcomes: Vec<_> = report.outcomes.iter().map(outcome_json).collect();
            println!("{}", serde_json::json!({
                "summary": report.to_string(),
                "skipped": report.skipped,
                "appended": report.rows_appended(),
                "failed": report.failed(),
                "channels": outcomes,
            }));
        }
        OutputFormat::Text => {
            if let Some(reason) = &report.skipped {
                println!("  {} Sync skipped: {reason}", style("SKIP").yellow().bold());
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Channel", "Status", "Appended", "Skipped"]);

            for outcome in &report.outcomes {
                let (status, appended, skipped) = match &outcome.status {
                    ChannelStatus::UpToDate => ("up to date".to_string(), "-".into(), "-".into()),
                    ChannelStatus::Appended { rows, skipped } => {
                        ("appended".to_string(), rows.to_string(), skipped.to_string())
                    }
                    ChannelStatus::Failed { message, .. } => {
                        (format!("failed: {}", super::truncate(message, 50)), "-".into(), "-".into())
                    }
                };
                table.add_row(vec![outcome.channel_id.clone(), status, appended, skipped]);
            }
            println!("{table}");

            let label = if report.failed() > 0 {
                style("WARN").yellow().bold()
            } else {
                style("OK").green().bold()
            };
            println!("\n  {label} {report}");
        }
    }
    Ok(())
}

fn outcome_json(outcome: &ChannelOutcome) -> serde_json::Value {
    match &outcome.status {
        ChannelStatus::UpToDate => serde_json::json!({
            "channel": outcome.channel_id,
            "status": "up_to_date",
        }),
        ChannelStatus::Appended { rows, skipped } => serde_json::json!({
            "channel": outcome.channel_id,
            "status": "appended",
            "rows": rows,
            "skipped": skipped,
        }),
        ChannelStatus::Failed { kind, message } => serde_json::json!({
            "channel": outcome.channel_id,
            "status": "failed",
            "kind": format!("{kind:?}"),
            "error": message,
        }),
    }
}
