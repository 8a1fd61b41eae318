//! Smoke-test command - exercise setup, articles, feed and sync once.

use console::style;

use nh_core::error::{NhError, NhResult};
use nh_services::{ChannelSynchronizer, SmokeTest};
use crate::OutputFormat;

use super::{actor_email, AppContext};

pub async fn run(ctx: &AppContext, actor: Option<String>, format: OutputFormat) -> NhResult<()> {
    let actor = actor_email(actor)?;
    let store = ctx.open_store()?;
    let articles = ctx.article_service(store.clone())?;
    let sync = if ctx.config.is_slack_sync_configured() {
        Some(
            ChannelSynchronizer::new(ctx.config.clone(), store.clone(), ctx.slack_api()?)
                .with_page_size(ctx.baked.sync.page_size),
        )
    } else {
        None
    };

    let report = SmokeTest::new(ctx.config.clone(), store, articles, sync, &actor)
        .run()
        .await;

    match format {
        OutputFormat::Json => super::print_json(&report)?,
        OutputFormat::Text => {
            let step = |name: &str, value: &str| {
                let mark = if value.starts_with("error") {
                    style("FAIL").red().bold()
                } else {
                    style(" ok ").green()
                };
                println!("  [{mark}] {name:<10} {value}");
            };
            step("ensure", &report.ensure);
            step("add", &report.added);
            step("list", &format!("{} articles, dummy found: {}", report.article_count, report.found_dummy));
            step("delete", &report.delete);
            step("content", &format!("{} entries", report.content_count));
            step("slack", &report.slack_sync);
        }
    }

    if report.passed() {
        Ok(())
    } else {
        Err(NhError::Service("smoke test failed".into()))
    }
}
