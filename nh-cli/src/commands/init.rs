//! Init command - create both sheets with their header rows.

use console::style;

use nh_core::error::NhResult;
use nh_services::setup::ensure_sheet_structure;
use crate::OutputFormat;

use super::AppContext;

pub async fn run(ctx: &AppContext, format: OutputFormat) -> NhResult<()> {
    let store = ctx.open_store()?;
    ensure_sheet_structure(store.as_ref(), &ctx.config)?;
    let stats = store.database().stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "status": "ok",
                "articles_sheet": ctx.config.articles_sheet,
                "slack_sheet": ctx.config.slack_sheet,
                "sheets": stats.sheets,
                "rows": stats.rows,
            }));
        }
        OutputFormat::Text => {
            println!("  {} Sheet structure ready.\n", style("OK").green().bold());
            println!("    Articles:  {}", ctx.config.articles_sheet);
            println!("    Messages:  {}", ctx.config.slack_sheet);
            println!("    Stored:    {stats}");
        }
    }
    Ok(())
}
