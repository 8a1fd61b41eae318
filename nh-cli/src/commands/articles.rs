//! Article commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use nh_core::error::{NhError, NhResult};
use nh_models::{Article, ArticleDraft};
use crate::OutputFormat;

use super::{actor_email, AppContext};

#[derive(Subcommand)]
pub enum ArticlesAction {
    /// List all articles.
    List,
    /// Show one article.
    Show {
        /// Article id.
        id: String,
    },
    /// Add a new article.
    Add {
        /// Title.
        #[arg(short, long)]
        title: String,
        /// Body text.
        #[arg(short, long, default_value = "")]
        content: String,
        /// Comma-separated tags.
        #[arg(long, default_value = "")]
        tags: String,
        /// Author email (defaults to NOTEHUB_USER_EMAIL).
        #[arg(long = "as")]
        actor: Option<String>,
    },
    /// Replace title, content and tags of your own article.
    Update {
        /// Article id.
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long = "as")]
        actor: Option<String>,
    },
    /// Delete your own article.
    Delete {
        /// Article id.
        id: String,
        #[arg(long = "as")]
        actor: Option<String>,
    },
}

pub async fn run(ctx: &AppContext, action: ArticlesAction, format: OutputFormat) -> NhResult<()> {
    let store = ctx.open_store()?;
    let articles = ctx.article_service(store)?;
    // `notehub init` creates the sheet
    articles.ensure_ready()?;

    match action {
        ArticlesAction::List => {
            let list = articles.try_list()?;
            match format {
                OutputFormat::Json => super::print_json(&list)?,
                OutputFormat::Text => print_table(&list),
            }
        }
        ArticlesAction::Show { id } => {
            let article = articles
                .get(&id)
                .ok_or_else(|| NhError::ArticleNotFound(id.clone()))?;
            match format {
                OutputFormat::Json => super::print_json(&article)?,
                OutputFormat::Text => print_article(&article),
            }
        }
        ArticlesAction::Add { title, content, tags, actor } => {
            let actor = actor_email(actor)?;
            let draft = ArticleDraft { title, content, tags };
            let article = articles.add(&draft, &actor).await?;
            report(format, "added", &article)?;
        }
        ArticlesAction::Update { id, title, content, tags, actor } => {
            let actor = actor_email(actor)?;
            let draft = ArticleDraft { title, content, tags };
            let article = articles.update(&id, &draft, &actor)?;
            report(format, "updated", &article)?;
        }
        ArticlesAction::Delete { id, actor } => {
            let actor = actor_email(actor)?;
            articles.delete(&id, &actor)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "status": "deleted", "id": id }));
                }
                OutputFormat::Text => {
                    println!("  {} Deleted article {id}", style("OK").green().bold());
                }
            }
        }
    }
    Ok(())
}

fn report(format: OutputFormat, status: &str, article: &Article) -> NhResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "status": status, "id": article.id }));
        }
        OutputFormat::Text => {
            println!(
                "  {} Article {status}: {} ({})",
                style("OK").green().bold(),
                article.title,
                style(&article.id).dim()
            );
        }
    }
    Ok(())
}

fn print_table(list: &[Article]) {
    if list.is_empty() {
        println!("No articles found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Author", "Updated", "Tags"]);

    for article in list {
        let updated = article.updated_at.get(..10).unwrap_or(&article.updated_at);
        table.add_row(vec![
            super::truncate(&article.id, 13),
            super::truncate(&article.title, 40),
            article.author_name.clone(),
            updated.to_string(),
            article.tags.join(", "),
        ]);
    }

    println!("{table}");
    println!("\n{} articles", list.len());
}

fn print_article(article: &Article) {
    println!("{}", style(&article.title).bold());
    println!(
        "{} by {} <{}>",
        style(&article.id).dim(),
        article.author_name,
        article.author_email
    );
    println!("Created: {}  Updated: {}", article.created_at, article.updated_at);
    if !article.tags.is_empty() {
        println!("Tags:    {}", article.tags.join(", "));
    }
    println!();
    println!("{}", article.content);
}
