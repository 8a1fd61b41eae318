//! Article management.
//!
//! Articles live in their own sheet, one row each. Anyone may add; only the
//! author (matched by email) may update or delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use nh_core::error::{NhError, NhResult};
use nh_core::ResolvedConfig;
use nh_models::{Article, ArticleDraft, RowStore};

use crate::notify::Notifier;

/// Read every article row from `sheet`.
pub fn read_articles(store: &dyn RowStore, sheet: &str) -> NhResult<Vec<Article>> {
    Ok(store.read_rows(sheet)?.iter().map(Article::from_row).collect())
}

/// Service for article CRUD.
pub struct ArticleService {
    sheet: String,
    store: Arc<dyn RowStore>,
    notifier: Option<Notifier>,
}

impl ArticleService {
    pub fn new(config: &ResolvedConfig, store: Arc<dyn RowStore>) -> Self {
        Self {
            sheet: config.articles_sheet.clone(),
            store,
            notifier: None,
        }
    }

    /// Fails with `SheetNotFound` until the articles sheet has been created.
    pub fn ensure_ready(&self) -> NhResult<()> {
        if self.store.has_sheet(&self.sheet)? {
            Ok(())
        } else {
            Err(NhError::SheetNotFound(self.sheet.clone()))
        }
    }

    /// Announce new articles through `notifier`.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// All articles in sheet order. Store failures are logged and yield an
    /// empty list.
    pub fn list(&self) -> Vec<Article> {
        match self.try_list() {
            Ok(articles) => articles,
            Err(e) => {
                error!("failed to read articles: {e}");
                Vec::new()
            }
        }
    }

    pub fn try_list(&self) -> NhResult<Vec<Article>> {
        read_articles(self.store.as_ref(), &self.sheet)
    }

    pub fn get(&self, id: &str) -> Option<Article> {
        if id.is_empty() {
            return None;
        }
        self.list().into_iter().find(|a| a.id == id)
    }

    /// Append a new article authored by `actor_email`, then announce it.
    pub async fn add(&self, draft: &ArticleDraft, actor_email: &str) -> NhResult<Article> {
        let article = Article::create(draft, actor_email, Utc::now());
        self.store.append_rows(&self.sheet, &[article.to_row()])?;
        info!(id = %article.id, "article added");

        if let Some(notifier) = &self.notifier {
            notifier
                .notify_new_article(&article.id, &article.title, &article.author_name)
                .await;
        }
        Ok(article)
    }

    /// Replace title, content and tags of an article owned by `actor_email`.
    pub fn update(&self, id: &str, draft: &ArticleDraft, actor_email: &str) -> NhResult<Article> {
        let mut article = self.find_owned(id, actor_email)?;
        article.apply(draft, Utc::now());
        let row_id = article.row_id.ok_or_else(|| NhError::Internal("article without row id".into()))?;
        self.store.update_row(&self.sheet, row_id, &article.to_row())?;
        info!(id, "article updated");
        Ok(article)
    }

    /// Delete an article owned by `actor_email`.
    pub fn delete(&self, id: &str, actor_email: &str) -> NhResult<()> {
        let article = self.find_owned(id, actor_email)?;
        let row_id = article.row_id.ok_or_else(|| NhError::Internal("article without row id".into()))?;
        self.store.delete_row(&self.sheet, row_id)?;
        info!(id, "article deleted");
        Ok(())
    }

    fn find_owned(&self, id: &str, actor_email: &str) -> NhResult<Article> {
        if id.is_empty() {
            return Err(NhError::InvalidInput("article id is empty".into()));
        }
        self.try_list()?
            .into_iter()
            .find(|a| a.id == id && a.is_authored_by(actor_email))
            .ok_or_else(|| NhError::ArticleNotFound(id.to_string()))
    }
}
