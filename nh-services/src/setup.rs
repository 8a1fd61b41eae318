//! Sheet structure initialisation.

use tracing::info;

use nh_core::constants::headers;
use nh_core::error::NhResult;
use nh_core::ResolvedConfig;
use nh_models::RowStore;

/// Create both sheets if missing and (re)write their header rows.
/// Existing data rows are left alone.
pub fn ensure_sheet_structure(store: &dyn RowStore, config: &ResolvedConfig) -> NhResult<()> {
    store.ensure_sheet(&config.articles_sheet, headers::ARTICLES)?;
    store.ensure_sheet(&config.slack_sheet, headers::SLACK_MESSAGES)?;
    info!(
        articles = %config.articles_sheet,
        messages = %config.slack_sheet,
        "sheet structure ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nh_core::config::DatabaseConfig;
    use nh_models::{Database, SheetStore};

    #[test]
    fn test_ensure_creates_both_sheets() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::init(&dir.path().join("s.db"), &DatabaseConfig::default()).unwrap();
        let store = SheetStore::new(db);
        let config = ResolvedConfig::default();

        ensure_sheet_structure(&store, &config).unwrap();
        ensure_sheet_structure(&store, &config).unwrap();

        assert_eq!(store.headers("Articles").unwrap()[0], "ID");
        assert_eq!(store.headers("SlackMessages").unwrap()[7], "MessageLink");
    }
}
