//! Article rows.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use nh_core::constants::UNKNOWN_AUTHOR_NAME;

use crate::store::{Cells, StoredRow};

/// A user-authored article stored in the articles sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<String>,
    pub author_email: String,
    pub author_name: String,
    /// Store row id, not part of the sheet.
    #[serde(skip)]
    pub row_id: Option<i64>,
}

/// Caller-supplied article fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    /// Comma-separated tags exactly as entered.
    #[serde(default)]
    pub tags: String,
}

impl Article {
    /// Build a new article with a fresh id, stamped `now`.
    pub fn create(draft: &ArticleDraft, author_email: &str, now: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(now);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
            tags: parse_tags(&draft.tags),
            author_email: author_email.to_string(),
            author_name: guess_name_from_email(author_email),
            row_id: None,
        }
    }

    /// Apply an edit: title, content and tags change, `updated_at` moves to `now`.
    pub fn apply(&mut self, draft: &ArticleDraft, now: DateTime<Utc>) {
        self.title = draft.title.clone();
        self.content = draft.content.clone();
        self.tags = parse_tags(&draft.tags);
        self.updated_at = format_timestamp(now);
    }

    /// Read an article from its positional cells.
    pub fn from_row(row: &StoredRow) -> Self {
        let author_email = row.cell(6).to_string();
        let author_name = match row.cell(7) {
            "" => guess_name_from_email(&author_email),
            name => name.to_string(),
        };
        Self {
            id: row.cell(0).to_string(),
            title: row.cell(1).to_string(),
            content: row.cell(2).to_string(),
            created_at: row.cell(3).to_string(),
            updated_at: row.cell(4).to_string(),
            tags: parse_tags(row.cell(5)),
            author_email,
            author_name,
            row_id: Some(row.id),
        }
    }

    pub fn to_row(&self) -> Cells {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.content.clone(),
            self.created_at.clone(),
            self.updated_at.clone(),
            self.tags.join(","),
            self.author_email.clone(),
            self.author_name.clone(),
        ]
    }

    /// Seconds since the epoch of the last change (update, else creation).
    /// Unparsable dates count as the epoch.
    pub fn timestamp_secs(&self) -> f64 {
        let stamp = if self.updated_at.is_empty() {
            &self.created_at
        } else {
            &self.updated_at
        };
        DateTime::parse_from_rfc3339(stamp)
            .map(|dt| dt.timestamp_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }

    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author_email == email
    }
}

/// RFC 3339 with millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split a comma-separated tag cell, trimming and dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Display name for an author: the local part of the email.
pub fn guess_name_from_email(email: &str) -> String {
    if email.is_empty() {
        return UNKNOWN_AUTHOR_NAME.to_string();
    }
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "Hello".into(),
            content: "Body".into(),
            tags: " rust, ,notes ".into(),
        }
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" a, ,b ,"), vec!["a", "b"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_guess_name() {
        assert_eq!(guess_name_from_email("alice@example.com"), "alice");
        assert_eq!(guess_name_from_email(""), "unknown");
        assert_eq!(guess_name_from_email("noat"), "noat");
    }

    #[test]
    fn test_create_and_row() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let article = Article::create(&draft(), "bob@example.com", now);
        assert_eq!(article.author_name, "bob");
        assert_eq!(article.tags, vec!["rust", "notes"]);
        assert_eq!(article.created_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(article.created_at, article.updated_at);

        let row = StoredRow {
            id: 3,
            cells: article.to_row(),
        };
        let back = Article::from_row(&row);
        assert_eq!(back.id, article.id);
        assert_eq!(back.row_id, Some(3));
        assert_eq!(back.tags, article.tags);
    }

    #[test]
    fn test_from_short_row_guesses_name() {
        let row = StoredRow {
            id: 1,
            cells: vec!["id".into(), "t".into(), "c".into(), "".into(), "".into(), "".into(), "carol@x.org".into()],
        };
        let article = Article::from_row(&row);
        assert_eq!(article.author_name, "carol");
        assert!(article.tags.is_empty());
        assert_eq!(article.timestamp_secs(), 0.0);
    }

    #[test]
    fn test_timestamp_prefers_updated() {
        let mut article = Article::create(
            &draft(),
            "a@b.c",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        article.apply(&draft(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap());
        assert_eq!(article.timestamp_secs(), 1_704_067_210.0);
    }
}
