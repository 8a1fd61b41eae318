//! Integration tests for articles, notifications and the merged feed.
//!
//! Tests article CRUD with author checks, new-article announcements,
//! feed ordering and search, the stored Slack message listing, and the
//! end-to-end smoke test.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{msg, FakeChannelApi};
use nh_core::constants::NOTIFICATION_MARKER;
use nh_core::error::{ErrorKind, NhError};
use nh_core::ResolvedConfig;
use nh_models::{Article, ArticleDraft, RowStore, SheetStore};
use nh_services::setup::ensure_sheet_structure;
use nh_services::{
    ArticleService, ChannelSynchronizer, ContentItem, FeedService, Notifier, SmokeTest,
};

fn draft(title: &str, content: &str, tags: &str) -> ArticleDraft {
    ArticleDraft {
        title: title.into(),
        content: content.into(),
        tags: tags.into(),
    }
}

fn ready_store(config: &ResolvedConfig) -> (Arc<SheetStore>, tempfile::TempDir) {
    let (store, dir) = common::create_test_store();
    ensure_sheet_structure(store.as_ref(), config).unwrap();
    (store, dir)
}

/// Store an article stamped at a fixed time.
fn seed_article(store: &SheetStore, config: &ResolvedConfig, title: &str, year: i32) -> Article {
    let at = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
    let article = Article::create(&draft(title, "body", "old"), "carol@example.com", at);
    store
        .append_rows(&config.articles_sheet, &[article.to_row()])
        .unwrap();
    article
}

// ---- Articles ----

#[tokio::test]
async fn add_then_list_and_get() {
    let config = ResolvedConfig::default();
    let (store, _dir) = ready_store(&config);
    let articles = ArticleService::new(&config, store.clone());

    let added = articles
        .add(&draft("Hello", "World", "rust, notes ,"), "bob@example.com")
        .await
        .unwrap();

    assert!(!added.id.is_empty());
    assert_eq!(added.author_name, "bob");
    assert_eq!(added.tags, vec!["rust", "notes"]);
    assert_eq!(added.created_at, added.updated_at);
    assert!(added.created_at.ends_with('Z'));

    let listed = articles.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, added.id);

    let fetched = articles.get(&added.id).unwrap();
    assert_eq!(fetched.title, "Hello");
    assert!(articles.get("missing").is_none());
    assert!(articles.get("").is_none());
}

#[tokio::test]
async fn only_the_author_may_update() {
    let config = ResolvedConfig::default();
    let (store, _dir) = ready_store(&config);
    let articles = ArticleService::new(&config, store.clone());
    let added = articles
        .add(&draft("v1", "first", ""), "bob@example.com")
        .await
        .unwrap();

    let err = articles
        .update(&added.id, &draft("hijack", "", ""), "eve@example.com")
        .unwrap_err();
    assert!(matches!(err, NhError::ArticleNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Rejected);

    let updated = articles
        .update(&added.id, &draft("v2", "second", "a,b"), "bob@example.com")
        .unwrap();
    assert_eq!(updated.title, "v2");
    assert_eq!(updated.created_at, added.created_at);
    assert_eq!(updated.tags, vec!["a", "b"]);

    let stored = articles.get(&added.id).unwrap();
    assert_eq!(stored.title, "v2");
    assert_eq!(stored.content, "second");
    assert_eq!(articles.list().len(), 1);
}

#[tokio::test]
async fn only_the_author_may_delete() {
    let config = ResolvedConfig::default();
    let (store, _dir) = ready_store(&config);
    let articles = ArticleService::new(&config, store.clone());
    let keep = articles.add(&draft("keep", "", ""), "bob@example.com").await.unwrap();
    let drop = articles.add(&draft("drop", "", ""), "bob@example.com").await.unwrap();

    assert!(articles.delete(&drop.id, "eve@example.com").is_err());
    assert!(matches!(
        articles.delete("", "bob@example.com"),
        Err(NhError::InvalidInput(_))
    ));

    articles.delete(&drop.id, "bob@example.com").unwrap();
    let remaining: Vec<String> = articles.list().into_iter().map(|a| a.id).collect();
    assert_eq!(remaining, vec![keep.id]);
    assert!(matches!(
        articles.delete(&drop.id, "bob@example.com"),
        Err(NhError::ArticleNotFound(_))
    ));
}

#[tokio::test]
async fn missing_articles_sheet_is_not_ready_and_lists_nothing() {
    let config = ResolvedConfig::default();
    let (store, _dir) = common::create_test_store();
    let articles = ArticleService::new(&config, store.clone());

    assert!(articles.list().is_empty());
    assert!(matches!(articles.ensure_ready(), Err(NhError::SheetNotFound(_))));

    ensure_sheet_structure(store.as_ref(), &config).unwrap();
    assert!(articles.ensure_ready().is_ok());
}

// ---- Notifications ----

#[tokio::test]
async fn new_article_is_announced_with_link() {
    let config = common::slack_config(&["C1"]);
    let (store, _dir) = ready_store(&config);
    let api = FakeChannelApi::new();
    let notifier = Notifier::new(&config, Arc::new(api.clone()));
    let articles = ArticleService::new(&config, store).with_notifier(notifier);

    let added = articles
        .add(&draft("Release notes", "", ""), "dana@example.com")
        .await
        .unwrap();

    let posts = api.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "N1");
    assert_eq!(
        posts[0].1,
        format!(
            "{NOTIFICATION_MARKER} New post: <https://notehub.example/app?articleId={}|Release notes> by dana",
            added.id
        )
    );
}

#[tokio::test]
async fn announcement_without_web_url_has_no_link() {
    let config = ResolvedConfig {
        web_app_url: String::new(),
        ..common::slack_config(&[])
    };
    let api = FakeChannelApi::new();
    let notifier = Notifier::new(&config, Arc::new(api.clone()));

    assert_eq!(notifier.notify_new_article("a1", "Plain", "erin").await, 1);
    assert_eq!(
        api.posts()[0].1,
        "[NoteHubNotify] New post: Plain by erin"
    );
}

#[tokio::test]
async fn notification_failures_do_not_fail_the_add() {
    let config = ResolvedConfig {
        slack_notification_channel_ids: vec!["N1".into(), "N2".into()],
        ..common::slack_config(&[])
    };
    let (store, _dir) = ready_store(&config);
    let api = FakeChannelApi::new();
    api.fail_posts_to("N1");
    let notifier = Notifier::new(&config, Arc::new(api.clone()));

    assert_eq!(notifier.notify_new_article("a1", "t", "x").await, 1);

    let articles = ArticleService::new(&config, store).with_notifier(notifier);
    assert!(articles.add(&draft("t", "", ""), "x@example.com").await.is_ok());
    assert_eq!(api.posts().len(), 4);
}

#[tokio::test]
async fn notifications_disabled_without_token() {
    let config = ResolvedConfig {
        slack_bot_token: String::new(),
        ..common::slack_config(&[])
    };
    let api = FakeChannelApi::new();
    let notifier = Notifier::new(&config, Arc::new(api.clone()));

    assert!(!notifier.is_enabled());
    assert_eq!(notifier.notify_new_article("a1", "t", "x").await, 0);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn announced_articles_are_not_ingested_back() {
    let config = common::slack_config(&["N1"]);
    let (store, _dir) = ready_store(&config);
    let api = FakeChannelApi::new();
    let notifier = Notifier::new(&config, Arc::new(api.clone()));
    notifier.notify_new_article("a1", "Loop", "bob").await;

    // Replay what was posted as channel history.
    let (_, text) = api.posts().remove(0);
    api.post_history("N1", vec![msg("1700000001.000000", "UBOT", &text)]);

    let report = ChannelSynchronizer::new(config.clone(), store.clone(), Arc::new(api.clone()))
        .sync_all()
        .await;
    assert_eq!(report.rows_appended(), 0);
    assert!(store.read_rows(&config.slack_sheet).unwrap().is_empty());
}

// ---- Feed ----

async fn populated_feed() -> (FeedService, Arc<SheetStore>, tempfile::TempDir) {
    let config = common::slack_config(&["C1", "C2"]);
    let (store, dir) = ready_store(&config);

    // 2020 < slack messages (2023) < 2024
    seed_article(&store, &config, "Ancient history", 2020);
    seed_article(&store, &config, "Fresh article", 2024);

    let api = FakeChannelApi::new();
    api.add_user("U1", "Alice Smith", "alice", "");
    api.name_channel("C1", "general");
    api.name_channel("C2", "random");
    api.post_history(
        "C1",
        vec![
            msg("1700000001.000000", "U1", "Deploy finished"),
            msg("1700000003.000000", "U1", "Lunch?"),
        ],
    );
    api.post_history("C2", vec![msg("1700000002.000000", "U1", "cat pictures")]);
    ChannelSynchronizer::new(config.clone(), store.clone(), Arc::new(api))
        .sync_all()
        .await;

    (FeedService::new(&config, store.clone()), store, dir)
}

#[tokio::test]
async fn feed_merges_newest_first() {
    let (feed, _store, _dir) = populated_feed().await;

    let items = feed.content();
    let order: Vec<(&str, String)> = items.iter().map(|i| (i.kind(), i.title())).collect();
    assert_eq!(
        order,
        vec![
            ("article", "Fresh article".to_string()),
            ("slack", "#general".to_string()),
            ("slack", "#random".to_string()),
            ("slack", "#general".to_string()),
            ("article", "Ancient history".to_string()),
        ]
    );
    assert!(items.windows(2).all(|w| w[0].timestamp() >= w[1].timestamp()));
}

#[tokio::test]
async fn feed_search_is_case_insensitive_across_fields() {
    let (feed, _store, _dir) = populated_feed().await;

    let hits = feed.search("DEPLOY");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content(), "Deploy finished");

    assert_eq!(feed.search("channel:random").len(), 1);
    assert_eq!(feed.search("carol").len(), 2);
    assert_eq!(feed.search("alice").len(), 3);
    assert_eq!(feed.search("  ").len(), 5);
    assert!(feed.search("nothing matches this").is_empty());
}

#[tokio::test]
async fn slack_messages_filter_and_limit() {
    let (feed, _store, _dir) = populated_feed().await;

    let all = feed.slack_messages(None, None);
    let stamps: Vec<&str> = all.iter().map(|m| m.timestamp.as_str()).collect();
    assert_eq!(
        stamps,
        vec!["1700000003.000000", "1700000002.000000", "1700000001.000000"]
    );

    let general = feed.slack_messages(Some("C1"), None);
    assert_eq!(general.len(), 2);
    assert!(general.iter().all(|m| m.channel_name == "general"));

    let newest = feed.slack_messages(Some(""), Some(1));
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].text, "Lunch?");

    assert!(feed.slack_messages(Some("C9"), None).is_empty());
}

#[tokio::test]
async fn slack_item_serializes_with_type_tag() {
    let (feed, _store, _dir) = populated_feed().await;

    let item = feed
        .content()
        .into_iter()
        .find(|i| matches!(i, ContentItem::Slack { .. }))
        .unwrap();
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["type"], "slack");
    assert_eq!(json["id"], "slack-1700000003.000000-C1");
    assert_eq!(json["author"]["name"], "Alice Smith");
    assert_eq!(json["channel"]["id"], "C1");
}

#[tokio::test]
async fn feed_without_sheets_is_empty() {
    let (store, _dir) = common::create_test_store();
    let feed = FeedService::new(&ResolvedConfig::default(), store);
    assert!(feed.content().is_empty());
    assert!(feed.slack_messages(None, Some(10)).is_empty());
}

// ---- Smoke test ----

#[tokio::test]
async fn smoke_test_without_slack() {
    let config = ResolvedConfig::default();
    let (store, _dir) = common::create_test_store();
    let articles = ArticleService::new(&config, store.clone());

    let report = SmokeTest::new(config.clone(), store.clone(), articles, None, "ops@example.com")
        .run()
        .await;

    assert_eq!(report.ensure, "sheets ready");
    assert!(report.added.starts_with("[SMOKE] ping "));
    assert_eq!(report.article_count, 1);
    assert!(report.found_dummy);
    assert_eq!(report.delete, "deleted");
    assert_eq!(report.content_count, 0);
    assert_eq!(report.slack_sync, "skip (no slack config)");
    assert!(report.passed());

    // The throwaway article is gone again.
    assert!(store.read_rows(&config.articles_sheet).unwrap().is_empty());
}

#[tokio::test]
async fn smoke_test_keeps_existing_articles_and_syncs() {
    let config = common::slack_config(&["C1"]);
    let (store, _dir) = ready_store(&config);
    let existing = seed_article(&store, &config, "Keep me", 2024);

    let api = FakeChannelApi::new();
    api.post_history("C1", vec![msg("1700000001.000000", "", "hello")]);
    let sync = ChannelSynchronizer::new(config.clone(), store.clone(), Arc::new(api.clone()));
    let articles = ArticleService::new(&config, store.clone());

    let report = SmokeTest::new(config.clone(), store.clone(), articles, Some(sync), "ops@example.com")
        .run()
        .await;

    assert!(report.passed(), "{report:?}");
    assert_eq!(report.article_count, 2);
    assert_eq!(report.content_count, 1);
    assert_eq!(report.slack_sync, "ok");

    let remaining = ArticleService::new(&config, store.clone()).list();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, existing.id);
    assert_eq!(store.read_rows(&config.slack_sheet).unwrap().len(), 1);
}

#[tokio::test]
async fn smoke_test_reports_sync_failure() {
    let config = common::slack_config(&["C1"]);
    let (store, _dir) = common::create_test_store();
    let api = FakeChannelApi::new();
    api.reject_history("C1", "invalid_auth");
    let sync = ChannelSynchronizer::new(config.clone(), store.clone(), Arc::new(api));
    let articles = ArticleService::new(&config, store.clone());

    let report = SmokeTest::new(config, store, articles, Some(sync), "ops@example.com")
        .run()
        .await;

    assert!(report.slack_sync.starts_with("error: "), "{}", report.slack_sync);
    assert!(!report.passed());
}
