//! Comment moderation against a temporary SQLite database

use castdesk::comments::{CommentModerator, StatusTag};
use castdesk::database::{database_url, initialize_database, DatabaseManager};
use castdesk::settings::{SettingsCategory, SettingsManager};
use castdesk::utils::CastdeskError;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

async fn setup(require_approval: bool) -> (TempDir, CommentModerator) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let pool = initialize_database(&database_url(&dir.path().join("comments.db")))
        .await
        .expect("Failed to initialize database");
    let db = DatabaseManager::new(pool);
    let settings = SettingsManager::load(db.clone(), vec!["en".to_string()])
        .await
        .expect("Failed to load settings");

    let values = HashMap::from([
        ("req_comment_approval".to_string(), require_approval.to_string()),
        ("vulgarity_filtered_words".to_string(), "heck".to_string()),
    ]);
    settings
        .save(SettingsCategory::Comments, &values)
        .await
        .expect("Failed to save comment settings");

    (dir, CommentModerator::new(db, Arc::new(settings)))
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<CastdeskError>(), Some(CastdeskError::NotFound(_)))
}

#[tokio::test]
async fn test_post_respects_approval_setting() {
    let (_dir, moderator) = setup(true).await;
    let comment = moderator.post("Hello", "First!").await.unwrap();
    assert!(comment.status.contains(StatusTag::Unreviewed));
    assert!(!comment.status.is_published());

    let (_dir, moderator) = setup(false).await;
    let comment = moderator.post("Hello", "First!").await.unwrap();
    assert!(comment.status.is_published());
}

#[tokio::test]
async fn test_post_requires_subject_and_body() {
    let (_dir, moderator) = setup(false).await;
    assert!(moderator.post("  ", "body").await.is_err());
    assert!(moderator.post("subject", "").await.is_err());
}

#[tokio::test]
async fn test_approve_and_trash_results() {
    let (_dir, moderator) = setup(true).await;
    let comment = moderator.post("Nice", "Great clip").await.unwrap();

    let approved = moderator.approve(comment.id).await.unwrap();
    assert!(approved.success);
    assert_eq!(approved.id, comment.id);
    assert_eq!(approved.status, "publish");
    assert_eq!(
        serde_json::to_value(&approved).unwrap(),
        serde_json::json!({"success": true, "id": comment.id, "status": "publish"})
    );

    let trashed = moderator.trash(comment.id).await.unwrap();
    assert_eq!(trashed.status, "trash");

    let restored = moderator.approve(comment.id).await.unwrap();
    assert_eq!(restored.status, "publish");
}

#[tokio::test]
async fn test_missing_comment_is_not_found() {
    let (_dir, moderator) = setup(false).await;
    assert!(is_not_found(&moderator.approve(404).await.unwrap_err()));
    assert!(is_not_found(&moderator.trash(404).await.unwrap_err()));
    assert!(is_not_found(&moderator.save(404, "x").await.unwrap_err()));
}

#[tokio::test]
async fn test_list_hides_trash() {
    let (_dir, moderator) = setup(false).await;
    let published = moderator.post("Old", "published one").await.unwrap();
    let trashed = moderator.post("Spam", "buy now").await.unwrap();
    moderator.trash(trashed.id).await.unwrap();

    let comments = moderator.list(None).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, published.id);
}

#[tokio::test]
async fn test_list_ordering_and_search() {
    let (_dir, moderator) = setup(true).await;
    let first = moderator.post("Alpha", "approved later").await.unwrap();
    let second = moderator.post("Beta", "still waiting").await.unwrap();
    let third = moderator.post("Gamma", "100% waiting").await.unwrap();
    moderator.approve(first.id).await.unwrap();

    let ids: Vec<i64> = moderator.list(None).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, third.id, first.id]);

    let found = moderator.list(Some("WAITING")).await.unwrap();
    assert_eq!(found.len(), 2);

    let found = moderator.list(Some("100%")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, third.id);

    assert_eq!(moderator.list(Some("   ")).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_edit_filters_and_blocks_trashed() {
    let (_dir, moderator) = setup(false).await;
    let comment = moderator.post("Edit me", "original").await.unwrap();

    let edited = moderator.save(comment.id, "what the heck").await.unwrap();
    assert_eq!(edited.body, "what the ****");
    assert!(edited.status.is_published());

    moderator.trash(comment.id).await.unwrap();
    assert!(is_not_found(&moderator.save(comment.id, "sneaky").await.unwrap_err()));
}
