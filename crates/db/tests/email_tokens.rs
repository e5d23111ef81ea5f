//! Integration tests for `EmailTokenRepo`.

mod common;

use chrono::{Duration, Utc};
use gatehouse_core::email_token::TokenKind;
use gatehouse_db::repositories::EmailTokenRepo;
use gatehouse_db::Dialect;

use common::test_pool;

#[tokio::test]
async fn token_is_found_only_under_its_own_kind() {
    let repo = EmailTokenRepo::new(test_pool().await, Dialect::Sqlite);
    let issued = Utc::now();
    repo.insert(TokenKind::Reset, 4, "a@b.com", "tok", issued)
        .await
        .unwrap();

    let row = repo.find(TokenKind::Reset, 4, "tok").await.unwrap().unwrap();
    assert_eq!(row.kind, TokenKind::Reset);
    assert_eq!(row.email, "a@b.com");
    assert_eq!(row.issued.timestamp(), issued.timestamp());

    assert!(repo.find(TokenKind::Activation, 4, "tok").await.unwrap().is_none());
    assert!(repo.find(TokenKind::Reset, 5, "tok").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_is_single_use() {
    let repo = EmailTokenRepo::new(test_pool().await, Dialect::Sqlite);
    repo.insert(TokenKind::OneTimeLogin, 1, "a@b.com", "tok", Utc::now())
        .await
        .unwrap();
    let row = repo.find(TokenKind::OneTimeLogin, 1, "tok").await.unwrap().unwrap();

    assert!(repo.delete(row.id).await.unwrap());
    assert!(!repo.delete(row.id).await.unwrap());
    assert!(repo.find(TokenKind::OneTimeLogin, 1, "tok").await.unwrap().is_none());
}

#[tokio::test]
async fn expired_rows_are_collected_per_user_and_kind() {
    let repo = EmailTokenRepo::new(test_pool().await, Dialect::Sqlite);
    let now = Utc::now();
    let old = now - Duration::hours(3);
    repo.insert(TokenKind::Activation, 1, "a@b.com", "old", old).await.unwrap();
    repo.insert(TokenKind::Activation, 1, "a@b.com", "new", now).await.unwrap();
    repo.insert(TokenKind::Reset, 1, "a@b.com", "other-kind", old).await.unwrap();
    repo.insert(TokenKind::Activation, 2, "c@d.com", "other-user", old).await.unwrap();

    let cutoff = now - Duration::hours(1);
    assert_eq!(repo.delete_expired_for(TokenKind::Activation, 1, cutoff).await.unwrap(), 1);

    let left = repo.list_for_user(TokenKind::Activation, 1).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].token, "new");

    assert_eq!(repo.purge_issued_before(cutoff).await.unwrap(), 2);
    assert!(repo.list_for_user(TokenKind::Reset, 1).await.unwrap().is_empty());
}
