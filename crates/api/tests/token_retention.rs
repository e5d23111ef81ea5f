//! Tests for the background job that sweeps expired e-mail tokens.

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use common::{build_test_app, signed_in_user};
use gatehouse_api::background::token_retention;
use gatehouse_core::email_token::TokenKind;
use gatehouse_db::repositories::EmailTokenRepo;
use gatehouse_db::Dialect;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn sweep_removes_expired_rows_and_keeps_live_ones() {
    let app = build_test_app().await;
    signed_in_user(&app, "sweep@b.com", 7).await;
    let user = app.state.identity.user_by_email("sweep@b.com").await.unwrap();

    let tokens = EmailTokenRepo::new(app.state.pool.clone(), Dialect::Sqlite);
    tokens
        .insert(TokenKind::Reset, user.id, &user.email, "old", Utc::now() - Duration::hours(3))
        .await
        .unwrap();
    tokens
        .insert(TokenKind::Reset, user.id, &user.email, "fresh", Utc::now())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let job = tokio::spawn(token_retention::run(
        Arc::clone(&app.state.identity),
        StdDuration::from_secs(3600),
        cancel.clone(),
    ));

    // The first sweep runs without waiting for the interval.
    let remaining = tokio::time::timeout(StdDuration::from_secs(5), async {
        loop {
            let rows = tokens.list_for_user(TokenKind::Reset, user.id).await.unwrap();
            if rows.iter().all(|row| row.token != "old") {
                return rows;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await
    .expect("expired row should be swept");

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].token, "fresh");

    cancel.cancel();
    tokio::time::timeout(StdDuration::from_secs(5), job)
        .await
        .expect("job should stop once cancelled")
        .unwrap();
}
