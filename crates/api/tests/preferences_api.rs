//! HTTP-level tests for per-user preferences.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get_auth, post_json_auth, signed_in_user};
use serde_json::json;

#[tokio::test]
async fn stored_flat_settings_are_merged_with_defaults() {
    let app = build_test_app().await;
    let token = signed_in_user(&app, "prefs@b.com", 7).await;
    let user = app.state.identity.user_by_email("prefs@b.com").await.unwrap();

    sqlx::query("INSERT INTO userpref (user_id, settings) VALUES (?, ?)")
        .bind(user.id)
        .bind(r#"{"id2":"blue"}"#)
        .execute(&app.state.pool)
        .await
        .unwrap();

    let response = get_auth(&app.router, "/users/preferences", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["settings"]["settings"]["id1"], "33");
    assert_eq!(json["settings"]["settings"]["id2"], "blue");
    assert_eq!(json["settings"]["settings"]["pageSize"], "25");
    assert_eq!(json["options"]["options"][0]["id"], "id1");
}

#[tokio::test]
async fn saved_values_win_over_defaults() {
    let app = build_test_app().await;
    let token = signed_in_user(&app, "save@b.com", 7).await;

    let response = post_json_auth(
        &app.router,
        "/users/preferences",
        &token,
        json!({
            "settings": { "pageSize": "50" },
            "subgroup": { "ui": { "settings": { "theme": "dark" } } },
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(&app.router, "/users/preferences", &token).await).await;
    assert_eq!(json["settings"]["settings"]["pageSize"], "50");
    assert_eq!(json["settings"]["settings"]["id1"], "33");
    assert_eq!(json["settings"]["subgroup"]["ui"]["settings"]["theme"], "dark");
}

#[tokio::test]
async fn values_must_match_declared_types() {
    let app = build_test_app().await;
    let token = signed_in_user(&app, "typed@b.com", 7).await;

    let response = post_json_auth(
        &app.router,
        "/users/preferences",
        &token,
        json!({ "settings": { "pageSize": "lots" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "preferences_invalid_value"
    );
}

#[tokio::test]
async fn malformed_trees_are_rejected_and_leave_stored_settings_alone() {
    let app = build_test_app().await;
    let token = signed_in_user(&app, "shape@b.com", 7).await;

    let saved = post_json_auth(
        &app.router,
        "/users/preferences",
        &token,
        json!({ "settings": { "id2": "blue" } }),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);

    for bad in [
        json!([1, 2, 3]),
        json!("x"),
        json!({ "settings": { "id2": ["x"] } }),
        json!({ "settings": "id2" }),
        json!({ "subgroup": { "ui": 5 } }),
    ] {
        let response = post_json_auth(&app.router, "/users/preferences", &token, bad.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad} should be rejected");
        assert_eq!(
            body_json(response).await["message"],
            "preferences_invalid_value"
        );
    }

    let json = body_json(get_auth(&app.router, "/users/preferences", &token).await).await;
    assert_eq!(json["settings"]["settings"]["id2"], "blue");
}
