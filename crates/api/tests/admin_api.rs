//! HTTP-level tests for permissions, role assignment and organization
//! membership.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, build_test_app, get_auth, put_json_auth, send, signed_in_user, TestApp,
};
use serde_json::json;

/// Sign in `email` in `org` and grant it the given role ids there.
async fn user_with_roles(app: &TestApp, email: &str, org: i64, roles: &[i64]) -> (i64, String) {
    let token = signed_in_user(app, email, org).await;
    let user = app.state.identity.user_by_email(email).await.unwrap();
    app.state
        .roles
        .set_roles_by_role_id(user.id, org, roles)
        .await
        .unwrap();
    (user.id, token)
}

#[tokio::test]
async fn permissions_reflect_roles_in_the_session_organization() {
    let app = build_test_app().await;
    let (_, token) = user_with_roles(&app, "viewer@b.com", 7, &[2]).await;

    let response = get_auth(&app.router, "/users/permissions", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "permissions": ["users.list"] })
    );
}

#[tokio::test]
async fn listing_users_requires_permission() {
    let app = build_test_app().await;
    let (_, plain) = user_with_roles(&app, "plain@b.com", 7, &[]).await;
    let (viewer_id, viewer) = user_with_roles(&app, "viewer@b.com", 7, &[2]).await;
    signed_in_user(&app, "elsewhere@b.com", 8).await;

    let denied = get_auth(&app.router, "/users/list", &plain).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(denied).await["message"], "auth_forbidden");

    let listed = get_auth(&app.router, "/users/list?active=true", &viewer).await;
    assert_eq!(listed.status(), StatusCode::OK);
    let users = body_json(listed).await["users"].clone();
    let ids: Vec<i64> = serde_json::from_value(users).unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&viewer_id));
}

#[tokio::test]
async fn admin_replaces_roles_by_name() {
    let app = build_test_app().await;
    let (_, admin) = user_with_roles(&app, "admin@b.com", 7, &[1]).await;
    let (target, _) = user_with_roles(&app, "target@b.com", 7, &[]).await;
    let path = format!("/users/{target}/roles");

    let response = put_json_auth(
        &app.router,
        &path,
        &admin,
        json!({ "roles": ["Viewer", "no-such-role"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await, json!({ "roles": [2] }));

    let response = put_json_auth(&app.router, &path, &admin, json!({ "roleIds": [2, 1] })).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = get_auth(&app.router, &path, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut roles: Vec<i64> =
        serde_json::from_value(body_json(response).await["roles"].clone()).unwrap();
    roles.sort_unstable();
    assert_eq!(roles, vec![1, 2]);
}

#[tokio::test]
async fn role_update_needs_exactly_one_form() {
    let app = build_test_app().await;
    let (_, admin) = user_with_roles(&app, "admin@b.com", 7, &[1]).await;
    let (target, _) = user_with_roles(&app, "target@b.com", 7, &[]).await;

    let response = put_json_auth(
        &app.router,
        &format!("/users/{target}/roles"),
        &admin,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn viewer_cannot_write_roles() {
    let app = build_test_app().await;
    let (viewer_id, viewer) = user_with_roles(&app, "viewer@b.com", 7, &[2]).await;

    let response = put_json_auth(
        &app.router,
        &format!("/users/{viewer_id}/roles"),
        &viewer,
        json!({ "roleIds": [1] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "auth_forbidden");
}

#[tokio::test]
async fn membership_is_managed_in_the_callers_organization() {
    let app = build_test_app().await;
    let (_, admin) = user_with_roles(&app, "admin@b.com", 7, &[1]).await;
    signed_in_user(&app, "outsider@b.com", 8).await;
    let outsider = app
        .state
        .identity
        .user_by_email("outsider@b.com")
        .await
        .unwrap();
    let path = format!("/users/{}/organization", outsider.id);

    let added = send(&app.router, Method::POST, &path, Some(&admin), None).await;
    assert_eq!(added.status(), StatusCode::ACCEPTED);
    let outsider = app.state.identity.user_by_id(outsider.id).await.unwrap();
    assert_eq!(outsider.organizations, vec![7, 8]);

    let removed = send(&app.router, Method::DELETE, &path, Some(&admin), None).await;
    assert_eq!(removed.status(), StatusCode::ACCEPTED);

    let again = send(&app.router, Method::DELETE, &path, Some(&admin), None).await;
    assert_eq!(again.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(again).await["message"],
        "no_organizations_removed"
    );
}
