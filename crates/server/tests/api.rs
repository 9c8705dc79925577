use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerState, router};
use token::TokenMaker;

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

/// The router plus a handle on its engine, for reading what no endpoint
/// returns (invitation codes travel to the invitee out of band).
async fn app_with_engine() -> (Router, Arc<Engine>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let tokens = TokenMaker::new(KEY).unwrap();
    let state = ServerState::new(engine, tokens, Duration::minutes(15));
    let engine = state.engine.clone();
    (router(state), engine)
}

async fn app() -> Router {
    app_with_engine().await.0
}

async fn invitation_code(engine: &Engine, group_id: i64, invitee_id: i64) -> String {
    engine
        .queries()
        .get_current_invitation(group_id, invitee_id)
        .await
        .unwrap()
        .code
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn put_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// Register and log in, returning the access token and the user id.
async fn sign_up(app: &Router, email: &str) -> (String, i64) {
    let (status, _) = send(
        app,
        post_json(
            "/users",
            None,
            json!({
                "first_name": "Alice",
                "last_name": "Rossi",
                "email": email,
                "password": "password",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post_json(
            "/users/login",
            None,
            json!({ "email": email, "password": "password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("user").unwrap().get("password_hash").is_none());
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = app().await;

    let (status, body) = send(&app, get("/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("missing"));

    let (status, _) = send(&app, get("/users/me", Some("Basic YWxpY2U6cGFzcw=="))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/users/me", Some("Bearer not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected_with_reason() {
    let app = app().await;
    let tokens = TokenMaker::new(KEY).unwrap();
    let issued = Utc::now() - Duration::hours(1);
    let (token, _) = tokens
        .create_token_at(1, Duration::minutes(15), issued)
        .unwrap();

    let (status, body) = send(&app, get("/users/me", Some(&format!("Bearer {token}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn token_signed_with_another_key_is_rejected() {
    let app = app().await;
    let other = TokenMaker::new(b"ffffffffffffffffffffffffffffffff").unwrap();
    let (token, _) = other.create_token(1, Duration::minutes(15)).unwrap();

    let (status, _) = send(&app, get("/users/me", Some(&format!("Bearer {token}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_the_handler() {
    let app = app().await;
    let (token, user_id) = sign_up(&app, "alice@example.com").await;

    let (status, body) = send(&app, get("/users/me", Some(&format!("bearer {token}")))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(user_id));
    assert_eq!(body["email"].as_str(), Some("alice@example.com"));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;
    sign_up(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        post_json(
            "/users/login",
            None,
            json!({ "email": "alice@example.com", "password": "nope-nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn group_lifecycle_over_http() {
    let (app, engine) = app_with_engine().await;
    let (token, user_id) = sign_up(&app, "alice@example.com").await;
    let bearer = format!("Bearer {token}");

    let (status, categories) = send(&app, get("/group_categories", Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    let category_id = categories[0]["id"].as_i64().unwrap();

    let (status, created) = send(
        &app,
        post_json(
            "/groups",
            Some(&token),
            json!({ "name": "Ski Trip", "category_id": category_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = created["group"]["id"].as_i64().unwrap();
    assert_eq!(created["group"]["created_by_id"].as_i64(), Some(user_id));
    assert_eq!(created["membership"]["user_id"].as_i64(), Some(user_id));

    let (status, invited) = send(
        &app,
        post_json(
            &format!("/groups/{group_id}/members"),
            Some(&token),
            json!({ "first_name": "Carla", "phone": "+39 333 1234567" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invited["invitation"]["status"].as_str(), Some("pending"));
    assert!(invited["invitation"].get("code").is_none());
    let invitee_id = invited["user"]["id"].as_i64().unwrap();

    let (status, current) = send(
        &app,
        get(
            &format!("/groups/{group_id}/invitations/{invitee_id}"),
            Some(&bearer),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["status"].as_str(), Some("pending"));
    assert!(current.get("code").is_none());

    let code = invitation_code(&engine, group_id, invitee_id).await;
    let (status, pending) = send(&app, get(&format!("/invitations/{code}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["group_id"].as_i64(), Some(group_id));

    let (status, renamed) = send(
        &app,
        put_json(
            &format!("/groups/{group_id}"),
            &token,
            json!({ "name": "Dolomites", "category_id": category_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"].as_str(), Some("Dolomites"));

    let (status, expense) = send(
        &app,
        post_json(
            &format!("/groups/{group_id}/expenses"),
            Some(&token),
            json!({ "amount_cents": 4_200, "description": "Fuel" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["paid_by_id"].as_i64(), Some(user_id));

    let (status, members) = send(
        &app,
        get(&format!("/groups/{group_id}/members"), Some(&bearer)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members["members"].as_array().unwrap().len(), 2);

    let (status, deleted) = send(&app, delete(&format!("/groups/{group_id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["memberships_removed"].as_u64(), Some(2));
    assert_eq!(deleted["expenses_removed"].as_u64(), Some(1));

    let (status, _) = send(&app, delete(&format!("/groups/{group_id}"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn strangers_cannot_read_or_invite() {
    let app = app().await;
    let (alice, _) = sign_up(&app, "alice@example.com").await;
    let (bob, _) = sign_up(&app, "bob@example.com").await;

    let (_, created) = send(
        &app,
        post_json(
            "/groups",
            Some(&alice),
            json!({ "name": "Flat", "category_id": 2 }),
        ),
    )
    .await;
    let group_id = created["group"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        get(&format!("/groups/{group_id}"), Some(&format!("Bearer {bob}"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        post_json(
            &format!("/groups/{group_id}/members"),
            Some(&bob),
            json!({ "first_name": "Carla", "phone": "+39 333 1234567" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn accepting_an_invitation_lets_the_invitee_log_in() {
    let (app, engine) = app_with_engine().await;
    let (token, _) = sign_up(&app, "alice@example.com").await;
    let (_, created) = send(
        &app,
        post_json(
            "/groups",
            Some(&token),
            json!({ "name": "Ski Trip", "category_id": 1 }),
        ),
    )
    .await;
    let group_id = created["group"]["id"].as_i64().unwrap();
    let (_, invited) = send(
        &app,
        post_json(
            &format!("/groups/{group_id}/members"),
            Some(&token),
            json!({ "first_name": "Carla", "phone": "+39 333 1234567" }),
        ),
    )
    .await;
    let invitee_id = invited["user"]["id"].as_i64().unwrap();
    let code = invitation_code(&engine, group_id, invitee_id).await;

    let (status, accepted) = send(
        &app,
        post_json(
            "/invitations/accept",
            None,
            json!({
                "code": code,
                "first_name": "Carla",
                "email": "carla@example.com",
                "password": "s3cret-pass",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["invitation"]["status"].as_str(), Some("accepted"));

    let (status, _) = send(
        &app,
        post_json(
            "/users/login",
            None,
            json!({ "email": "carla@example.com", "password": "s3cret-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        post_json(
            "/invitations/accept",
            None,
            json!({
                "code": code,
                "first_name": "Carla",
                "email": "carla@example.com",
                "password": "s3cret-pass",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn members_share_expenses_and_may_leave() {
    let app = app().await;
    let (alice, alice_id) = sign_up(&app, "alice@example.com").await;
    let (bob, _) = sign_up(&app, "bob@example.com").await;
    let (_, created) = send(
        &app,
        post_json(
            "/groups",
            Some(&alice),
            json!({ "name": "Flat", "category_id": 2 }),
        ),
    )
    .await;
    let group_id = created["group"]["id"].as_i64().unwrap();
    let expenses = format!("/groups/{group_id}/expenses");

    let (status, recorded) = send(
        &app,
        post_json(
            &expenses,
            Some(&alice),
            json!({ "amount_cents": 90_000, "description": "Rent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let expense_id = recorded["id"].as_i64().unwrap();
    let expense = format!("{expenses}/{expense_id}");

    let (status, _) = send(&app, get(&expenses, Some(&format!("Bearer {bob}")))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        post_json(&expenses, Some(&alice), json!({ "amount_cents": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, updated) = send(
        &app,
        put_json(
            &expense,
            &alice,
            json!({ "amount_cents": 95_000, "description": "Rent, March" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount_cents"].as_i64(), Some(95_000));

    let (status, listed) = send(&app, get(&expenses, Some(&format!("Bearer {alice}")))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(listed["expenses"][0]["paid_by_id"].as_i64(), Some(alice_id));

    let (status, _) = send(&app, delete(&expense, &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&expense, Some(&format!("Bearer {alice}")))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, invited) = send(
        &app,
        post_json(
            &format!("/groups/{group_id}/members"),
            Some(&alice),
            json!({ "first_name": "Carla", "phone": "+39 333 1234567" }),
        ),
    )
    .await;
    let membership_id = invited["membership"]["id"].as_i64().unwrap();
    let owner_membership_id = created["membership"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        delete(
            &format!("/groups/{group_id}/members/{owner_membership_id}"),
            &alice,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, removed) = send(
        &app,
        delete(&format!("/groups/{group_id}/members/{membership_id}"), &alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["invitations_rejected"].as_u64(), Some(1));

    let (status, _) = send(
        &app,
        put_json(
            &format!("/groups/{group_id}"),
            &bob,
            json!({ "name": "Mine", "category_id": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
