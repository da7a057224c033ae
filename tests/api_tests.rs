//! End-to-end tests driving the router the way a client would:
//! register, obtain a token, and exercise the destination/tag/feature
//! surface over HTTP.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wayfarer::config::Config;

/// Valid 1x1 PNG used by the upload tests.
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc,
    0xcf, 0xc0, 0x50, 0x0f, 0x00, 0x04, 0x85, 0x01, 0x80, 0x84, 0xa9, 0x8c, 0x21, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

async fn spawn_app() -> Router {
    let scratch = std::env::temp_dir().join(format!("wayfarer-test-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", scratch.join("test.db").display());
    config.general.uploads_path = scratch.join("media").to_string_lossy().to_string();

    let state = wayfarer::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    wayfarer::api::router(state).await
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = if let Some(body) = body {
        builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

/// Register an account and exchange its credentials for a token.
async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = request(
        app,
        "POST",
        "/api/user",
        None,
        Some(json!({"email": email, "password": "testpass", "name": "Test Name"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": email, "password": "testpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_destination(app: &Router, token: &str, payload: Value) -> Value {
    let (status, body) = request(app, "POST", "/api/destinations", Some(token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"].clone()
}

fn destination_payload() -> Value {
    json!({
        "name": "Test Destination",
        "description": "Test description",
        "country": "Test country",
        "city": "Test city",
        "rating": 4.5,
    })
}

// ============================================================================
// Users & auth
// ============================================================================

#[tokio::test]
async fn test_health_check_is_public() {
    let app = spawn_app().await;

    let (status, body) = request(&app, "GET", "/api/health-check", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_success_does_not_echo_password() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({"email": "test@example.com", "password": "testpass", "name": "Test Name"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "test@example.com");
    assert_eq!(body["data"]["name"], "Test Name");
    assert!(!body["data"].as_object().unwrap().contains_key("password"));
}

#[tokio::test]
async fn test_register_duplicate_email_fails() {
    let app = spawn_app().await;
    register_and_login(&app, "test@example.com").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({"email": "test@example.com", "password": "testpass", "name": "Other"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_short_password_creates_no_account() {
    let app = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({"email": "test@example.com", "password": "pwd", "name": "Test Name"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No row was created, so logging in must fail too.
    let (status, body) = request(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "test@example.com", "password": "pwd"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_token_is_stable_across_logins() {
    let app = spawn_app().await;
    let first = register_and_login(&app, "test@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "test@example.com", "password": "testpass"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], Value::String(first));
}

#[tokio::test]
async fn test_token_wrong_password_yields_no_token() {
    let app = spawn_app().await;
    register_and_login(&app, "test@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "test@example.com", "password": "wrongpass"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("data").is_none() || body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_email_domain_is_case_normalized() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/user",
        None,
        Some(json!({"email": "Jane@EXAMPLE.COM", "password": "testpass", "name": "Jane"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "Jane@example.com");

    // Login with the already-lowercased domain reaches the same account.
    let (status, _) = request(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "Jane@example.com", "password": "testpass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_requires_authentication() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/api/user/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/user/me", Some("bogus-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_get_and_patch() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let (status, body) = request(&app, "GET", "/api/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "test@example.com");
    assert_eq!(body["data"]["name"], "Test Name");

    let (status, body) = request(
        &app,
        "PATCH",
        "/api/user/me",
        Some(&token),
        Some(json!({"name": "New Name", "password": "newpassword123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "New Name");

    // The new password is live immediately.
    let (status, _) = request(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": "test@example.com", "password": "newpassword123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_post_is_not_allowed() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let (status, _) = request(&app, "POST", "/api/user/me", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Destinations
// ============================================================================

#[tokio::test]
async fn test_destinations_require_authentication() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/api/destinations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_shallow_and_detail_is_full() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let created = create_destination(&app, &token, destination_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/destinations/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Test description");

    let (status, body) = request(&app, "GET", "/api/destinations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"][0].as_object().unwrap();
    assert_eq!(listed["name"], "Test Destination");
    assert!(!listed.contains_key("description"));
}

#[tokio::test]
async fn test_list_is_ordered_newest_first() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let first = create_destination(&app, &token, destination_payload()).await;
    let second = create_destination(&app, &token, destination_payload()).await;

    let (_, body) = request(&app, "GET", "/api/destinations", Some(&token), None).await;
    assert_eq!(body["data"][0]["id"], second["id"]);
    assert_eq!(body["data"][1]["id"], first["id"]);
}

#[tokio::test]
async fn test_create_with_repeated_tag_name_attaches_once() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}, {"name": "Beach"}]);
    let created = create_destination(&app, &token, payload).await;

    assert_eq!(created["tags"].as_array().unwrap().len(), 1);
    assert_eq!(created["tags"][0]["name"], "Beach");

    // Exactly one Tag row exists for the user.
    let (_, body) = request(&app, "GET", "/api/tags", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_reuses_existing_tag_row() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}]);
    let first = create_destination(&app, &token, payload.clone()).await;
    let second = create_destination(&app, &token, payload).await;

    assert_eq!(first["tags"][0]["id"], second["tags"][0]["id"]);

    // A different user's same-named tag is a distinct row.
    let other_token = register_and_login(&app, "other@example.com").await;
    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}]);
    let theirs = create_destination(&app, &other_token, payload).await;
    assert_ne!(theirs["tags"][0]["id"], first["tags"][0]["id"]);
}

#[tokio::test]
async fn test_tags_serialize_in_attachment_order() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Zen"}, {"name": "Air"}, {"name": "Mountain"}]);
    let created = create_destination(&app, &token, payload).await;

    let names: Vec<&str> = created["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Zen", "Air", "Mountain"]);
}

#[tokio::test]
async fn test_update_with_empty_tags_clears_and_absent_tags_keeps() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}, {"name": "Sunny"}]);
    let created = create_destination(&app, &token, payload).await;
    let id = created["id"].as_i64().unwrap();

    // Omitting the tags key leaves the relation set alone.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);

    // An empty list is authoritative and clears everything.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(json!({"tags": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_replaces_relation_set() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["features"] = json!([{"name": "Pool"}]);
    let created = create_destination(&app, &token, payload).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(json!({"features": [{"name": "Spa"}, {"name": "Gym"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Spa", "Gym"]);
}

#[tokio::test]
async fn test_put_requires_all_scalars_patch_does_not() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let created = create_destination(&app, &token, destination_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let partial = json!({"name": "Only A Name"});

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(partial.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(partial),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Only A Name");
    // Untouched scalar survives the partial update.
    assert_eq!(body["data"]["country"], "Test country");
}

#[tokio::test]
async fn test_rating_precision_is_validated() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["rating"] = json!(4.55);
    let (status, _) = request(&app, "POST", "/api/destinations", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = destination_payload();
    payload["rating"] = json!(10.0);
    let (status, _) = request(&app, "POST", "/api/destinations", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_destination() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let created = create_destination(&app, &token, destination_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/destinations/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/destinations/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Filtering
// ============================================================================

#[tokio::test]
async fn test_filter_by_tag_ids_is_any_of_and_deduplicated() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}, {"name": "Sunny"}]);
    let both = create_destination(&app, &token, payload).await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Sunny"}]);
    let sunny_only = create_destination(&app, &token, payload).await;

    // One destination with neither tag.
    create_destination(&app, &token, destination_payload()).await;

    let beach_id = both["tags"][0]["id"].as_i64().unwrap();
    let sunny_id = both["tags"][1]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/destinations?tags={beach_id},{sunny_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Union of matches, and the destination carrying both tags appears once.
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&both["id"].as_i64().unwrap()));
    assert!(ids.contains(&sunny_only["id"].as_i64().unwrap()));
}

#[tokio::test]
async fn test_filter_by_tags_and_features_intersects() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}]);
    payload["features"] = json!([{"name": "Pool"}]);
    let match_both = create_destination(&app, &token, payload).await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}]);
    create_destination(&app, &token, payload).await;

    let tag_id = match_both["tags"][0]["id"].as_i64().unwrap();
    let feature_id = match_both["features"][0]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/destinations?tags={tag_id}&features={feature_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], match_both["id"]);
}

#[tokio::test]
async fn test_malformed_id_filter_is_client_error() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let (status, _) = request(
        &app,
        "GET",
        "/api/destinations?tags=1,abc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Tags & features
// ============================================================================

#[tokio::test]
async fn test_tags_listed_name_descending() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Alpha"}, {"name": "Beta"}]);
    create_destination(&app, &token, payload).await;

    let (status, body) = request(&app, "GET", "/api/tags", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Beta");
    assert_eq!(body["data"][1]["name"], "Alpha");
}

#[tokio::test]
async fn test_attached_filter_hides_orphaned_tags_and_deduplicates() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    // "Shared" ends up on two destinations, "Orphan" on none after the clear.
    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Shared"}, {"name": "Orphan"}]);
    let first = create_destination(&app, &token, payload).await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Shared"}]);
    create_destination(&app, &token, payload).await;

    let id = first["id"].as_i64().unwrap();
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(json!({"tags": [{"name": "Shared"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(
        &app,
        "GET",
        "/api/tags?is_tag_destination=1",
        Some(&token),
        None,
    )
    .await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    // Attached to two destinations but listed once; the orphan is gone.
    assert_eq!(names, vec!["Shared"]);

    // Without the filter the orphaned row is still there.
    let (_, body) = request(&app, "GET", "/api/tags", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_attached_filter_rejects_garbage() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let (status, _) = request(
        &app,
        "GET",
        "/api/tags?is_tag_destination=maybe",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_and_delete_tag() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}, {"name": "Sunny"}]);
    let created = create_destination(&app, &token, payload).await;
    let beach_id = created["tags"][0]["id"].as_i64().unwrap();
    let sunny_id = created["tags"][1]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/tags/{beach_id}"),
        Some(&token),
        Some(json!({"name": "Seaside"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Seaside");

    // Renaming onto an existing name collides.
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/tags/{beach_id}"),
        Some(&token),
        Some(json!({"name": "Sunny"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/tags/{sunny_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = request(&app, "GET", "/api/tags", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_features_have_their_own_attached_filter() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let mut payload = destination_payload();
    payload["features"] = json!([{"name": "Pool"}]);
    let created = create_destination(&app, &token, payload).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/destinations/{id}"),
        Some(&token),
        Some(json!({"features": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(
        &app,
        "GET",
        "/api/features?is_feature_destination=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = request(&app, "GET", "/api/features", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Ownership isolation
// ============================================================================

#[tokio::test]
async fn test_other_users_rows_are_invisible() {
    let app = spawn_app().await;
    let token_a = register_and_login(&app, "a@example.com").await;
    let token_b = register_and_login(&app, "b@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Theirs"}]);
    let theirs = create_destination(&app, &token_b, payload).await;
    let their_id = theirs["id"].as_i64().unwrap();
    let their_tag = theirs["tags"][0]["id"].as_i64().unwrap();

    let (_, body) = request(&app, "GET", "/api/destinations", Some(&token_a), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = request(&app, "GET", "/api/tags", Some(&token_a), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Another user's resource is indistinguishable from a missing one.
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/destinations/{their_id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/tags/{their_tag}"),
        Some(&token_a),
        Some(json!({"name": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/destinations/{their_id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Image upload
// ============================================================================

fn multipart_request(
    uri: &str,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "wayfarer-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header(
            "Content-Type",
            format!("{}; boundary={boundary}", mime::MULTIPART_FORM_DATA),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_stores_file_reference() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let created = create_destination(&app, &token, destination_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/destinations/{id}/upload-image"),
            &token,
            "photo.png",
            "image/png",
            TINY_PNG,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    let image = body["data"]["image"].as_str().unwrap();
    assert!(image.starts_with("/media/"));
    assert!(image.ends_with(".png"));
}

#[tokio::test]
async fn test_upload_non_image_is_rejected_and_field_unchanged() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "test@example.com").await;

    let created = create_destination(&app, &token, destination_payload()).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/destinations/{id}/upload-image"),
            &token,
            "notes.txt",
            "text/plain",
            b"definitely not an image",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/destinations/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["image"], Value::Null);
}

#[tokio::test]
async fn test_upload_to_another_users_destination_is_404() {
    let app = spawn_app().await;
    let token_a = register_and_login(&app, "a@example.com").await;
    let token_b = register_and_login(&app, "b@example.com").await;

    let theirs = create_destination(&app, &token_b, destination_payload()).await;
    let their_id = theirs["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/destinations/{their_id}/upload-image"),
            &token_a,
            "photo.png",
            "image/png",
            TINY_PNG,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_full_flow_register_create_and_read_back() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "traveler@example.com").await;

    let mut payload = destination_payload();
    payload["tags"] = json!([{"name": "Beach"}, {"name": "Sunny"}]);
    payload["features"] = json!([{"name": "Pool"}]);
    let created = create_destination(&app, &token, payload).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/destinations/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Test description");
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["features"].as_array().unwrap().len(), 1);

    let (status, body) = request(&app, "GET", "/api/destinations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"][0].as_object().unwrap();
    assert!(!listed.contains_key("description"));
    assert_eq!(listed["tags"].as_array().unwrap().len(), 2);
}
