//! Integration tests for the poll HTTP surface.

use std::sync::Arc;

use anipool::config::Config;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<anipool::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("anipool-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    // Keep metadata lookups from stalling tests in offline environments;
    // enrichment degrades gracefully either way.
    config.general.anilist_timeout_seconds = 1;

    let state = anipool::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    let router = anipool::api::router(state.clone()).await;
    (state, router)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn register_user(app: &Router, nickname: &str) -> String {
    let payload = serde_json::json!({
        "oauthProvider": "anilist",
        "oauthId": format!("oauth-{nickname}"),
        "nickname": nickname,
        "avatarUrl": "https://img.example/avatar.png",
    });

    let response = app.clone().oneshot(post_json("/api/user", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

fn future_end_date() -> String {
    (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339()
}

async fn create_poll(
    app: &Router,
    user_id: &str,
    multi_options: bool,
    options: serde_json::Value,
) -> String {
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "Best of the season",
        "endDate": future_end_date(),
        "multiOptions": multi_options,
        "options": options,
    });

    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    body["data"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let (_, app) = spawn_app().await;
    let user_id = register_user(&app, "round-trip").await;

    let end_date = future_end_date();
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "Frieren or Apothecary?",
        "endDate": end_date,
        "multiOptions": false,
        "options": [
            { "anilistId": 154587, "type": "ANIME" },
            { "anilistId": 161645, "type": "ANIME", "text": "the other one" },
        ],
    });

    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let poll_id = json_body(response).await["data"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/pool?id={poll_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let poll = &body["data"];
    assert_eq!(poll["id"], poll_id.as_str());
    assert_eq!(poll["userId"], user_id.as_str());
    assert_eq!(poll["title"], "Frieren or Apothecary?");
    assert_eq!(poll["endDate"], end_date.as_str());
    assert_eq!(poll["multiOptions"], false);
    assert_eq!(poll["creator"]["nickname"], "round-trip");

    // Option identity and order survive the round trip. Metadata enrichment
    // may or may not be present depending on AniList reachability.
    let options = poll["options"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["anilistId"], 154587);
    assert_eq!(options[0]["type"], "ANIME");
    assert_eq!(options[1]["anilistId"], 161645);
    assert_eq!(options[1]["text"], "the other one");
}

#[tokio::test]
async fn test_get_poll_requires_id() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/pool").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_poll_not_found() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pool?id=does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_poll_presence_checks() {
    let (_, app) = spawn_app().await;
    let user_id = register_user(&app, "presence").await;

    // Missing title.
    let payload = serde_json::json!({
        "userId": user_id,
        "endDate": future_end_date(),
        "multiOptions": false,
        "options": [{ "anilistId": 1, "type": "ANIME" }],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing multiOptions is rejected...
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "No flag",
        "endDate": future_end_date(),
        "options": [{ "anilistId": 1, "type": "ANIME" }],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // ...but an explicit false is a present value.
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "Explicit false",
        "endDate": future_end_date(),
        "multiOptions": false,
        "options": [{ "anilistId": 1, "type": "ANIME" }],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_poll_rejects_bad_input() {
    let (_, app) = spawn_app().await;
    let user_id = register_user(&app, "bad-input").await;

    // Empty option list.
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "No options",
        "endDate": future_end_date(),
        "multiOptions": false,
        "options": [],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // End date in the past.
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "Too late",
        "endDate": (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339(),
        "multiOptions": false,
        "options": [{ "anilistId": 1, "type": "ANIME" }],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Duplicate (anilistId, type) pair.
    let payload = serde_json::json!({
        "userId": user_id,
        "title": "Twice the same",
        "endDate": future_end_date(),
        "multiOptions": false,
        "options": [
            { "anilistId": 1, "type": "ANIME" },
            { "anilistId": 1, "type": "ANIME" },
        ],
    });
    let response = app.clone().oneshot(post_json("/api/pool", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_results_ordering_zero_votes_last() {
    let (_, app) = spawn_app().await;
    let creator = register_user(&app, "results-order").await;
    let poll_id = create_poll(
        &app,
        &creator,
        false,
        serde_json::json!([
            { "anilistId": 100, "type": "CHARACTER" },
            { "anilistId": 200, "type": "CHARACTER" },
        ]),
    )
    .await;

    // Two voters pick option B (200); A keeps zero votes.
    for voter in ["voter-one", "voter-two"] {
        let user_id = register_user(&app, voter).await;
        let payload = serde_json::json!({
            "userId": user_id,
            "selections": [{ "anilistId": 200, "type": "CHARACTER" }],
        });
        let response = app
            .clone()
            .oneshot(post_json(&format!("/api/poll/vote/{poll_id}"), &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/pool/results/{poll_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["anilistId"], 200);
    assert_eq!(results[0]["votes"], 2);
    assert_eq!(results[1]["anilistId"], 100);
    assert_eq!(results[1]["votes"], 0);
}

#[tokio::test]
async fn test_results_unknown_poll() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pool/results/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_votes_listing() {
    let (_, app) = spawn_app().await;
    let creator = register_user(&app, "listing-creator").await;
    let voter = register_user(&app, "listing-voter").await;
    let poll_id = create_poll(
        &app,
        &creator,
        true,
        serde_json::json!([
            { "anilistId": 1, "type": "ANIME" },
            { "anilistId": 2, "type": "MANGA" },
        ]),
    )
    .await;

    // No votes yet: empty sequence, not an error.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/poll/{poll_id}/votes?userId={voter}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let payload = serde_json::json!({
        "userId": voter,
        "selections": [
            { "anilistId": 1, "type": "ANIME" },
            { "anilistId": 2, "type": "MANGA" },
        ],
    });
    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/poll/vote/{poll_id}"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/poll/{poll_id}/votes?userId={voter}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let votes = body["data"].as_array().unwrap();
    assert_eq!(votes.len(), 2);
    assert_eq!(votes[0]["pollId"], poll_id.as_str());
    assert_eq!(votes[0]["userId"], voter.as_str());

    // Missing userId query parameter.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/poll/{poll_id}/votes"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/pool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/poll/vote/some-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_user_upsert_refreshes_profile() {
    let (state, app) = spawn_app().await;

    let payload = serde_json::json!({
        "oauthProvider": "anilist",
        "oauthId": "upsert-1",
        "nickname": "first",
        "avatarUrl": "https://img.example/a.png",
    });
    let response = app.clone().oneshot(post_json("/api/user", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first_id = json_body(response).await["data"]["id"].as_str().unwrap().to_string();

    let payload = serde_json::json!({
        "oauthProvider": "anilist",
        "oauthId": "upsert-1",
        "nickname": "renamed",
        "avatarUrl": "https://img.example/b.png",
    });
    let response = app.clone().oneshot(post_json("/api/user", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], first_id.as_str());
    assert_eq!(body["data"]["nickname"], "renamed");

    let stored = state.store().get_user(&first_id).await.unwrap().unwrap();
    assert_eq!(stored.nickname, "renamed");
    assert_eq!(stored.avatar_url, "https://img.example/b.png");
}
