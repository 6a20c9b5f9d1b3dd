use super::*;
use crate::guidance::tests::MockTransport;
use crate::error::FaithGuidanceError;
use crate::models::{AuthUser, FaithLevel, GenerateContentResponse, UserProfile};
use crate::repository::memory::{InMemoryHistoryRepository, InMemoryProfileRepository};
use crate::repository_traits::{MockProfileRepository, MockSessionVerifier};
use crate::test_support::service_with;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "session-token";

fn sessions() -> MockSessionVerifier {
    let mut sessions = MockSessionVerifier::new();
    sessions.expect_verify().returning(|token| {
        if token == TOKEN {
            Ok(Some(AuthUser {
                uid: "user-1".to_string(),
                email: Some("grace@example.org".to_string()),
                display_name: Some("Grace".to_string()),
            }))
        } else {
            Ok(None)
        }
    });
    sessions
}

fn create_test_app(transport: MockTransport) -> (Router, Arc<InMemoryHistoryRepository>) {
    create_app_with_profiles(transport, Arc::new(InMemoryProfileRepository::default()))
}

fn create_app_with_profiles(
    transport: MockTransport,
    profiles: Arc<dyn ProfileRepository>,
) -> (Router, Arc<InMemoryHistoryRepository>) {
    let repository = Arc::new(InMemoryHistoryRepository::default());
    let service = Arc::new(service_with(transport, repository.clone()));
    let state = AppState::new(
        service,
        repository.clone(),
        profiles,
        Arc::new(sessions()),
        Arc::new(Config::default()),
    );
    (router(state), repository)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guidance_requires_sign_in() {
    let (app, _) = create_test_app(MockTransport::answering("unused"));
    let request = json_request(
        "POST",
        "/api/guidance",
        None,
        json!({"concern": "How can I overcome temptation?"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/signin");
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let (app, _) = create_test_app(MockTransport::answering("unused"));
    let response = app
        .oneshot(get_request("/api/history", Some("stale-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seek_guidance_returns_lines_and_records() {
    let (app, repository) =
        create_test_app(MockTransport::answering("1. First\nJohn 3:16\nplain text"));
    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "How should I pray?", "context": "", "faithLevel": "beginner"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["persisted"], true);
    assert_eq!(body["guidance"], "1. First\nJohn 3:16\nplain text");
    assert_eq!(body["lines"][0]["kind"], "numbered_item");
    assert_eq!(body["lines"][1]["kind"], "verse_reference");
    assert_eq!(body["lines"][2]["kind"], "plain");
    assert!(body.get("notice").is_none());

    let id = body["id"].as_str().unwrap();
    let record = repository.get_guidance(id).await.unwrap().unwrap();
    assert_eq!(record.user_id, "user-1");
    assert_eq!(record.context, None);
    let item = repository.get_history_item("user-1", id).await.unwrap().unwrap();
    assert_eq!(item.query, "How should I pray?");
}

#[tokio::test]
async fn test_validation_errors_are_field_level() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "hi", "faithLevel": "expert"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["concern", "faithLevel"]);
    assert_eq!(body["fields"][0]["code"], "too_short");
}

#[tokio::test]
async fn test_unavailable_guidance_is_bad_gateway() {
    let (app, repository) = create_test_app(MockTransport::new(vec![Ok(
        GenerateContentResponse { candidates: vec![] },
    )]));
    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "Why do we suffer?"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(
        repository
            .list_history("user-1", 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_history_listing_and_favorite_toggle() {
    let (app, repository) = create_test_app(MockTransport::answering("Psalm 46:1"));
    let seek = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "Where do I find strength?"}),
    );
    let body = body_json(app.clone().oneshot(seek).await.unwrap()).await;
    let id = body["id"].as_str().unwrap().to_string();

    let history = body_json(
        app.clone()
            .oneshot(get_request("/api/history?limit=5", Some(TOKEN)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["isFavorite"], false);

    let favorite = json_request(
        "PUT",
        &format!("/api/history/{id}/favorite"),
        Some(TOKEN),
        json!({"isFavorite": true}),
    );
    let response = app.clone().oneshot(favorite).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isFavorite"], true);
    assert!(
        repository
            .get_history_item("user-1", &id)
            .await
            .unwrap()
            .unwrap()
            .is_favorite
    );

    let missing = json_request(
        "PUT",
        "/api/history/does-not-exist/favorite",
        Some(TOKEN),
        json!({"isFavorite": true}),
    );
    let response = app.oneshot(missing).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guidance_record_is_owner_only() {
    let (app, repository) = create_test_app(MockTransport::new(vec![]));
    let record = crate::models::GuidanceRecord {
        id: "someone-elses".to_string(),
        user_id: "user-2".to_string(),
        query: "Q".to_string(),
        response: "R".to_string(),
        context: None,
        faith_level: crate::models::FaithLevel::Intermediate,
        timestamp: chrono::Utc::now(),
    };
    let item = crate::models::SearchHistoryItem {
        id: record.id.clone(),
        query: "Q".to_string(),
        timestamp: record.timestamp,
        is_favorite: false,
        context: None,
        faith_level: record.faith_level,
    };
    repository.save_exchange(&record, &item).await.unwrap();

    let response = app
        .oneshot(get_request("/api/guidance/someone-elses", Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_render_is_public() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let request = json_request(
        "POST",
        "/api/render",
        None,
        json!({"text": "Romans 8:28\nAll things work together"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["lines"][0]["kind"], "verse_reference");
    assert_eq!(body["lines"][0]["weight"], "semibold");
    assert_eq!(body["lines"][1]["kind"], "plain");
}

#[tokio::test]
async fn test_malformed_body_uses_error_shape() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let request = Request::builder()
        .method("POST")
        .uri("/api/guidance")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());

    let request = Request::builder()
        .method("POST")
        .uri("/api/render")
        .body(Body::from(r#"{"text": "x"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_faith_levels_are_listed_with_labels() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let response = app
        .oneshot(get_request("/api/faith-levels", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["value"], "beginner");
    assert_eq!(body[0]["label"], "Beginner - New to Christianity");
    assert_eq!(body[2]["value"], "advanced");
}

#[tokio::test]
async fn test_profile_defaults_then_updates() {
    let (app, _) = create_test_app(MockTransport::new(vec![]));
    let body = body_json(
        app.clone()
            .oneshot(get_request("/api/profile", Some(TOKEN)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["displayName"], "Grace");
    assert_eq!(body["faithLevel"], "beginner");

    let update = json_request(
        "PUT",
        "/api/profile",
        Some(TOKEN),
        json!({"displayName": "Grace H.", "faithLevel": "advanced", "interests": "prayer, hope"}),
    );
    let response = app.clone().oneshot(update).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["interests"], json!(["prayer", "hope"]));

    let body = body_json(
        app.clone()
            .oneshot(get_request("/api/profile", Some(TOKEN)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["faithLevel"], "advanced");

    let invalid = json_request(
        "PUT",
        "/api/profile",
        Some(TOKEN),
        json!({"displayName": "G"}),
    );
    let response = app.oneshot(invalid).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["fields"][0]["field"], "displayName");
}

#[tokio::test]
async fn test_stored_faith_level_is_the_default() {
    let profiles = Arc::new(InMemoryProfileRepository::default());
    profiles
        .save_profile(
            "user-1",
            &UserProfile {
                display_name: "Grace".to_string(),
                faith_level: FaithLevel::Advanced,
                interests: vec![],
                bio: None,
            },
        )
        .await
        .unwrap();
    let profiles_clone = profiles.clone();
    let (app, repository) =
        create_app_with_profiles(MockTransport::answering("Hebrews 11:1"), profiles);

    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "What is faith?"}),
    );
    let body = body_json(app.clone().oneshot(request).await.unwrap()).await;
    let record = repository
        .get_guidance(body["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.faith_level, FaithLevel::Advanced);

    // An explicit choice still wins over the stored preference.
    let (app, repository) =
        create_app_with_profiles(MockTransport::answering("Hebrews 11:1"), profiles_clone);
    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "What is faith?", "faithLevel": "beginner"}),
    );
    let body = body_json(app.oneshot(request).await.unwrap()).await;
    let record = repository
        .get_guidance(body["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.faith_level, FaithLevel::Beginner);
}

#[tokio::test]
async fn test_profile_lookup_failure_falls_back_to_intermediate() {
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_get_profile()
        .times(1)
        .returning(|_| Err(FaithGuidanceError::Internal("store down".to_string())));
    let (app, repository) =
        create_app_with_profiles(MockTransport::answering("Psalm 23:1"), Arc::new(profiles));

    let request = json_request(
        "POST",
        "/api/guidance",
        Some(TOKEN),
        json!({"concern": "Am I alone?"}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let record = repository
        .get_guidance(body["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.faith_level, FaithLevel::Intermediate);
}
