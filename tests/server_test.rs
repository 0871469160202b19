#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use character_sync::providers::{RickAndMortyProvider, StarWarsProvider};
use character_sync::server::{create_router, FAILED_PROVIDERS_HEADER};
use character_sync::{Character, CharacterProvider, CharacterService, FileSnapshotStore};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

async fn rick_and_morty_server() -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/character").query_param("page", "1");
            then.status(200).json_body(json!({
                "info": {"next": null},
                "results": [
                    {"name": "Summer Smith", "species": "Human", "status": "Alive"},
                    {"name": "Beth Smith", "species": "Human", "status": "Alive"},
                    {"name": "Mr. Meeseeks", "species": "Humanoid", "status": "unknown"}
                ]
            }));
        })
        .await;
    server
}

fn router(providers: Vec<Arc<dyn CharacterProvider>>, snapshot_dir: &Path) -> axum::Router {
    let service = CharacterService::new(providers, FileSnapshotStore::new(snapshot_dir));
    create_router(Arc::new(service), Duration::from_secs(10))
}

fn rick_provider(server: &MockServer) -> Arc<dyn CharacterProvider> {
    Arc::new(RickAndMortyProvider::with_base_url(
        reqwest::Client::new(),
        server.base_url(),
    ))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

#[tokio::test]
async fn test_characters_returns_sorted_json() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = rick_and_morty_server().await;
    let app = router(vec![rick_provider(&upstream)], temp_dir.path());

    let (status, headers, body) = get(app, "/characters").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(FAILED_PROVIDERS_HEADER).is_none());
    let characters: Vec<Character> = serde_json::from_slice(&body).unwrap();
    let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Beth Smith", "Mr. Meeseeks", "Summer Smith"]);

    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw[0]["additional_attribute"], "Alive");
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_characters_applies_limit_per_provider() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = rick_and_morty_server().await;
    let app = router(vec![rick_provider(&upstream)], temp_dir.path());

    let (status, _, body) = get(app, "/characters?limitPerProvider=2").await;

    assert_eq!(status, StatusCode::OK);
    let characters: Vec<Character> = serde_json::from_slice(&body).unwrap();
    assert_eq!(characters.len(), 2);
}

#[tokio::test]
async fn test_characters_rejects_invalid_limit() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = rick_and_morty_server().await;

    for uri in [
        "/characters?limitPerProvider=abc",
        "/characters?limitPerProvider=0",
        "/characters?limitPerProvider=-1",
        "/characters?limitPerProvider=%2010",
    ] {
        let app = router(vec![rick_provider(&upstream)], temp_dir.path());
        let (status, _, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(String::from_utf8(body).unwrap(), "invalid limit parameter");
    }

    // 參數錯誤時不應觸發聚合與寫檔
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_characters_reports_failed_providers() {
    let temp_dir = TempDir::new().unwrap();
    let upstream = rick_and_morty_server().await;
    let broken = MockServer::start_async().await;
    broken
        .mock_async(|when, then| {
            when.method(GET).path("/people/");
            then.status(500);
        })
        .await;

    let providers: Vec<Arc<dyn CharacterProvider>> = vec![
        Arc::new(StarWarsProvider::with_base_url(
            reqwest::Client::new(),
            broken.base_url(),
        )),
        rick_provider(&upstream),
    ];
    let app = router(providers, temp_dir.path());

    let (status, headers, body) = get(app, "/characters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(FAILED_PROVIDERS_HEADER).unwrap(), "starwars");
    let characters: Vec<Character> = serde_json::from_slice(&body).unwrap();
    assert_eq!(characters.len(), 3);
}

#[tokio::test]
async fn test_characters_persistence_failure_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("occupied");
    std::fs::write(&blocker, b"file, not dir").unwrap();
    let upstream = rick_and_morty_server().await;
    let app = router(vec![rick_provider(&upstream)], &blocker);

    let (status, _, body) = get(app, "/characters").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().starts_with("sync error: "));
}

#[tokio::test]
async fn test_health_and_method_not_allowed() {
    let temp_dir = TempDir::new().unwrap();
    let app = router(vec![], temp_dir.path());

    let (status, _, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/characters")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
