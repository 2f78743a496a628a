use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use flowweek::error::GenerationErrorCode;
use flowweek::services::cache_service::{CacheService, MemoryStore};
use flowweek::services::generation_service::testing::service_with_endpoint;

const INPUT: &str = "gym monday and wednesday mornings, work nine to five on weekdays";

fn memory_cache() -> CacheService {
    CacheService::new(Arc::new(MemoryStore::new()))
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

fn schedule_content() -> String {
    json!({
        "activities": [{
            "id": "gym-1",
            "name": "Morning Gym",
            "category": "Gym",
            "days": ["Monday", "Wednesday"],
            "startTime": "07:00",
            "endTime": "08:00",
            "color": "#dbeafe"
        }],
        "weeklyGoals": [{
            "name": "Gym time",
            "targetMinutes": 120,
            "category": "Gym"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn generates_and_validates_a_schedule() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body(&schedule_content()));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    let schedule = service.generate(INPUT).await.unwrap();

    mock.assert_async().await;
    assert_eq!(schedule.activities.len(), 1);
    assert_eq!(schedule.activities[0].category, "gym");
    assert_eq!(schedule.activities[0].days, vec!["Monday", "Wednesday"]);
    assert_eq!(schedule.weekly_goals[0].target_minutes, 120);
}

#[tokio::test]
async fn tolerates_markdown_fenced_responses() {
    let server = MockServer::start_async().await;
    let fenced = format!("Here you go:\n```json\n{}\n```", schedule_content());
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body(&fenced));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    let schedule = service.generate(INPUT).await.unwrap();
    assert_eq!(schedule.activities.len(), 1);
}

#[tokio::test]
async fn non_json_content_is_an_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(completion_body("I cannot produce a schedule for that."));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    let error = service.generate(INPUT).await.unwrap_err();
    assert_eq!(
        error.generation_code(),
        Some(GenerationErrorCode::InvalidResponse)
    );
    assert!(error.correlation_id().is_some());
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).json_body(json!({ "error": "slow down" }));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    let error = service.generate(INPUT).await.unwrap_err();
    assert_eq!(
        error.generation_code(),
        Some(GenerationErrorCode::RateLimited)
    );
}

#[tokio::test]
async fn repeated_input_is_served_from_cache() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body(&schedule_content()));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    let first = service.generate(INPUT).await.unwrap();
    // Casing and surrounding whitespace do not bust the cache.
    let second = service
        .generate(&format!("  {}  ", INPUT.to_uppercase()))
        .await
        .unwrap();

    mock.assert_hits_async(1).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn validation_failures_are_not_cached() {
    let server = MockServer::start_async().await;
    let invalid = json!({
        "activities": [{
            "name": "Ghost",
            "category": "general",
            "days": [],
            "startTime": "07:00",
            "endTime": "08:00"
        }]
    })
    .to_string();
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body(&invalid));
        })
        .await;

    let service = service_with_endpoint(&server.base_url(), memory_cache()).unwrap();
    assert!(service.generate(INPUT).await.is_err());
    assert!(service.generate(INPUT).await.is_err());

    // Both attempts went to the network; nothing malformed was cached.
    mock.assert_hits_async(2).await;
}
