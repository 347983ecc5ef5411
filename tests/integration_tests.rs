// tests/integration_tests.rs
use std::time::Duration;

use actix_web::{App, test, web};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rostrum::api::{AppState, configure_routes};
use rostrum::comparison::compare_script;
use rostrum::config::{AppConfig, GeminiConfig};
use rostrum::database;
use rostrum::errors::CoachError;
use rostrum::feedback::evaluate_content;
use rostrum::gateway::GeminiGateway;
use rostrum::models::{PitchStats, VisionScores};

fn test_config(base: &str, models: &[&str]) -> GeminiConfig {
    GeminiConfig {
        api_base: base.to_string(),
        api_key: "test-key".to_string(),
        models: models.iter().map(|m| m.to_string()).collect(),
        attempts_per_model: 3,
        backoff: vec![
            Duration::from_millis(5),
            Duration::from_millis(10),
            Duration::from_millis(20),
        ],
        request_timeout: Duration::from_secs(5),
    }
}

fn test_gateway(base: &str, models: &[&str]) -> GeminiGateway {
    GeminiGateway::new(reqwest::Client::new(), test_config(base, models))
}

/// A provider success body wrapping `text` the way generateContent does.
fn candidates_body(text: &str) -> Value {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
}

#[tokio::test]
async fn gateway_returns_first_model_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model-a:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body("the answer")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a", "model-b"]);
    let text = gateway.call_model("hello", 64, 0.0).await.unwrap();

    assert_eq!(text, "the answer");
}

#[tokio::test]
async fn gateway_retries_rate_limited_model_then_falls_back() {
    let server = MockServer::start().await;

    // Model A is throttled on every attempt; model B answers immediately
    Mock::given(method("POST"))
        .and(path("/model-a:generateContent"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/model-b:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body("fallback answer")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a", "model-b"]);
    let text = gateway.call_model("hello", 64, 0.0).await.unwrap();

    assert_eq!(text, "fallback answer");
}

#[tokio::test]
async fn gateway_does_not_retry_non_rate_limit_failures() {
    let server = MockServer::start().await;

    // One attempt per model: a 500 advances instead of retrying
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a", "model-b"]);
    let err = gateway.call_model("hello", 64, 0.0).await.unwrap_err();

    match err {
        CoachError::AllModelsExhausted { source } => match *source {
            CoachError::ApiError { status, .. } => assert_eq!(status, 500),
            other => panic!("expected ApiError as last error, got {other}"),
        },
        other => panic!("expected AllModelsExhausted, got {other}"),
    }
}

#[tokio::test]
async fn gateway_treats_missing_candidates_as_model_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model-a:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/model-b:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a", "model-b"]);
    let text = gateway.call_model("hello", 64, 0.0).await.unwrap();

    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn gateway_reports_rate_limiting_when_every_model_is_throttled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(6)
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a", "model-b"]);
    let err = gateway.call_model("hello", 64, 0.0).await.unwrap_err();

    match err {
        CoachError::AllModelsExhausted { source } => {
            assert!(matches!(*source, CoachError::RateLimited(_)))
        }
        other => panic!("expected AllModelsExhausted, got {other}"),
    }
}

#[tokio::test]
async fn short_transcript_short_circuits_without_model_call() {
    let server = MockServer::start().await;
    let gateway = test_gateway(&server.uri(), &["model-a"]);

    let result = evaluate_content(
        &gateway,
        "hi",
        &PitchStats::default(),
        &VisionScores::default(),
    )
    .await;

    assert_eq!(result["clarity_score"], json!(0));
    assert_eq!(result["engagement_score"], json!(0));
    assert_eq!(result["structure_score"], json!(0));
    assert_eq!(
        result["improvements"],
        json!(["Transcript too short to provide meaningful feedback"])
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn short_transcript_comparison_short_circuits_without_model_call() {
    let server = MockServer::start().await;
    let gateway = test_gateway(&server.uri(), &["model-a"]);

    let result = compare_script(&gateway, "Intro. Body. Conclusion.", "um hello").await;

    assert_eq!(result["coverage_percent"], json!(0));
    assert_eq!(result["missing_points"], json!(["Transcript too short to analyze"]));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn comparison_passes_complete_result_through_unchanged() {
    let server = MockServer::start().await;

    let stub = json!({
        "coverage_percent": 100,
        "missing_points": [],
        "partially_covered_points": [],
        "flow_issues": [],
        "insights": "Full coverage."
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body(&stub.to_string())))
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a"]);
    let result = compare_script(
        &gateway,
        "Intro. Body. Conclusion.",
        "Intro. Body. Conclusion.",
    )
    .await;

    assert_eq!(result, stub);
}

#[tokio::test]
async fn feedback_recovers_fenced_output_and_fills_defaults() {
    let server = MockServer::start().await;

    // Partial, fence-wrapped output: recovered, then missing keys defaulted
    let fenced = "```json\n{\"clarity_score\": 85, \"strengths\": [\"confident tone\"]}\n```";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body(fenced)))
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a"]);
    let result = evaluate_content(
        &gateway,
        "today I want to talk about the migration plan",
        &PitchStats::default(),
        &VisionScores::default(),
    )
    .await;

    assert_eq!(result["clarity_score"], json!(85));
    assert_eq!(result["strengths"], json!(["confident tone"]));
    assert_eq!(result["engagement_score"], json!(0));
    assert_eq!(result["improvements"], json!([]));
    assert_eq!(result["overall_feedback"], json!(""));
}

#[tokio::test]
async fn feedback_reports_unparseable_output_as_error_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidates_body("I'm sorry, I can't produce JSON for that.")),
        )
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a"]);
    let result = evaluate_content(
        &gateway,
        "today I want to talk about the migration plan",
        &PitchStats::default(),
        &VisionScores::default(),
    )
    .await;

    assert_eq!(result, json!({"error": "invalid JSON from model"}));
}

#[tokio::test]
async fn comparison_degrades_to_fallback_object_when_models_exhaust() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let gateway = test_gateway(&server.uri(), &["model-a"]);
    let result = compare_script(
        &gateway,
        "Intro. Body. Conclusion.",
        "so first the intro then the body and finally the conclusion",
    )
    .await;

    assert_eq!(result["coverage_percent"], json!(0));
    assert_eq!(result["missing_points"], json!(["Analysis failed due to an error"]));
    // The user-facing message carries the failure detail
    let insights = result["insights"].as_str().unwrap();
    assert!(insights.contains("exhausted"));
}

async fn test_state(server: &MockServer) -> AppState {
    let config = AppConfig {
        gemini: test_config(&server.uri(), &["model-a"]),
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
    };
    let pool = database::init_db("sqlite::memory:").await.unwrap();
    AppState::new(config, pool).unwrap()
}

#[actix_rt::test]
async fn api_health_check_reports_service() {
    let server = MockServer::start().await;
    let state = test_state(&server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("rostrum-api"));
}

#[actix_rt::test]
async fn api_save_edit_finalize_flow() {
    let server = MockServer::start().await;

    // The edit instruction goes through the gateway; the model answers with
    // the full updated script
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidates_body("Updated speech script.")),
        )
        .mount(&server)
        .await;

    let state = test_state(&server).await;
    let pool = state.db_pool.clone();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/script/save")
        .set_json(json!({"user_id": 1, "content": "Original speech script.", "title": "Demo"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let script_id = body["script_id"].as_i64().unwrap();
    assert_eq!(body["content"], json!("Original speech script."));

    let req = test::TestRequest::post()
        .uri("/api/script/edit")
        .set_json(json!({
            "script_id": script_id,
            "user_id": 1,
            "instruction": "Make it shorter"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["content"], json!("Updated speech script."));

    let req = test::TestRequest::post()
        .uri("/api/script/finalize")
        .set_json(json!({"script_id": script_id, "user_id": 1}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], json!("finalized"));

    let script = database::get_script(&pool, script_id, Some(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(script.content, "Updated speech script.");
    assert!(script.is_final);
}

#[actix_rt::test]
async fn api_edit_unknown_script_is_not_found() {
    let server = MockServer::start().await;
    let state = test_state(&server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/script/edit")
        .set_json(json!({"script_id": 42, "instruction": "Make it shorter"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn api_evaluate_session_persists_history() {
    let server = MockServer::start().await;

    // One canned feedback object serves both analysis prompts; the comparison
    // site tolerates extra keys, so the history assertion stays simple
    let canned = json!({
        "clarity_score": 90,
        "engagement_score": 60,
        "structure_score": 30,
        "strengths": ["clear opening"],
        "improvements": [],
        "overall_feedback": "Solid delivery.",
        "content_suggestions": []
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body(&canned.to_string())))
        .mount(&server)
        .await;

    let state = test_state(&server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/session/evaluate")
        .set_json(json!({
            "user_id": 5,
            "transcript": "good morning everyone thanks for joining today",
            "pitch": {"avg": 180.0, "min": 90.0, "max": 240.0},
            "vision": {"eye": 80.0, "posture": 70.0, "gesture": 90.0}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["feedback"]["clarity_score"], json!(90));
    // speech = mean(90, 60, 30) = 60; overall = mean(80, 70, 90, 60) = 75
    assert_eq!(body["scores"]["speech"], json!(60.0));
    assert_eq!(body["scores"]["overall"], json!(75.0));
    // No reference script, so no comparison was run
    assert_eq!(body["comparison"], Value::Null);

    let req = test::TestRequest::get()
        .uri("/api/session/history?user_id=5")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let results = body["results"].as_array().unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["speech_score"], json!(60.0));
    assert_eq!(results[0]["analysis"]["feedback"]["clarity_score"], json!(90));
}
