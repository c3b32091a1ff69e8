//! Failure injection tests for outbound calls.

use axum::body::Bytes;
use axum::http::StatusCode;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::{MockRequest, MockResponse};
use voice_gateway::clients::openai::OpenAiPolicies;
use voice_gateway::clients::{ChatOptions, ClientError, OpenAiClient, Point, QdrantClient};
use voice_gateway::resilience::RetryError;

mod common;

fn counting_backend_script(
    calls: Arc<AtomicU32>,
    script: Vec<MockResponse>,
) -> impl Fn(MockRequest) -> std::future::Ready<MockResponse> + Send + Sync + 'static {
    move |_req| {
        let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
        let response = script
            .get(n)
            .or_else(|| script.last())
            .cloned()
            .unwrap_or_else(|| MockResponse::new(500, "script empty"));
        std::future::ready(response)
    }
}

#[tokio::test]
async fn test_tts_retries_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let openai = common::start_programmable_backend(counting_backend_script(
        calls.clone(),
        vec![
            MockResponse::new(503, "overloaded"),
            MockResponse::new(502, "bad gateway"),
            MockResponse::new(200, "ID3-audio-bytes").with_header("Content-Type", "audio/mpeg"),
        ],
    ))
    .await;
    let closed = common::closed_port().await;
    let (addr, shutdown) = common::spawn_gateway(common::test_config(openai, closed, closed)).await;

    let res = common::http_client()
        .post(format!("http://{}/tts/stream", addr))
        .json(&serde_json::json!({ "text": "Dobrý deň", "voice": "nova" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK, "Should eventually succeed after retries");
    assert_eq!(res.headers()["content-type"], "audio/mpeg");
    assert_eq!(res.bytes().await.unwrap(), Bytes::from_static(b"ID3-audio-bytes"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_tts_fatal_rejection_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let openai = common::start_programmable_backend(counting_backend_script(
        calls.clone(),
        vec![MockResponse::json(
            401,
            serde_json::json!({ "error": { "message": "Incorrect API key" } }),
        )],
    ))
    .await;
    let closed = common::closed_port().await;
    let (addr, shutdown) = common::spawn_gateway(common::test_config(openai, closed, closed)).await;

    let res = common::http_client()
        .post(format!("http://{}/tts/stream", addr))
        .json(&serde_json::json!({ "text": "Ahoj" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_tts_exhaustion_returns_unavailable() {
    let calls = Arc::new(AtomicU32::new(0));
    let openai = common::start_programmable_backend(counting_backend_script(
        calls.clone(),
        vec![MockResponse::new(500, "boom")],
    ))
    .await;
    let closed = common::closed_port().await;
    let (addr, shutdown) = common::spawn_gateway(common::test_config(openai, closed, closed)).await;

    let res = common::http_client()
        .post(format!("http://{}/tts/stream", addr))
        .json(&serde_json::json!({ "text": "Ahoj" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("openai_tts"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_honors_retry_after() {
    let calls = Arc::new(AtomicU32::new(0));
    let openai = common::start_programmable_backend(counting_backend_script(
        calls.clone(),
        vec![
            MockResponse::new(429, "slow down").with_header("Retry-After", "1"),
            MockResponse::json(
                200,
                serde_json::json!({ "choices": [{ "message": { "content": "Dobrý deň!" } }] }),
            ),
        ],
    ))
    .await;
    let closed = common::closed_port().await;
    let config = common::test_config(openai, closed, closed);
    let client = OpenAiClient::new(
        reqwest::Client::new(),
        config.openai.clone(),
        OpenAiPolicies::from_config(&config.retries).unwrap(),
    );

    let start = Instant::now();
    let reply = client
        .chat_completion("Pozdrav ma", &ChatOptions::default())
        .await
        .unwrap();

    assert_eq!(reply, "Dobrý deň!");
    assert!(start.elapsed() >= Duration::from_secs(1), "Retry-After was ignored");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connection_refused_exhausts_attempts() {
    let closed = common::closed_port().await;
    let config = common::test_config(closed, closed, closed);
    let client = OpenAiClient::new(
        reqwest::Client::new(),
        config.openai.clone(),
        OpenAiPolicies::from_config(&config.retries).unwrap(),
    );

    let err = client
        .chat_completion("Ahoj", &ChatOptions::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Retry(RetryError::Exhausted { service, attempts, .. }) => {
            assert_eq!(service, "openai_chat");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transcription_falls_back_without_language() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let openai = common::start_programmable_backend(move |req: MockRequest| {
        let recorded = recorded.clone();
        async move {
            let body = req.body_text();
            let has_language = body.contains("name=\"language\"");
            recorded.lock().unwrap().push(body);
            if has_language {
                MockResponse::json(400, serde_json::json!({ "error": { "message": "bad language" } }))
            } else {
                MockResponse::json(
                    200,
                    serde_json::json!({
                        "text": "  dobrý\u{00a0}deň  ",
                        "language": "slovak",
                        "duration": 1.5,
                        "segments": [{ "avg_logprob": -0.2 }, { "avg_logprob": -0.4 }]
                    }),
                )
            }
        }
    })
    .await;
    let closed = common::closed_port().await;
    let config = common::test_config(openai, closed, closed);
    let client = OpenAiClient::new(
        reqwest::Client::new(),
        config.openai.clone(),
        OpenAiPolicies::from_config(&config.retries).unwrap(),
    );

    let transcription = client
        .transcribe(Bytes::from_static(b"RIFF....WAVE"), "call.wav", "sk")
        .await
        .unwrap();

    assert_eq!(transcription.text, "dobrý deň");
    assert_eq!(transcription.language, "slovak");
    assert_eq!(transcription.duration, Some(1.5));
    let confidence = transcription.confidence.unwrap();
    assert!((confidence + 0.3).abs() < 1e-9);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].contains("name=\"language\""));
    assert!(!seen[1].contains("name=\"language\""));
}

#[tokio::test]
async fn test_qdrant_creates_collection_upserts_and_searches() {
    let requests: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let search_calls = Arc::new(AtomicU32::new(0));
    let recorded = requests.clone();
    let searches = search_calls.clone();
    let qdrant = common::start_programmable_backend(move |req: MockRequest| {
        let recorded = recorded.clone();
        let searches = searches.clone();
        async move {
            recorded.lock().unwrap().push((req.method.clone(), req.path.clone()));
            match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/collections/menu") => MockResponse::new(404, "Not found"),
                ("PUT", "/collections/menu") => {
                    MockResponse::json(200, serde_json::json!({ "result": true }))
                }
                ("PUT", "/collections/menu/points") => {
                    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                    assert_eq!(body["points"][0]["payload"]["name"], "Halušky");
                    MockResponse::json(200, serde_json::json!({ "result": { "status": "completed" } }))
                }
                ("POST", "/collections/menu/points/search") => {
                    if searches.fetch_add(1, Ordering::SeqCst) == 0 {
                        MockResponse::new(502, "upstream")
                    } else {
                        MockResponse::json(
                            200,
                            serde_json::json!({
                                "result": [{ "id": 3, "score": 0.87, "payload": { "name": "Halušky" } }]
                            }),
                        )
                    }
                }
                _ => MockResponse::new(400, "unexpected"),
            }
        }
    })
    .await;
    let closed = common::closed_port().await;
    let config = common::test_config(closed, qdrant, closed);
    let client = QdrantClient::new(
        reqwest::Client::new(),
        config.qdrant.clone(),
        config.retries.qdrant.policy().unwrap(),
    );

    client.ensure_collection("menu", 4, "Cosine").await.unwrap();
    client
        .upsert_points(
            "menu",
            &[Point {
                id: serde_json::json!(3),
                vector: vec![0.1, 0.2, 0.3, 0.4],
                payload: serde_json::json!({ "name": "Halušky" }),
            }],
        )
        .await
        .unwrap();
    let hits = client.search("menu", &[0.1, 0.2, 0.3, 0.4], 5, Some(0.5)).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, serde_json::json!(3));
    assert_eq!(hits[0].payload.as_ref().unwrap()["name"], "Halušky");
    assert_eq!(search_calls.load(Ordering::SeqCst), 2);

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0], ("GET".to_string(), "/collections/menu".to_string()));
    assert_eq!(requests[1], ("PUT".to_string(), "/collections/menu".to_string()));
    assert_eq!(requests[2], ("PUT".to_string(), "/collections/menu/points".to_string()));
}
