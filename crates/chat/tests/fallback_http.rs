#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end: a chat session over the HTTP transport against a local mock
//! of two OpenAI-compatible providers.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    axum::{Json, Router, http::StatusCode, routing::post},
    jarvis_agents::{AiRouter, OpenAiCompatTransport},
    jarvis_chat::ChatSession,
    jarvis_config::{Capabilities, JarvisConfig, KeyStore, ModelTable, ModelsConfig, ProviderSpec},
    serde_json::{Value, json},
};

struct Hits {
    down: AtomicUsize,
    up: AtomicUsize,
}

/// `/down/v1` always answers 503; `/up/v1` echoes the requested model.
async fn start_mock() -> (String, Arc<Hits>) {
    let hits = Arc::new(Hits {
        down: AtomicUsize::new(0),
        up: AtomicUsize::new(0),
    });
    let (down_hits, up_hits) = (hits.clone(), hits.clone());

    let app = Router::new()
        .route(
            "/down/v1/chat/completions",
            post(move || {
                let hits = down_hits.clone();
                async move {
                    hits.down.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
                }
            }),
        )
        .route(
            "/up/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let hits = up_hits.clone();
                async move {
                    hits.up.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "choices": [{
                            "message": {
                                "role": "assistant",
                                "content": format!("hi from {}", body["model"].as_str().unwrap_or("?")),
                            }
                        }]
                    }))
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

fn provider(base_url: String, fast: &str) -> ProviderSpec {
    ProviderSpec {
        base_url,
        models: ModelTable {
            all: vec![],
            modes: BTreeMap::from([
                ("fast".to_string(), fast.to_string()),
                ("pro".to_string(), format!("{fast}-pro")),
            ]),
        },
        api_key_env: vec![],
    }
}

async fn session() -> (ChatSession, Arc<Hits>) {
    let (base, hits) = start_mock().await;
    let models = ModelsConfig {
        providers: BTreeMap::from([
            ("down".to_string(), provider(format!("{base}/down/v1"), "down-fast")),
            ("up".to_string(), provider(format!("{base}/up/v1"), "up-fast")),
        ]),
        default_provider: Some("down".into()),
        fallback_order: vec!["down".into(), "up".into()],
    };
    let keys = KeyStore::from_pairs([("down", "k1"), ("up", "k2")]);
    let transport = OpenAiCompatTransport::new(Duration::from_secs(5)).unwrap();
    let router = AiRouter::new(models, keys, Arc::new(transport));
    let caps = Capabilities {
        long_term_memory: true,
        models_file: true,
        any_provider_key: true,
    };
    (ChatSession::new(router, &JarvisConfig::default(), caps), hits)
}

#[tokio::test]
async fn falls_back_past_a_failing_provider() {
    let (mut s, hits) = session().await;
    s.process("/fast").await;

    let reply = s.process("hello there").await;

    assert_eq!(reply, "hi from up-fast");
    assert_eq!(hits.down.load(Ordering::SeqCst), 1);
    assert_eq!(hits.up.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forced_failing_provider_reports_its_error() {
    let (mut s, hits) = session().await;
    s.process("/provider down").await;

    let reply = s.process("hello there").await;

    assert!(reply.contains("Provider 'down' failed"), "{reply}");
    assert!(reply.contains("503"), "{reply}");
    assert_eq!(hits.up.load(Ordering::SeqCst), 0);

    s.process("/auto").await;
    assert_eq!(s.process("hello again").await, "hi from up-fast-pro");
}
