use prunegate::{
    config::AppConfig,
    pipeline::{create_pipeline_channel, executor::PipelineExecutor},
    prune::FieldValue,
    server::routes::create_router,
};
use axum::http::{Request, StatusCode};
use axum::body::Body;
use serde_json::json;
use tower::ServiceExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn generate_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn config() -> AppConfig {
    serde_json::from_value(json!({
        "integrations": [{
            "source": {
                "type": "webhook",
                "webhookPath": "/borat",
                "authentication": {"secret": "integration_test_secret"}
            },
            "pipelines": [{
                "processors": [{
                    "type": "prune",
                    "blacklist_names": ["^lastname$", "%\\{[^}]+\\}"],
                    "whitelist_values": {
                        "status": "^(1|2|3)",
                        "error": "%{blah}"
                    },
                    "interpolate": true
                }],
                "sinks": [{"type": "log"}]
            }]
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_end_to_end_prune_webhook() {
    let config = config();
    let (pipeline_tx, mut pipeline_rx) = create_pipeline_channel(100);

    let app = create_router(config.clone(), pipeline_tx).unwrap();
    let executor = PipelineExecutor::new(&config).await.unwrap();

    let body = r#"{"firstname":"Borat","lastname":"Sagdiyev","%{hmm}":"doh","blah":"foo","status":["100","200","300","400","500"],"error":["This is foolish","Need smthing smart too"]}"#;
    let signature = generate_signature("integration_test_secret", body.as_bytes());

    let response = app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/borat")
                .header("X-Hub-Signature", format!("sha256={}", signature))
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let event = pipeline_rx.recv().await.unwrap();
    assert_eq!(event.source, "/borat");

    let delivered = executor.dispatch(&event).await;
    assert_eq!(delivered.len(), 1);

    let fields = &delivered[0].fields;
    assert_eq!(fields.names().collect::<Vec<_>>(), vec!["firstname", "blah", "status", "error"]);
    assert_eq!(fields.get("status"), Some(&FieldValue::from(vec!["100", "200", "300"])));
    assert_eq!(fields.get("error"), Some(&FieldValue::from(vec!["This is foolish"])));
    assert_eq!(delivered[0].id, event.id);

    // Test health check
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/-/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_config_rejects_unknown_processor() {
    let result: Result<AppConfig, _> = serde_json::from_value(json!({
        "integrations": [{
            "source": {"type": "webhook"},
            "pipelines": [{"processors": [{"type": "mapper"}], "sinks": []}]
        }]
    }));

    assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_prune_pattern_fails_executor_build() {
    let config: AppConfig = serde_json::from_value(json!({
        "integrations": [{
            "source": {"type": "webhook"},
            "pipelines": [{
                "processors": [{"type": "prune", "whitelist_values": {"status": "(2"}}],
                "sinks": [{"type": "log"}]
            }]
        }]
    }))
    .unwrap();

    assert!(PipelineExecutor::new(&config).await.is_err());
}
