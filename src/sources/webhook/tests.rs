use super::*;
use crate::config::secret::SecretSource;
use crate::pipeline::create_pipeline_channel;
use crate::prune::FieldValue;
use axum::http::{Request, StatusCode};
use axum::body::Body;
use tower::ServiceExt;

fn signed_config(secret: &str) -> WebhookSourceConfig {
    WebhookSourceConfig {
        webhook_path: "/events".to_string(),
        authentication: Some(WebhookAuthentication {
            secret: SecretSource::Plain(secret.to_string()),
            header_name: "X-Hub-Signature".to_string(),
        }),
    }
}

fn signature(secret: &str, body: &[u8]) -> String {
    let validator = HmacValidator::new(secret.to_string(), "X-Hub-Signature".to_string());
    format!("sha256={}", validator.sign(body).unwrap())
}

fn request(body: &'static str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/events")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature", signature);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_signed_event_is_forwarded() {
    let (tx, mut rx) = create_pipeline_channel(100);
    let app = register_webhook_routes(Router::new(), signed_config("test_secret"), tx).unwrap();

    let body = r#"{"firstname":"Borat","status":["200","500"]}"#;
    let response = app
        .oneshot(request(body, Some(signature("test_secret", body.as_bytes()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.source, "/events");
    assert_eq!(event.fields.names().collect::<Vec<_>>(), vec!["firstname", "status"]);
    assert_eq!(event.fields.get("status"), Some(&FieldValue::from(vec!["200", "500"])));
}

#[tokio::test]
async fn test_batch_is_split_into_events() {
    let (tx, mut rx) = create_pipeline_channel(100);
    let app = register_webhook_routes(Router::new(), signed_config("test_secret"), tx).unwrap();

    let body = r#"[{"id":"1"},{"id":"2"}]"#;
    let response = app
        .oneshot(request(body, Some(signature("test_secret", body.as_bytes()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(rx.recv().await.unwrap().fields.get("id"), Some(&FieldValue::from("1")));
    assert_eq!(rx.recv().await.unwrap().fields.get("id"), Some(&FieldValue::from("2")));
}

#[tokio::test]
async fn test_missing_signature() {
    let (tx, _rx) = create_pipeline_channel(100);
    let app = register_webhook_routes(Router::new(), signed_config("test_secret"), tx).unwrap();

    let response = app.oneshot(request(r#"{"a":"b"}"#, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_signature() {
    let (tx, _rx) = create_pipeline_channel(100);
    let app = register_webhook_routes(Router::new(), signed_config("test_secret"), tx).unwrap();

    let body = r#"{"a":"b"}"#;
    let response = app
        .oneshot(request(body, Some(signature("other_secret", body.as_bytes()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsigned_source_rejects_nested_values() {
    let (tx, mut rx) = create_pipeline_channel(100);
    let config = WebhookSourceConfig {
        webhook_path: "/events".to_string(),
        authentication: None,
    };
    let app = register_webhook_routes(Router::new(), config, tx).unwrap();

    let response = app
        .oneshot(request(r#"{"user":{"name":"borat"}}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}
