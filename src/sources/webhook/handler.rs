use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use serde_json::Value;
use crate::error::{AppError, Result};
use crate::pipeline::{PipelineSender, event::PipelineEvent};
use crate::prune::Event;
use super::hmac::HmacValidator;

pub struct WebhookState {
    pub source: String,
    pub validator: Option<HmacValidator>,
    pub pipeline_tx: PipelineSender,
}

pub async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse> {
    // Step 1: Validate HMAC signature when configured
    if let Some(validator) = &state.validator {
        let signature = headers
            .get(validator.header_name())
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::MissingSignature)?;

        validator.validate(&body, signature)?;
    }

    // Step 2: Parse JSON body into events; reject the whole batch on any bad event
    let json_body: Value = serde_json::from_slice(&body)?;
    let events = parse_events(json_body)?;
    let count = events.len();

    // Step 3: Send to pipeline
    for fields in events {
        state.pipeline_tx
            .send(PipelineEvent::new(fields, state.source.clone()))
            .await
            .map_err(|_| AppError::PipelineSend)?;
    }

    tracing::info!("Accepted {} event(s) on {}", count, state.source);

    Ok(StatusCode::OK)
}

/// A body is one event object or an array of them
fn parse_events(body: Value) -> Result<Vec<Event>> {
    match body {
        Value::Array(items) => items.into_iter().map(Event::from_json).collect(),
        other => Ok(vec![Event::from_json(other)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_event() {
        let events = parse_events(json!({"status": "200"})).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("status"));
    }

    #[test]
    fn test_parse_batch() {
        let events = parse_events(json!([{"a": "1"}, {"b": ["2", "3"]}])).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_rejects_scalars_and_bad_members() {
        assert!(matches!(parse_events(json!("text")), Err(AppError::InvalidEvent(_))));
        assert!(parse_events(json!([{"a": "1"}, 42])).is_err());
    }
}
