pub mod config;
pub mod handler;
pub mod hmac;

use axum::{Router, routing::post};
use std::sync::Arc;
use crate::error::Result;
use crate::pipeline::PipelineSender;
use self::hmac::HmacValidator;
use handler::{handle_webhook, WebhookState};

pub use self::config::{WebhookAuthentication, WebhookSourceConfig};

pub fn register_webhook_routes(
    router: Router,
    config: WebhookSourceConfig,
    pipeline_tx: PipelineSender,
) -> Result<Router> {
    // Resolve secret and create HMAC validator
    let validator = match &config.authentication {
        Some(auth) => Some(HmacValidator::new(auth.secret.resolve()?, auth.header_name.clone())),
        None => {
            tracing::warn!("Webhook {} accepts unsigned requests", config.webhook_path);
            None
        }
    };

    // Create shared state
    let state = Arc::new(WebhookState {
        source: config.webhook_path.clone(),
        validator,
        pipeline_tx,
    });

    // Register webhook route
    let router = router.route(
        &config.webhook_path,
        post(handle_webhook).with_state(state),
    );

    tracing::info!("Registered webhook at: {}", config.webhook_path);

    Ok(router)
}

#[cfg(test)]
mod tests;
