use axum::{Router, routing::get, http::StatusCode};
use tower_http::trace::TraceLayer;
use crate::config::AppConfig;
use crate::config::SourceConfig;
use crate::pipeline::PipelineSender;
use crate::sources::webhook;
use crate::error::{AppError, Result};
use std::collections::HashSet;

async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub fn create_router(config: AppConfig, pipeline_tx: PipelineSender) -> Result<Router> {
    let mut router = Router::new()
        .route("/-/healthz", get(health_check))
        .route("/-/ready", get(health_check));

    // Register source routes
    let mut paths = HashSet::new();
    for integration in config.integrations {
        router = match integration.source {
            SourceConfig::Webhook(webhook_config) => {
                if !paths.insert(webhook_config.webhook_path.clone()) {
                    return Err(AppError::Config(format!(
                        "duplicate webhookPath {}: each integration needs its own path",
                        webhook_config.webhook_path
                    )));
                }
                webhook::register_webhook_routes(router, webhook_config, pipeline_tx.clone())?
            }
        };
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}
