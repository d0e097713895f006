use serde::{Deserialize, Serialize};
use crate::config::secret::SecretSource;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookSourceConfig {
    #[serde(rename = "webhookPath", default = "default_webhook_path")]
    pub webhook_path: String,

    /// Requests are accepted unsigned when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<WebhookAuthentication>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookAuthentication {
    pub secret: SecretSource,

    #[serde(rename = "headerName", default = "default_header_name")]
    pub header_name: String,
}

fn default_webhook_path() -> String {
    "/events".to_string()
}

fn default_header_name() -> String {
    "X-Hub-Signature".to_string()
}
