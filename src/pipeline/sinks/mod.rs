pub mod database;
pub mod log;

use crate::error::Result;
use crate::pipeline::event::PipelineEvent;
use crate::config::secret::SecretSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Log,
    Mongo {
        url: SecretSource,
        collection: String,
        #[serde(default)]
        insert_only: bool,
    },
}

#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, event: &PipelineEvent) -> Result<()>;
}
