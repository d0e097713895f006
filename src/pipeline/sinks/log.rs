use crate::error::Result;
use crate::pipeline::event::PipelineEvent;
use super::Sink;

/// Sink that writes pruned events to the log
pub struct LogSink;

#[async_trait::async_trait]
impl Sink for LogSink {
    async fn write(&self, event: &PipelineEvent) -> Result<()> {
        let body = serde_json::to_string(&event.fields)?;

        tracing::info!(target: "prunegate::sink", id = %event.id, source = %event.source, "{}", body);

        Ok(())
    }
}
