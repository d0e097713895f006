use crate::error::Result;
use crate::pipeline::event::PipelineEvent;
use crate::prune::{PruneConfig, PruneFilter};
use super::Processor;

/// Processor that prunes event fields by name and value
pub struct PruneProcessor {
    filter: PruneFilter,
}

impl PruneProcessor {
    pub fn new(config: &PruneConfig) -> Result<Self> {
        let filter = PruneFilter::new(config)?;

        Ok(Self { filter })
    }
}

#[async_trait::async_trait]
impl Processor for PruneProcessor {
    async fn process(&self, mut event: PipelineEvent) -> Result<Option<PipelineEvent>> {
        self.filter.prune(&mut event.fields);

        // Nothing left worth forwarding
        if event.fields.names().next().is_none() {
            tracing::debug!("Event {} has no named fields left after pruning", event.id);
            return Ok(None);
        }

        Ok(Some(event))
    }
}
