use crate::config::{AppConfig, Pipeline, SourceConfig};
use crate::pipeline::processors::ProcessorConfig;
use crate::error::Result;
use crate::pipeline::event::PipelineEvent;
use crate::pipeline::processors::{Processor, prune::PruneProcessor};
use crate::pipeline::sinks::{Sink, SinkConfig, database::DatabaseSink, log::LogSink};
use crate::pipeline::PipelineReceiver;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, error, debug, warn};

pub struct PipelineExecutor {
    /// Pipelines keyed by the webhook path feeding them
    pipelines: HashMap<String, Vec<PipelineInstance>>,
}

pub struct PipelineInstance {
    processors: Vec<Box<dyn Processor>>,
    sinks: Vec<Arc<dyn Sink>>,
}

impl PipelineInstance {
    pub fn new(processors: Vec<Box<dyn Processor>>, sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { processors, sinks }
    }
}

impl PipelineExecutor {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let mut pipelines: HashMap<String, Vec<PipelineInstance>> = HashMap::new();

        for integration in &config.integrations {
            let SourceConfig::Webhook(source) = &integration.source;

            for pipeline_config in &integration.pipelines {
                let pipeline = Self::create_pipeline(pipeline_config).await?;
                pipelines
                    .entry(source.webhook_path.clone())
                    .or_default()
                    .push(pipeline);
            }
        }

        Ok(Self { pipelines })
    }

    pub fn with_pipelines(pipelines: HashMap<String, Vec<PipelineInstance>>) -> Self {
        Self { pipelines }
    }

    async fn create_pipeline(pipeline_config: &Pipeline) -> Result<PipelineInstance> {
        // Build processors
        let mut processors: Vec<Box<dyn Processor>> = Vec::new();

        for processor_config in &pipeline_config.processors {
            match processor_config {
                ProcessorConfig::Prune(prune_config) => {
                    let prune = PruneProcessor::new(prune_config)?;
                    processors.push(Box::new(prune));
                }
            }
        }

        let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();

        for sink_config in &pipeline_config.sinks {
            match sink_config {
                SinkConfig::Log => sinks.push(Arc::new(LogSink)),
                SinkConfig::Mongo { url, collection, insert_only } => {
                    let mongo_url = url.resolve()?;
                    let sink = DatabaseSink::new(&mongo_url, collection, *insert_only).await?;

                    sinks.push(Arc::new(sink));
                }
            }
        }

        Ok(PipelineInstance::new(processors, sinks))
    }

    pub async fn run(self, mut receiver: PipelineReceiver) {
        let count: usize = self.pipelines.values().map(Vec::len).sum();
        info!("Pipeline executor started with {} pipelines", count);

        while let Some(event) = receiver.recv().await {
            debug!("Received event: id={}, source={}", event.id, event.source);
            self.dispatch(&event).await;
        }

        info!("Pipeline executor stopped");
    }

    /// Runs `event` through every pipeline of its source. Returns the
    /// events handed to sinks, one per pipeline that kept the event.
    pub async fn dispatch(&self, event: &PipelineEvent) -> Vec<PipelineEvent> {
        let Some(pipelines) = self.pipelines.get(&event.source) else {
            warn!("No pipeline configured for source {}", event.source);
            return Vec::new();
        };

        let mut delivered = Vec::new();

        for (idx, pipeline) in pipelines.iter().enumerate() {
            match self.process_event(event, pipeline, idx).await {
                Ok(Some(processed)) => delivered.push(processed),
                Ok(None) => {}
                Err(e) => error!("Error processing event in pipeline {}: {}", idx, e),
            }
        }

        delivered
    }

    async fn process_event(&self, event: &PipelineEvent, pipeline: &PipelineInstance, pipeline_idx: usize) -> Result<Option<PipelineEvent>> {
        let mut current_event = event.clone();

        // Process through all processors
        for (idx, processor) in pipeline.processors.iter().enumerate() {
            match processor.process(current_event).await? {
                Some(processed_event) => {
                    current_event = processed_event;
                    debug!("Event passed through processor {} in pipeline {}", idx, pipeline_idx);
                }
                None => {
                    debug!("Event filtered out by processor {} in pipeline {}", idx, pipeline_idx);
                    return Ok(None);
                }
            }
        }

        // Write to all sinks
        for (idx, sink) in pipeline.sinks.iter().enumerate() {
            match sink.write(&current_event).await {
                Ok(_) => {
                    debug!("Event written to sink {} in pipeline {}", idx, pipeline_idx);
                }
                Err(e) => {
                    error!("Failed to write event to sink {} in pipeline {}: {}", idx, pipeline_idx, e);
                    // Continue to other sinks even if one fails
                }
            }
        }

        Ok(Some(current_event))
    }
}
