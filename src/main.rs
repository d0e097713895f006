use prunegate::{
    config::{AppConfig, Settings},
    pipeline::{create_pipeline_channel, executor::PipelineExecutor},
    server::run_server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let use_ansi = atty::is(atty::Stream::Stdout);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("prunegate={},tower_http=debug", settings.log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(use_ansi) // Disable ANSI colors in non-terminal environments
        )
        .init();

    let config = AppConfig::from_file(&settings.configuration_path)?;
    tracing::info!("Loaded {} integrations from {}", config.integrations.len(), settings.configuration_path);

    let (pipeline_tx, pipeline_rx) = create_pipeline_channel(settings.pipeline_buffer);

    let executor = PipelineExecutor::new(&config).await?;
    tokio::spawn(async move {
        executor.run(pipeline_rx).await;
    });

    run_server(config, settings.http_port, pipeline_tx).await?;

    Ok(())
}
