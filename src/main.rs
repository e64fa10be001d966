use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use idea_engine::{
    config::Config,
    models::GenerationRequest,
    services::{
        providers::{AiGateway, GeminiGateway, LlmVerifier, StaticCatalog},
        IdeaGenerator,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    // Request JSON from a file argument, otherwise stdin
    let raw_request = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read request file {}", path))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read request from stdin")?;
            buffer
        }
    };
    let request: GenerationRequest =
        serde_json::from_str(&raw_request).context("Invalid generation request")?;

    let gateway: Arc<dyn AiGateway> = Arc::new(GeminiGateway::new(
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    ));
    let generator = IdeaGenerator::new(
        Arc::new(StaticCatalog),
        gateway.clone(),
        Arc::new(LlmVerifier::new(gateway)),
    )
    .with_retry_policy(config.retry_policy())
    .with_timeouts(config.attempt_timeout(), config.validation_timeout());

    let result = generator.generate_ideas(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
