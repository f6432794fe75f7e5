//! `shotscore run` — Start the Slack review bridge.

use std::sync::Arc;

use shotscore_channels::{SlackChannel, SlackConfig};
use shotscore_config::AppConfig;
use shotscore_context::ReferenceStore;
use shotscore_pipeline::ReviewPipeline;
use shotscore_providers::OpenAiVisionReviewer;
use tracing::info;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_daemon_credentials() {
        return Err(concat!(
            "Missing credentials. Set slack_bot_token, slack_app_token, and ",
            "openai_api_key in config.toml (or the SLACK_BOT_TOKEN, ",
            "SLACK_APP_TOKEN, OPENAI_API_KEY environment variables), then retry."
        )
        .into());
    }

    println!("📷 ShotScore — Starting review bridge");
    println!("   Model: {}", config.model);
    println!(
        "   References: {} (up to {} per review)",
        config.references.directory.display(),
        config.references.max_examples
    );

    let slack = SlackChannel::new(SlackConfig {
        bot_token: config.slack_bot_token.clone().unwrap_or_default(),
        app_token: config.slack_app_token.clone().unwrap_or_default(),
        allowed_users: config.channel.allowed_users.clone(),
    });

    let reviewer = OpenAiVisionReviewer::openai(config.openai_api_key.clone().unwrap_or_default());

    let store = ReferenceStore::new(
        &config.references.table_path,
        &config.references.directory,
        config.references.max_examples,
    );

    let pipeline = Arc::new(ReviewPipeline::new(
        Arc::new(slack),
        Arc::new(reviewer),
        store,
        config.model.clone(),
        config.max_tokens,
    ));

    info!("Pipeline wired, entering event loop");

    // Blocks until the channel's event stream closes. The Socket Mode
    // websocket is not established here; a transport task feeds
    // envelopes to SlackChannel::handle_envelope.
    pipeline.run().await?;

    Ok(())
}
