//! `shotscore review` — Score a local image file once and print the critique.
//!
//! Uses the same context assembly as the Slack path, so it doubles as an
//! end-to-end smoke test for the reference store and the vision endpoint.

use std::path::PathBuf;

use shotscore_config::AppConfig;
use shotscore_context::{build_review_request, ReferenceStore};
use shotscore_core::{ContextError, Reviewer, TargetImage};
use shotscore_providers::OpenAiVisionReviewer;
use tracing::warn;

pub async fn run(image: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let api_key = config.openai_api_key.clone().ok_or(
        "No API key configured. Set openai_api_key in config.toml or the OPENAI_API_KEY environment variable.",
    )?;

    let bytes = std::fs::read(&image)
        .map_err(|e| format!("Failed to read {}: {e}", image.display()))?;
    let target = TargetImage::from_bytes(bytes);

    let store = ReferenceStore::new(
        &config.references.table_path,
        &config.references.directory,
        config.references.max_examples,
    );

    // One-shot mode tolerates a missing table: review without references.
    let references = match store.load() {
        Ok(refs) => refs,
        Err(ContextError::TableMissing { path }) => {
            warn!(path = %path.display(), "No reference table, reviewing without references");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "📷 Reviewing {} with {} reference(s)...",
        image.display(),
        references.len()
    );

    let request = build_review_request(&config.model, config.max_tokens, &target, &references)?;

    let reviewer = OpenAiVisionReviewer::openai(api_key);
    let result = reviewer.review(request).await?;

    println!("\n{}\n", result.text);

    Ok(())
}
