//! `shotscore doctor` — Diagnose configuration health.

use shotscore_config::AppConfig;
use shotscore_context::ReferenceStore;
use shotscore_core::ContextError;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 ShotScore Doctor — Diagnostics");
    println!("=================================\n");

    let mut issues = 0;

    println!("  ✅ Rust binary running");

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ❌ No config file — run `shotscore onboard`");
        issues += 1;
        None
    };

    if let Some(config) = config {
        // Check credentials
        if config.slack_bot_token.is_some() && config.slack_app_token.is_some() {
            println!("  ✅ Slack tokens configured");
        } else {
            println!("  ⚠️  Slack tokens missing — add slack_bot_token and slack_app_token");
            issues += 1;
        }
        if config.openai_api_key.is_some() {
            println!("  ✅ Vision API key configured");
        } else {
            println!("  ⚠️  No vision API key — add openai_api_key to config.toml");
            issues += 1;
        }

        // Check the reference store
        let store = ReferenceStore::new(
            &config.references.table_path,
            &config.references.directory,
            config.references.max_examples,
        );
        match store.load() {
            Ok(refs) => {
                println!("  ✅ Reference table loads ({} example(s) resolved)", refs.len());
                if refs.is_empty() {
                    println!("     Reviews will run without reference context.");
                }
            }
            Err(ContextError::TableMissing { path }) => {
                println!(
                    "  ⚠️  No reference table at {} — run `shotscore onboard`",
                    path.display()
                );
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Reference table broken: {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
