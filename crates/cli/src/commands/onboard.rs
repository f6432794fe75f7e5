//! `shotscore onboard` — First-time setup wizard.

use shotscore_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let default_config = AppConfig::default();
    let reference_dir = default_config.references.directory.clone();
    let table_path = default_config.references.table_path.clone();

    println!("📷 ShotScore — First-Time Setup");
    println!("===============================\n");

    // Create directories
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !reference_dir.exists() {
        std::fs::create_dir_all(&reference_dir)?;
        println!("✅ Created reference directory: {}", reference_dir.display());
    }

    // Seed the performance table with a header and one sample row
    if !table_path.exists() {
        std::fs::write(
            &table_path,
            concat!(
                "image_filename|performance_info\n",
                "sample.png|\"Scored 8/10 by reviewers. Strong leading lines, slightly overexposed sky.\"\n",
            ),
        )?;
        println!("✅ Created reference table: {}", table_path.display());
        println!("   Drop reference images into the reference directory and");
        println!("   add one row per image to the table.");
    }

    // Create config file
    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your tokens", config_path.display());
        println!("      (slack_bot_token, slack_app_token, openai_api_key)");
        println!("   2. Run: shotscore run");
        println!("   3. Mention the bot in Slack with an image attached!\n");
    }

    println!("🎉 Setup complete! Run `shotscore run` to start the bridge.\n");

    Ok(())
}
