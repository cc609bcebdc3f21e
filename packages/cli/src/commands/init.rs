use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Comic server base URL
    #[arg(short, long)]
    pub server_url: Option<String>,

    /// Tiles per page
    #[arg(short, long)]
    pub page_size: Option<usize>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing comic client...".bright_blue().bold());

    let mut config = Config::default();
    if let Some(server_url) = args.server_url {
        config.server_url = server_url;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size.max(1);
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!("  {} Server: {}", "✓".green(), config.server_url);
    println!();
    println!("{}", "✅ Ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Add your sessionCookie to {}", DEFAULT_CONFIG_NAME);
    println!("  2. Run: comic create \"<your prompt>\"");
    println!("  3. Run: comic edit <comic id>");

    Ok(())
}
