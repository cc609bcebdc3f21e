use super::connect;
use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use comic_editor::ComicRemote;

pub async fn logout(config: &Config) -> Result<()> {
    let remote = connect(config)?;
    remote.logout().await?;

    println!("{} Logged out of {}", "✓".green(), config.server_url);
    Ok(())
}
