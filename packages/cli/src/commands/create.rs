use super::{connect, print_notifications};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comic_editor::ComicSession;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// What the comic should be about
    pub prompt: String,

    /// Title; the server picks one when omitted
    #[arg(short, long)]
    pub title: Option<String>,

    /// Print the whole comic once it is generated
    #[arg(long)]
    pub preview: bool,
}

pub async fn create(args: CreateArgs, config: &Config) -> Result<()> {
    let session = ComicSession::new(connect(config)?, config.session_config());
    let printer = print_notifications(&session);

    println!("{}", "🎨 Generating comic...".bright_blue().bold());
    let result = session.create(&args.prompt, args.title.as_deref()).await;
    session.end();
    // Let the printer drain the create notification
    tokio::task::yield_now().await;
    printer.abort();
    result?;

    let doc = session.snapshot();
    let id = doc.id().unwrap_or_default();
    println!(
        "  {} {} ({} tiles)",
        "✓".green(),
        doc.title.bright_white(),
        doc.tile_count()
    );

    if args.preview {
        println!();
        print!("{}", session.preview());
    }

    println!();
    println!("Edit it with: comic edit {}", id);
    Ok(())
}
