mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{create, edit, init, logout, CreateArgs, EditArgs, InitArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Comic CLI - create and edit AI-generated comics
#[derive(Parser, Debug)]
#[command(name = "comic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override the server URL from the config file
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a comic.config.json in the current directory
    Init(InitArgs),

    /// Generate a new comic from a prompt
    Create(CreateArgs),

    /// Open the interactive editing shell
    Edit(EditArgs),

    /// End the server session
    Logout,
}

fn run(cli: Cli, cwd: &str) -> anyhow::Result<()> {
    if let Command::Init(args) = cli.command {
        return init(args, cwd);
    }

    let mut config = Config::load(cwd)?;
    if let Some(server_url) = cli.server_url {
        config.server_url = server_url;
    }

    // One logical thread drives the session; suspension only at remote calls
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Command::Init(_) => Ok(()),
            Command::Create(args) => create(args, &config).await,
            Command::Edit(args) => edit(args, &config).await,
            Command::Logout => logout(&config).await,
        }
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli, &cwd.display().to_string()));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
