pub mod create;
pub mod edit;
pub mod init;
pub mod logout;

pub use create::{create, CreateArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use logout::logout;

use crate::config::Config;
use colored::Colorize;
use comic_editor::{ComicRemote, ComicSession, HttpRemote, NotificationKind};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// HTTP remote built from the config file
pub fn connect(config: &Config) -> anyhow::Result<Arc<dyn ComicRemote>> {
    let remote = HttpRemote::new(config.remote_config())?;
    tracing::debug!(server = %remote.base_url(), "connecting");
    Ok(Arc::new(remote))
}

/// Print every notification the session raises until the session is gone
pub fn print_notifications(session: &ComicSession) -> JoinHandle<()> {
    let mut rx = session.notifier().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => match notification.kind {
                    NotificationKind::Success => {
                        println!("  {} {}", "✓".green(), notification.message)
                    }
                    NotificationKind::Error => {
                        println!("  {} {}", "✗".red(), notification.message.red())
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notification printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
