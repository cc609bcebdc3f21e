//! Interactive editing shell
//!
//! Each input line is one gesture. Tile numbers are 1-based as shown on
//! screen; key chords such as `ctrl+s` go through the same bindings a
//! graphical front-end would use.

use super::{connect, print_notifications};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comic_editor::{
    Action, ActionOutcome, ComicSession, CommandDispatcher, EditorError, KeyChord, KeyOutcome,
    Modifiers, SyncOutcome,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Comic to open; omit to start empty and `create` from a prompt
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Action(Action),
    Key(KeyChord),
    /// Document indices of the visible tiles in their new order
    Drag(Vec<usize>),
    /// Full permutation, `order[i]` is the old index of the tile now at `i`
    Reorder(Vec<usize>),
    Show,
    Help,
    Quit,
}

pub async fn edit(args: EditArgs, config: &Config) -> Result<()> {
    let remote = connect(config)?;
    let session = match &args.id {
        Some(id) => ComicSession::open(remote, config.session_config(), id).await?,
        None => ComicSession::new(remote, config.session_config()),
    };
    let printer = print_notifications(&session);
    let dispatcher = CommandDispatcher::new();

    if args.id.is_some() {
        print_page(&session);
    } else {
        println!("No comic open. Type `create <prompt>` or `help`.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bright_blue());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => run(&dispatcher, &session, command).await,
            Err(message) => println!("  {} {}", "✗".red(), message),
        }
        // Give the printer a chance before the next prompt
        tokio::task::yield_now().await;
    }

    session.end();
    printer.abort();
    Ok(())
}

async fn run(dispatcher: &CommandDispatcher, session: &ComicSession, command: ShellCommand) {
    match command {
        ShellCommand::Help => print_help(),
        ShellCommand::Show => print_page(session),
        ShellCommand::Quit => {}

        ShellCommand::Key(chord) => match dispatcher.handle_key(session, chord).await {
            KeyOutcome::Handled(result) => report(session, result),
            KeyOutcome::Ignored => println!("  (nothing bound to that key)"),
        },

        ShellCommand::Action(action) => {
            let result = dispatcher.dispatch(session, action).await;
            report(session, result);
        }

        ShellCommand::Drag(visual) => {
            let result = dispatcher.drag_end(session, &visual).await;
            report(session, result.map(ActionOutcome::Saved));
        }

        ShellCommand::Reorder(order) => {
            let result = session.reorder(order).await;
            report(session, result.map(ActionOutcome::Saved));
        }
    }
}

/// Failures were already announced by the notification printer
fn report(session: &ComicSession, result: Result<ActionOutcome, EditorError>) {
    match result {
        Ok(ActionOutcome::Preview(preview)) => {
            println!();
            print!("{}", preview);
        }
        Ok(ActionOutcome::Saved(SyncOutcome::Coalesced)) => {
            println!("  {} save queued behind the one in flight", "…".yellow());
        }
        Ok(ActionOutcome::Saved(_)) => {}
        Ok(_) => print_page(session),
        Err(error) => tracing::debug!(error = %error, "command failed"),
    }
}

fn print_page(session: &ComicSession) {
    let doc = session.snapshot();
    let info = session.page_info();

    println!();
    if doc.title.is_empty() {
        println!("{}", "(untitled)".bright_white().bold());
    } else {
        println!("{}", doc.title.bright_white().bold());
    }
    println!(
        "Page {} of {}",
        info.current_page,
        info.total_pages.max(1)
    );

    for (offset, tile) in session.visible_tiles().iter().enumerate() {
        let number = info.range.start + offset + 1;
        println!("  [{}] {}", number.to_string().cyan(), tile.scene_text);
        println!("      {}", tile.image_ref.dimmed());
    }
    println!();
}

fn print_help() {
    println!(
        r#"
  create <prompt>        generate a new comic
  load <id>              open an existing comic
  show                   print the current page
  next | prev            move between pages
  text <n> <caption>     replace the caption of tile n
  regen <n>              regenerate the image of tile n
  title <text>           rename the comic
  drag <n> <n> ...       new order of the tiles on this page
  reorder <n> <n> ...    new order of every tile
  save | ctrl+s          save now
  preview | ctrl+p       show the whole comic
  logout                 sign out and stop autosave
  quit                   leave without saving
"#
    );
}

/// Parse one shell line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "show" | "ls" => ShellCommand::Show,
        "next" => ShellCommand::Action(Action::ChangePage { delta: 1 }),
        "prev" => ShellCommand::Action(Action::ChangePage { delta: -1 }),
        "save" => ShellCommand::Action(Action::Save),
        "preview" => ShellCommand::Action(Action::Preview),
        "logout" => ShellCommand::Action(Action::Logout),

        "create" => ShellCommand::Action(Action::Create {
            prompt: required(rest, "create <prompt>")?.to_string(),
            title: None,
        }),
        "load" => ShellCommand::Action(Action::Load {
            id: required(rest, "load <id>")?.to_string(),
        }),
        "title" => ShellCommand::Action(Action::SetTitle {
            title: required(rest, "title <text>")?.to_string(),
        }),
        "text" => {
            let (number, caption) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: text <n> <caption>".to_string())?;
            ShellCommand::Action(Action::EditText {
                index: tile_index(number)?,
                text: caption.trim().to_string(),
            })
        }
        "regen" => ShellCommand::Action(Action::Regenerate {
            index: tile_index(required(rest, "regen <n>")?)?,
        }),
        "drag" => ShellCommand::Drag(tile_indices(required(rest, "drag <n> <n> ...")?)?),
        "reorder" => {
            ShellCommand::Reorder(tile_indices(required(rest, "reorder <n> <n> ...")?)?)
        }

        chord if chord.contains('+') => ShellCommand::Key(parse_chord(chord)?),
        other => return Err(format!("unknown command `{}` (try `help`)", other)),
    };

    Ok(Some(command))
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest)
    }
}

/// Screen tile number (1-based) to document index
fn tile_index(number: &str) -> Result<usize, String> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("`{}` is not a tile number", number)),
    }
}

fn tile_indices(numbers: &str) -> Result<Vec<usize>, String> {
    numbers.split_whitespace().map(tile_index).collect()
}

/// `ctrl+s`, `cmd+p`, `ctrl+shift+s`
pub fn parse_chord(chord: &str) -> Result<KeyChord, String> {
    let mut parts: Vec<&str> = chord.split('+').collect();
    let key = parts
        .pop()
        .filter(|key| key.chars().count() == 1)
        .and_then(|key| key.chars().next())
        .ok_or_else(|| format!("`{}` does not end in a single key", chord))?;

    let mut modifiers = Modifiers::default();
    for part in parts {
        match part {
            "ctrl" | "control" => modifiers.ctrl = true,
            "cmd" | "meta" | "super" => modifiers.meta = true,
            "shift" => modifiers.shift = true,
            "alt" | "option" => modifiers.alt = true,
            other => return Err(format!("unknown modifier `{}`", other)),
        }
    }

    Ok(KeyChord::new(key, modifiers))
}
