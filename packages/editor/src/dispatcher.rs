//! # Command Dispatcher
//!
//! Binds user gestures to session calls. Holds no document state of its own.
//!
//! - Keyboard: control or command plus a bound key runs a command and
//!   reports [`KeyOutcome::Handled`] so the host suppresses its default
//!   handling. Anything else is [`KeyOutcome::Ignored`].
//! - Buttons: each [`Action`] maps to exactly one session call.
//! - Drag end: the visual order of the visible page is turned into a full
//!   permutation of the document and handed to `reorder`.

use crate::errors::EditorError;
use crate::mutations::MutationError;
use crate::preview::ComicPreview;
use crate::session::ComicSession;
use crate::synchronizer::SyncOutcome;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const META: Modifiers = Modifiers {
        ctrl: false,
        meta: true,
        shift: false,
        alt: false,
    };

    /// Control on most platforms, command on macOS
    pub fn has_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: char) -> Self {
        Self::new(key, Modifiers::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Save,
    Preview,
}

/// Button-level intents
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create {
        prompt: String,
        title: Option<String>,
    },
    Load {
        id: String,
    },
    Save,
    Preview,
    Regenerate {
        index: usize,
    },
    EditText {
        index: usize,
        text: String,
    },
    SetTitle {
        title: String,
    },
    ChangePage {
        delta: isize,
    },
    Logout,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Save => Action::Save,
            Command::Preview => Action::Preview,
        }
    }
}

#[derive(Debug)]
pub enum ActionOutcome {
    Done,
    Saved(SyncOutcome),
    Preview(ComicPreview),
    Page(usize),
    Image(String),
}

#[derive(Debug)]
pub enum KeyOutcome {
    Ignored,
    Handled(Result<ActionOutcome, EditorError>),
}

impl KeyOutcome {
    /// Whether the host should suppress its own handling of the key
    pub fn prevents_default(&self) -> bool {
        matches!(self, KeyOutcome::Handled(_))
    }
}

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    bindings: HashMap<char, Command>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        let mut dispatcher = Self {
            bindings: HashMap::new(),
        };
        dispatcher.bind('s', Command::Save);
        dispatcher.bind('p', Command::Preview);
        dispatcher
    }

    /// Bind `key` (case-insensitive) under the command modifier
    pub fn bind(&mut self, key: char, command: Command) {
        self.bindings.insert(key.to_ascii_lowercase(), command);
    }

    pub fn resolve_key(&self, chord: KeyChord) -> Option<Command> {
        if !chord.modifiers.has_command() {
            return None;
        }
        self.bindings.get(&chord.key.to_ascii_lowercase()).copied()
    }

    pub async fn handle_key(&self, session: &ComicSession, chord: KeyChord) -> KeyOutcome {
        match self.resolve_key(chord) {
            Some(command) => {
                tracing::debug!(?command, key = %chord.key, "shortcut");
                KeyOutcome::Handled(self.dispatch(session, command.into()).await)
            }
            None => KeyOutcome::Ignored,
        }
    }

    pub async fn dispatch(
        &self,
        session: &ComicSession,
        action: Action,
    ) -> Result<ActionOutcome, EditorError> {
        match action {
            Action::Create { prompt, title } => {
                session.create(&prompt, title.as_deref()).await?;
                Ok(ActionOutcome::Done)
            }
            Action::Load { id } => {
                session.load(&id).await?;
                Ok(ActionOutcome::Done)
            }
            Action::Save => Ok(ActionOutcome::Saved(session.save().await)),
            Action::Preview => Ok(ActionOutcome::Preview(session.preview())),
            Action::Regenerate { index } => {
                Ok(ActionOutcome::Image(session.regenerate_image(index).await?))
            }
            Action::EditText { index, text } => {
                session.edit_text(index, &text)?;
                Ok(ActionOutcome::Done)
            }
            Action::SetTitle { title } => {
                session.set_title(&title)?;
                Ok(ActionOutcome::Done)
            }
            Action::ChangePage { delta } => Ok(ActionOutcome::Page(session.change_page(delta))),
            Action::Logout => {
                session.logout().await?;
                Ok(ActionOutcome::Done)
            }
        }
    }

    /// Reorder from a drag that ended on the current page
    ///
    /// `visual` lists the document indices of the visible tiles in the order
    /// they are now displayed.
    pub async fn drag_end(
        &self,
        session: &ComicSession,
        visual: &[usize],
    ) -> Result<SyncOutcome, EditorError> {
        let tile_count = session.snapshot().tile_count();
        let window = session.page_info().range;

        let order = match derive_permutation(tile_count, window, visual) {
            Ok(order) => order,
            Err(error) => {
                let error = EditorError::from(error);
                session.notifier().error(error.user_message());
                return Err(error);
            }
        };

        session.reorder(order).await
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Full permutation for a drag inside `window`
///
/// Tiles outside the window keep their place. `visual` must be a
/// rearrangement of exactly the indices in `window`.
pub fn derive_permutation(
    tile_count: usize,
    window: Range<usize>,
    visual: &[usize],
) -> Result<Vec<usize>, MutationError> {
    if window.end > tile_count || window.start > window.end {
        return Err(MutationError::InvalidPermutation(format!(
            "window {}..{} outside {} tiles",
            window.start, window.end, tile_count
        )));
    }
    if visual.len() != window.len() {
        return Err(MutationError::InvalidPermutation(format!(
            "expected {} tiles on the page, got {}",
            window.len(),
            visual.len()
        )));
    }

    let mut seen = vec![false; window.len()];
    for &index in visual {
        if !window.contains(&index) {
            return Err(MutationError::InvalidPermutation(format!(
                "tile {} is not on the page",
                index
            )));
        }
        let slot = &mut seen[index - window.start];
        if *slot {
            return Err(MutationError::InvalidPermutation(format!(
                "tile {} appears twice",
                index
            )));
        }
        *slot = true;
    }

    let mut order: Vec<usize> = (0..tile_count).collect();
    order[window].copy_from_slice(visual);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_command_modifier() {
        let dispatcher = CommandDispatcher::new();

        assert_eq!(
            dispatcher.resolve_key(KeyChord::new('s', Modifiers::CTRL)),
            Some(Command::Save)
        );
        assert_eq!(
            dispatcher.resolve_key(KeyChord::new('P', Modifiers::META)),
            Some(Command::Preview)
        );
        assert_eq!(dispatcher.resolve_key(KeyChord::plain('s')), None);
        assert_eq!(dispatcher.resolve_key(KeyChord::new('x', Modifiers::CTRL)), None);
    }

    #[test]
    fn test_derive_permutation_inside_second_page() {
        // 8 tiles, page 2 shows 5..8, user drags tile 7 to the front
        let order = derive_permutation(8, 5..8, &[7, 5, 6]).unwrap();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 7, 5, 6]);
    }

    #[test]
    fn test_derive_permutation_rejects_corrupt_drag() {
        assert!(derive_permutation(5, 0..5, &[0, 1, 1, 3, 4]).is_err());
        assert!(derive_permutation(5, 0..5, &[0, 1, 2, 3]).is_err());
        assert!(derive_permutation(8, 5..8, &[4, 5, 6]).is_err());
        assert!(derive_permutation(3, 0..5, &[0, 1, 2]).is_err());
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(derive_permutation(0, 0..0, &[]).unwrap(), Vec::<usize>::new());
    }
}
