//! # Persistence Synchronizer
//!
//! Owns the single channel to the remote store. At most one persistence
//! request is in flight at any time, whatever triggered it.
//!
//! ## Coalescing
//!
//! ```text
//! trigger ──► idle? ──yes──► in flight ──► cycle ──► pending? ──no──► idle
//!               │                            ▲          │
//!               no                           └───yes────┘
//!               ▼
//!        mark pending, return Coalesced
//! ```
//!
//! A trigger that arrives while a request is in flight only sets a single
//! pending flag. When the request completes, the task that started it runs
//! exactly one more cycle, reading the snapshot current at that moment.
//! Failures never roll the document back; the next trigger retries.

use crate::document::{Document, MetadataUpdate};
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::notifications::Notifier;
use crate::pipeline::Pipeline;
use crate::remote::{ComicRemote, CreateComicRequest, UpdateComicRequest};
use parking_lot::Mutex;

/// What asked for a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// Button or keyboard shortcut
    Explicit,
    /// Interval timer
    Autosave,
    /// Tile order changed
    Reorder,
}

/// Which endpoint a cycle used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Create,
    Update,
}

#[derive(Debug)]
pub enum SyncOutcome {
    /// The last cycle run by this trigger succeeded
    Saved { kind: SaveKind, cycles: u32 },

    /// Another request was in flight; a follow-up cycle is scheduled
    Coalesced,

    /// Nothing to persist yet
    Skipped,

    /// The last cycle run by this trigger failed
    Failed { error: EditorError, cycles: u32 },
}

impl SyncOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SyncOutcome::Saved { .. })
    }

    pub fn cycles(&self) -> u32 {
        match self {
            SyncOutcome::Saved { cycles, .. } | SyncOutcome::Failed { cycles, .. } => *cycles,
            SyncOutcome::Coalesced | SyncOutcome::Skipped => 0,
        }
    }
}

#[derive(Debug, Default)]
struct SyncState {
    in_flight: bool,
    pending: bool,
    completed_cycles: u64,
}

#[derive(Debug, Default)]
pub struct PersistenceSynchronizer {
    state: Mutex<SyncState>,
}

impl PersistenceSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending
    }

    /// Cycles finished (successfully or not) since the session started
    pub fn completed_cycles(&self) -> u64 {
        self.state.lock().completed_cycles
    }

    /// Persist the current document, or coalesce into the request in flight
    pub async fn trigger(
        &self,
        trigger: SaveTrigger,
        pipeline: &Mutex<Pipeline>,
        remote: &dyn ComicRemote,
        notifier: &Notifier,
    ) -> SyncOutcome {
        if !pipeline.lock().document().exists() {
            tracing::debug!(?trigger, "nothing to save");
            if trigger == SaveTrigger::Explicit {
                notifier.error(EditorError::NoDocument.to_string());
            }
            return SyncOutcome::Skipped;
        }

        {
            let mut state = self.state.lock();
            if state.in_flight {
                state.pending = true;
                tracing::debug!(?trigger, "save coalesced into request in flight");
                return SyncOutcome::Coalesced;
            }
            state.in_flight = true;
        }

        let mut flight = InFlight {
            state: &self.state,
            armed: true,
        };
        let mut cycles = 0;

        loop {
            cycles += 1;
            let result = run_cycle(pipeline, remote).await;

            match &result {
                Ok(SaveKind::Create) => notifier.success("Comic created successfully!"),
                Ok(SaveKind::Update) => notifier.success("Comic saved successfully!"),
                Err(error) => notifier.error(error.user_message()),
            }

            if !flight.finish_cycle() {
                return match result {
                    Ok(kind) => SyncOutcome::Saved { kind, cycles },
                    Err(error) => SyncOutcome::Failed { error, cycles },
                };
            }
            tracing::debug!(?trigger, cycle = cycles + 1, "running coalesced follow-up save");
        }
    }
}

/// Releases the in-flight flag, also when the saving task is dropped mid-request
struct InFlight<'a> {
    state: &'a Mutex<SyncState>,
    armed: bool,
}

impl InFlight<'_> {
    /// Returns true when a coalesced trigger asks for another cycle
    fn finish_cycle(&mut self) -> bool {
        let mut state = self.state.lock();
        state.completed_cycles += 1;
        if state.pending {
            state.pending = false;
            true
        } else {
            state.in_flight = false;
            self.armed = false;
            false
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            state.in_flight = false;
            state.pending = false;
        }
    }
}

/// `Untitled Comic - 10/19/2026`
pub fn default_title() -> String {
    format!(
        "Untitled Comic - {}",
        chrono::Local::now().format("%-m/%-d/%Y")
    )
}

/// One persistence cycle against a snapshot taken at a single instant
async fn run_cycle(pipeline: &Mutex<Pipeline>, remote: &dyn ComicRemote) -> Result<SaveKind, EditorError> {
    let snapshot: Document = pipeline.lock().document().snapshot();

    match snapshot.id() {
        Some(id) => {
            let title = if snapshot.title.trim().is_empty() {
                default_title()
            } else {
                snapshot.title.clone()
            };
            let request = UpdateComicRequest::from_snapshot(id, title, &snapshot);

            match remote.update_comic(request).await {
                Ok(()) => {
                    tracing::info!(
                        comic_id = id,
                        version = snapshot.version,
                        tiles = snapshot.tile_count(),
                        "comic updated"
                    );
                    Ok(SaveKind::Update)
                }
                Err(error) => {
                    tracing::warn!(comic_id = id, error = ?error, "update failed, keeping local edits");
                    Err(error)
                }
            }
        }

        // First save of a brand-new comic: only a create can hand out the id
        None => {
            if snapshot.prompt.trim().is_empty() {
                return Err(EditorError::NoDocument);
            }

            let request = CreateComicRequest {
                title: Some(snapshot.title.clone()).filter(|t| !t.trim().is_empty()),
                prompt: snapshot.prompt.clone(),
            };
            let created = remote.create_comic(request).await.map_err(|error| {
                tracing::warn!(error = ?error, "create on first save failed");
                error
            })?;

            // Edits made while the create ran win over the server's copy
            let mut pipeline = pipeline.lock();
            let keep_title = !pipeline.document().title.trim().is_empty();
            let mutations = vec![
                Mutation::SetMetadata {
                    update: MetadataUpdate {
                        title: Some(created.title.clone()).filter(|_| !keep_title),
                        prompt: None,
                        story: Some(created.story.clone()),
                        inspiration: Some(created.inspiration.clone()),
                    },
                },
                // Tiles only become editable once the id exists
                Mutation::ReplaceTiles {
                    tiles: created.tiles.clone(),
                },
                Mutation::AssignId {
                    id: created.id.clone(),
                },
            ];
            pipeline.apply_batch(mutations)?;

            tracing::info!(comic_id = %created.id, "comic created on first save");
            Ok(SaveKind::Create)
        }
    }
}
