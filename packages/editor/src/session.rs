//! # Comic Editing Session
//!
//! One session edits one comic. It owns the document pipeline, the
//! persistence synchronizer, the autosave timer and the notification
//! surface, and exposes the mutation channel every edit goes through.
//!
//! A session is cheap to clone; clones share the same state. Locks are only
//! held for synchronous sections, never across a remote call, so edits made
//! while a request is in flight land in the next snapshot.

use crate::autosave::{Autosave, DEFAULT_AUTOSAVE_INTERVAL};
use crate::document::{Document, MetadataUpdate, Tile};
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationError};
use crate::notifications::{Notifier, DEFAULT_NOTIFICATION_TTL};
use crate::pagination::{PageInfo, DEFAULT_PAGE_SIZE};
use crate::pipeline::Pipeline;
use crate::preview::ComicPreview;
use crate::remote::{ComicRemote, CreateComicRequest, RegenerateImageRequest};
use crate::synchronizer::{PersistenceSynchronizer, SaveTrigger, SyncOutcome};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub autosave_interval: Duration,
    pub page_size: usize,
    pub notification_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

struct Shared {
    pipeline: Mutex<Pipeline>,
    remote: Arc<dyn ComicRemote>,
    sync: PersistenceSynchronizer,
    notifier: Notifier,
    autosave: Mutex<Autosave>,
    /// Set while `create` waits for the server
    creating: AtomicBool,
}

/// Clears the creating flag when `create` returns or is dropped
struct Creating<'a>(&'a AtomicBool);

impl Drop for Creating<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Editing session for a single comic
#[derive(Clone)]
pub struct ComicSession {
    shared: Arc<Shared>,
}

impl ComicSession {
    pub fn new(remote: Arc<dyn ComicRemote>, config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                pipeline: Mutex::new(Pipeline::new(Document::new(), config.page_size)),
                remote,
                sync: PersistenceSynchronizer::new(),
                notifier: Notifier::new(config.notification_ttl),
                autosave: Mutex::new(Autosave::new(config.autosave_interval)),
                creating: AtomicBool::new(false),
            }),
        }
    }

    /// Start a session on an existing comic
    pub async fn open(
        remote: Arc<dyn ComicRemote>,
        config: SessionConfig,
        id: &str,
    ) -> Result<Self, EditorError> {
        let session = Self::new(remote, config);
        session.load(id).await?;
        Ok(session)
    }

    // ========================================================================
    // Mutation channel
    // ========================================================================

    /// Ask the server to generate a comic from `prompt` and install it
    ///
    /// On failure the document is left exactly as it was.
    pub async fn create(&self, prompt: &str, title: Option<&str>) -> Result<(), EditorError> {
        let claimed = {
            let pipeline = self.shared.pipeline.lock();
            let claimed = match pipeline.document().id() {
                Some(id) => Err(EditorError::AlreadyCreated(id.to_string())),
                None if prompt.trim().is_empty() => Err(MutationError::EmptyPrompt.into()),
                // A first save that is still running is a create too
                None if self.shared.sync.is_in_flight()
                    || self.shared.creating.swap(true, Ordering::SeqCst) =>
                {
                    Err(EditorError::CreateInProgress)
                }
                None => Ok(Creating(&self.shared.creating)),
            };
            claimed
        };
        let _creating = match claimed {
            Ok(guard) => guard,
            Err(error) => {
                self.shared.notifier.error(error.user_message());
                return Err(error);
            }
        };

        let request = CreateComicRequest {
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            prompt: prompt.to_string(),
        };

        let installed = match self.shared.remote.create_comic(request).await {
            Ok(created) => {
                let result = self
                    .shared
                    .pipeline
                    .lock()
                    .apply_batch(created.install(prompt));
                result.map(|_| created.id).map_err(EditorError::from)
            }
            Err(error) => Err(error),
        };

        match installed {
            Ok(id) => {
                tracing::info!(comic_id = %id, "comic created");
                self.shared.notifier.success("Comic created successfully!");
                self.start_autosave();
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = ?error, "create failed");
                self.shared.notifier.error(error.user_message());
                Err(error)
            }
        }
    }

    /// Fetch a comic by id and install it as this session's document
    pub async fn load(&self, id: &str) -> Result<(), EditorError> {
        if let Some(existing) = self.shared.pipeline.lock().document().id() {
            let error = EditorError::AlreadyCreated(existing.to_string());
            self.shared.notifier.error(error.user_message());
            return Err(error);
        }

        let installed = match self.shared.remote.load_comic(id).await {
            Ok(loaded) if loaded.id != id => Err(EditorError::NotLoaded(id.to_string())),
            Ok(loaded) => self
                .shared
                .pipeline
                .lock()
                .apply_batch(loaded.install())
                .map(|_| ())
                .map_err(EditorError::from),
            Err(error) => Err(error),
        };

        match installed {
            Ok(()) => {
                tracing::info!(comic_id = id, "comic loaded");
                self.start_autosave();
                Ok(())
            }
            Err(error) => {
                tracing::warn!(comic_id = id, error = ?error, "load failed");
                self.shared.notifier.error(error.user_message());
                Err(error)
            }
        }
    }

    /// Prepare a comic locally; the first save will create it on the server
    pub fn set_draft(&self, prompt: &str, title: Option<&str>) -> Result<(), EditorError> {
        self.apply(Mutation::SetMetadata {
            update: MetadataUpdate {
                title: title.map(str::to_string),
                prompt: Some(prompt.to_string()),
                ..MetadataUpdate::default()
            },
        })
        .map(|_| ())
    }

    pub fn set_title(&self, title: &str) -> Result<(), EditorError> {
        self.apply(Mutation::SetMetadata {
            update: MetadataUpdate::title(title),
        })
        .map(|_| ())
    }

    /// Replace the caption of the tile at `index`
    pub fn edit_text(&self, index: usize, text: &str) -> Result<(), EditorError> {
        self.apply(Mutation::SetTileText {
            index,
            text: text.to_string(),
        })
        .map(|_| ())
    }

    /// Apply a full permutation; `order[i]` is the old index of the tile now at `i`
    ///
    /// A valid reorder always requests a save.
    pub async fn reorder(&self, order: Vec<usize>) -> Result<SyncOutcome, EditorError> {
        let wants_save = self.apply(Mutation::Reorder { order })?;
        if wants_save {
            Ok(self.trigger_save(SaveTrigger::Reorder).await)
        } else {
            Ok(SyncOutcome::Skipped)
        }
    }

    /// Generate a new image for the tile at `index` from its current caption
    ///
    /// Only that tile's image changes, and only on success. Other tiles keep
    /// whatever they held, including edits made while the request ran.
    pub async fn regenerate_image(&self, index: usize) -> Result<String, EditorError> {
        let scene = {
            let pipeline = self.shared.pipeline.lock();
            let doc = pipeline.document();
            doc.tile(index)
                .map(|tile| tile.scene_text.clone())
                .ok_or(MutationError::TileOutOfRange {
                    index,
                    count: doc.tile_count(),
                })
        };
        let scene = match scene {
            Ok(scene) => scene,
            Err(error) => {
                let error = EditorError::from(error);
                self.shared.notifier.error(error.user_message());
                return Err(error);
            }
        };

        let result = match self
            .shared
            .remote
            .regenerate_image(RegenerateImageRequest { scene })
            .await
        {
            Ok(image_ref) => self
                .shared
                .pipeline
                .lock()
                .apply_mutation(Mutation::SetTileImage {
                    index,
                    image_ref: image_ref.clone(),
                })
                .map(|_| image_ref)
                .map_err(EditorError::from),
            Err(error) => Err(error),
        };

        match result {
            Ok(image_ref) => {
                tracing::info!(tile = index, "image regenerated");
                self.shared
                    .notifier
                    .success(format!("Image regenerated for tile {}", index + 1));
                Ok(image_ref)
            }
            Err(source) => {
                let error = EditorError::Regeneration {
                    index,
                    source: Box::new(source),
                };
                tracing::warn!(tile = index, error = %error, "regeneration failed");
                self.shared.notifier.error(error.user_message());
                Err(error)
            }
        }
    }

    /// Explicit save request
    pub async fn save(&self) -> SyncOutcome {
        self.trigger_save(SaveTrigger::Explicit).await
    }

    /// Returns whether the mutation asked for a save
    fn apply(&self, mutation: Mutation) -> Result<bool, EditorError> {
        let result = self.shared.pipeline.lock().apply_mutation(mutation);
        match result {
            Ok(result) => Ok(result.wants_save()),
            Err(error) => {
                let error = EditorError::from(error);
                self.shared.notifier.error(error.user_message());
                Err(error)
            }
        }
    }

    async fn trigger_save(&self, trigger: SaveTrigger) -> SyncOutcome {
        let had_id = self.shared.pipeline.lock().document().id().is_some();
        let outcome = save_now(&self.shared, trigger).await;

        // A first save that created the comic makes it editable
        if !had_id && self.shared.pipeline.lock().document().id().is_some() {
            self.start_autosave();
        }
        outcome
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Immutable copy of the current document
    pub fn snapshot(&self) -> Document {
        self.shared.pipeline.lock().document().snapshot()
    }

    pub fn page_info(&self) -> PageInfo {
        self.shared.pipeline.lock().page_info()
    }

    pub fn visible_tiles(&self) -> Vec<Tile> {
        self.shared.pipeline.lock().visible_tiles()
    }

    /// Move by `delta` pages, clamped; returns the new 1-based page
    pub fn change_page(&self, delta: isize) -> usize {
        self.shared.pipeline.lock().change_page(delta)
    }

    pub fn preview(&self) -> ComicPreview {
        ComicPreview::from_document(self.shared.pipeline.lock().document())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.shared.notifier
    }

    pub fn synchronizer(&self) -> &PersistenceSynchronizer {
        &self.shared.sync
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Returns false if autosave was already running
    pub fn start_autosave(&self) -> bool {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        self.shared.autosave.lock().start(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(shared) => {
                        save_now(&shared, SaveTrigger::Autosave).await;
                        true
                    }
                    None => false,
                }
            }
        })
    }

    pub fn stop_autosave(&self) -> bool {
        self.shared.autosave.lock().stop()
    }

    pub fn is_autosave_running(&self) -> bool {
        self.shared.autosave.lock().is_running()
    }

    /// Stop background work; the document stays readable
    pub fn end(&self) {
        if self.stop_autosave() {
            tracing::debug!("session ended");
        }
    }

    /// End the session and sign out of the server
    pub async fn logout(&self) -> Result<(), EditorError> {
        self.end();
        match self.shared.remote.logout().await {
            Ok(()) => {
                self.shared.notifier.success("Logged out");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = ?error, "logout failed");
                self.shared.notifier.error(error.user_message());
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for ComicSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pipeline = self.shared.pipeline.lock();
        f.debug_struct("ComicSession")
            .field("comic_id", &pipeline.document().id())
            .field("version", &pipeline.document().version)
            .field("in_flight", &self.shared.sync.is_in_flight())
            .finish()
    }
}

async fn save_now(shared: &Shared, trigger: SaveTrigger) -> SyncOutcome {
    shared
        .sync
        .trigger(trigger, &shared.pipeline, shared.remote.as_ref(), &shared.notifier)
        .await
}
