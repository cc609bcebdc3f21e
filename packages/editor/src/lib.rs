//! # Comic Editor
//!
//! Client-side editing session for AI-generated comics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dispatcher: keys, buttons, drag-end         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: mutation channel                   │
//! │  - create / load / edit / reorder           │
//! │  - regenerate one tile image                │
//! │  - autosave lifecycle                       │
//! └─────────────────────────────────────────────┘
//!           ↓                          ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ pipeline             │  │ synchronizer         │
//! │  document → pages    │  │  one request in      │
//! │  post-effects        │  │  flight, coalescing  │
//! └──────────────────────┘  └──────────────────────┘
//!                                      ↓
//!                           ┌──────────────────────┐
//!                           │ remote: HTTP store   │
//!                           └──────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: pages and previews are derived views
//! 2. **Position is order**: a tile's index is its reading order
//! 3. **No lost edits**: a failed save never rolls the document back
//! 4. **Snapshots**: every request carries state read at a single instant
//!
//! ## Usage
//!
//! ```rust,ignore
//! use comic_editor::{ComicSession, CommandDispatcher, HttpRemote, RemoteConfig, SessionConfig};
//! use std::sync::Arc;
//!
//! let remote = Arc::new(HttpRemote::new(RemoteConfig::default())?);
//! let session = ComicSession::new(remote, SessionConfig::default());
//!
//! session.create("A cat learns to fly", None).await?;
//! session.edit_text(0, "The cat looks up.")?;
//! session.regenerate_image(0).await?;
//!
//! let dispatcher = CommandDispatcher::new();
//! dispatcher.drag_end(&session, &[1, 0, 2, 3, 4]).await?;
//! session.save().await;
//! ```

mod autosave;
mod dispatcher;
mod document;
mod errors;
mod http;
mod mutations;
mod notifications;
mod pagination;
mod pipeline;
mod post_effects;
mod preview;
mod remote;
mod session;
mod synchronizer;

pub use autosave::{Autosave, DEFAULT_AUTOSAVE_INTERVAL};
pub use dispatcher::{
    derive_permutation, Action, ActionOutcome, Command, CommandDispatcher, KeyChord, KeyOutcome,
    Modifiers,
};
pub use document::{validate_permutation, Document, MetadataUpdate, Tile};
pub use errors::{EditorError, ErrorKind, GENERIC_FAILURE_MESSAGE};
pub use http::{HttpRemote, RemoteConfig, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVER_URL};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use notifications::{Notification, NotificationKind, Notifier, DEFAULT_NOTIFICATION_TTL};
pub use pagination::{compute_pages, total_pages, PageInfo, PaginationView, DEFAULT_PAGE_SIZE};
pub use pipeline::{Pipeline, PipelineResult};
pub use post_effects::{PostEffect, PostEffectEngine, SessionEffect};
pub use preview::{ComicPreview, PreviewTile};
pub use remote::{
    AckResponse, ComicRemote, CreateComicRequest, CreateComicResponse, CreatedComic,
    LoadComicResponse, LoadedComic, RegenerateImageRequest, RegenerateImageResponse,
    UpdateComicRequest,
};
pub use session::{ComicSession, SessionConfig};
pub use synchronizer::{
    default_title, PersistenceSynchronizer, SaveKind, SaveTrigger, SyncOutcome,
};
