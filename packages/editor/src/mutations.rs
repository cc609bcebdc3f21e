//! # Tile Mutations
//!
//! The only operations that may change a [`Document`].
//!
//! ## Mutation Semantics
//!
//! ### SetTileText / SetTileImage
//! - Atomic replacement of one field of one tile
//! - Targets an index; other tiles are never touched
//!
//! ### Reorder
//! - A permutation of the existing sequence
//! - Rejected unless it is a bijection over the current tile count, so a
//!   corrupted drag can neither drop nor duplicate a tile
//!
//! ### ReplaceTiles / SetMetadata / AssignId
//! - Used when a create or load response installs a whole document
//! - `AssignId` succeeds once per document

use crate::document::{Document, MetadataUpdate, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations on a comic document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Replace the caption of one tile
    SetTileText { index: usize, text: String },

    /// Replace the image reference of one tile
    SetTileImage { index: usize, image_ref: String },

    /// `order[i]` is the previous index of the tile that ends up at `i`
    Reorder { order: Vec<usize> },

    /// Swap in a whole new tile sequence
    ReplaceTiles { tiles: Vec<Tile> },

    /// Update title, prompt, story or inspiration
    SetMetadata { update: MetadataUpdate },

    /// Bind the document to its server id
    AssignId { id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Tile {index} out of range (comic has {count} tiles)")]
    TileOutOfRange { index: usize, count: usize },

    #[error("Prompt cannot change after the comic was created")]
    PromptImmutable,

    #[error("Comic already has id {0}")]
    IdAlreadyAssigned(String),

    #[error("Prompt must not be empty")]
    EmptyPrompt,
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::SetTileText { index, text } => doc.set_tile_text(*index, text),
            Mutation::SetTileImage { index, image_ref } => doc.set_tile_image(*index, image_ref),
            Mutation::Reorder { order } => doc.reorder(order),
            Mutation::ReplaceTiles { tiles } => {
                doc.replace_tiles(tiles.clone());
                Ok(())
            }
            Mutation::SetMetadata { update } => doc.set_metadata(update),
            Mutation::AssignId { id } => doc.assign_id(id),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::SetTileText { index, .. } | Mutation::SetTileImage { index, .. } => {
                if *index >= doc.tile_count() {
                    return Err(MutationError::TileOutOfRange {
                        index: *index,
                        count: doc.tile_count(),
                    });
                }
                Ok(())
            }

            Mutation::Reorder { order } => {
                crate::document::validate_permutation(order, doc.tile_count())
            }

            Mutation::ReplaceTiles { .. } => Ok(()),

            Mutation::SetMetadata { update } => match &update.prompt {
                Some(prompt) if doc.id().is_some() && *prompt != doc.prompt => {
                    Err(MutationError::PromptImmutable)
                }
                _ => Ok(()),
            },

            Mutation::AssignId { .. } => match doc.id() {
                Some(existing) => Err(MutationError::IdAlreadyAssigned(existing.to_string())),
                None => Ok(()),
            },
        }
    }

    /// Whether this mutation changes the length or order of the tile sequence
    pub fn reshapes_tiles(&self) -> bool {
        matches!(self, Mutation::Reorder { .. } | Mutation::ReplaceTiles { .. })
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Tile count after the mutation
    pub tile_count: usize,
}
