//! # Document Model
//!
//! Core document abstraction for comic editing.
//!
//! A Document is the full comic under edit: metadata plus the ordered tile
//! sequence. It is the single source of truth for what the user sees; every
//! view (pages, previews, save payloads) is derived from it.
//!
//! ## Lifecycle
//!
//! ```text
//! Empty → Create/Load → Edit → Save → Discard
//!   ↓          ↓           ↓      ↓
//!  no id    id assigned  Mutations  snapshot upstream
//! ```
//!
//! A tile's position in `tiles` *is* its order; there is no order field that
//! could drift from the index.

use crate::mutations::{Mutation, MutationError, MutationResult};
use serde::{Deserialize, Serialize};

/// One comic panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// User-editable narrative caption
    #[serde(rename = "scene")]
    pub scene_text: String,

    /// URL or opaque handle of the generated image
    #[serde(rename = "image")]
    pub image_ref: String,
}

impl Tile {
    pub fn new(scene_text: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            scene_text: scene_text.into(),
            image_ref: image_ref.into(),
        }
    }
}

/// Partial metadata update; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspiration: Option<String>,
}

impl MetadataUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// The comic under edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Server identifier, absent until the first successful create
    id: Option<String>,

    pub title: String,

    /// Original user prompt, fixed once the document is bound to an id
    pub prompt: String,

    pub story: String,

    pub inspiration: String,

    tiles: Vec<Tile>,

    /// Current version number (increments on each applied mutation)
    pub version: u64,
}

impl Document {
    /// Empty document for a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Whether there is anything worth persisting
    pub fn exists(&self) -> bool {
        self.id.is_some() || !self.prompt.is_empty() || !self.tiles.is_empty()
    }

    /// Consistent copy for persistence; taken under the session lock
    pub fn snapshot(&self) -> Document {
        self.clone()
    }

    /// Apply a mutation
    ///
    /// The mutation is validated before anything changes, so a failed
    /// mutation leaves the document untouched and does not bump the version.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, MutationError> {
        mutation.apply(self)?;
        self.version += 1;

        Ok(MutationResult {
            version: self.version,
            tile_count: self.tiles.len(),
        })
    }

    /// Apply several mutations as one step: all of them or none
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<MutationResult, MutationError> {
        let mut staged = self.clone();
        for mutation in mutations {
            staged.apply(mutation)?;
        }
        *self = staged;

        Ok(MutationResult {
            version: self.version,
            tile_count: self.tiles.len(),
        })
    }

    pub fn set_tile_text(&mut self, index: usize, text: &str) -> Result<(), MutationError> {
        let count = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(MutationError::TileOutOfRange { index, count })?;
        tile.scene_text = text.to_string();
        Ok(())
    }

    pub fn set_tile_image(&mut self, index: usize, image_ref: &str) -> Result<(), MutationError> {
        let count = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(MutationError::TileOutOfRange { index, count })?;
        tile.image_ref = image_ref.to_string();
        Ok(())
    }

    /// Rearrange tiles so that position `i` holds the tile previously at `order[i]`
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), MutationError> {
        validate_permutation(order, self.tiles.len())?;

        let mut previous: Vec<Option<Tile>> = self.tiles.drain(..).map(Some).collect();
        self.tiles = order
            .iter()
            .filter_map(|&from| previous[from].take())
            .collect();
        Ok(())
    }

    pub fn replace_tiles(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
    }

    pub fn set_metadata(&mut self, update: &MetadataUpdate) -> Result<(), MutationError> {
        if let Some(prompt) = &update.prompt {
            if self.id.is_some() && *prompt != self.prompt {
                return Err(MutationError::PromptImmutable);
            }
        }

        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(prompt) = &update.prompt {
            self.prompt = prompt.clone();
        }
        if let Some(story) = &update.story {
            self.story = story.clone();
        }
        if let Some(inspiration) = &update.inspiration {
            self.inspiration = inspiration.clone();
        }
        Ok(())
    }

    /// Bind the document to its server id; happens exactly once
    pub fn assign_id(&mut self, id: &str) -> Result<(), MutationError> {
        match &self.id {
            Some(existing) => Err(MutationError::IdAlreadyAssigned(existing.clone())),
            None => {
                self.id = Some(id.to_string());
                Ok(())
            }
        }
    }
}

/// Check that `order` is a bijection over `0..count`
pub fn validate_permutation(order: &[usize], count: usize) -> Result<(), MutationError> {
    if order.len() != count {
        return Err(MutationError::InvalidPermutation(format!(
            "expected {} positions, got {}",
            count,
            order.len()
        )));
    }

    let mut seen = vec![false; count];
    for &index in order {
        match seen.get_mut(index) {
            None => {
                return Err(MutationError::InvalidPermutation(format!(
                    "index {} is outside 0..{}",
                    index, count
                )))
            }
            Some(true) => {
                return Err(MutationError::InvalidPermutation(format!(
                    "index {} appears more than once",
                    index
                )))
            }
            Some(slot) => *slot = true,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(n: usize) -> Document {
        let mut doc = Document::new();
        doc.replace_tiles(
            (0..n)
                .map(|i| Tile::new(format!("scene {}", i), format!("img-{}.png", i)))
                .collect(),
        );
        doc
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert_eq!(doc.id(), None);
        assert_eq!(doc.version, 0);
        assert_eq!(doc.tile_count(), 0);
        assert!(!doc.exists());
    }

    #[test]
    fn test_reorder_moves_tiles() {
        let mut doc = doc_with(3);
        doc.reorder(&[2, 0, 1]).unwrap();

        let scenes: Vec<_> = doc.tiles().iter().map(|t| t.scene_text.as_str()).collect();
        assert_eq!(scenes, vec!["scene 2", "scene 0", "scene 1"]);
    }

    #[test]
    fn test_reorder_rejects_duplicates_and_leaves_tiles() {
        let mut doc = doc_with(3);
        let before = doc.tiles().to_vec();

        let err = doc.reorder(&[0, 0, 1]).unwrap_err();
        assert!(matches!(err, MutationError::InvalidPermutation(_)));
        assert_eq!(doc.tiles(), before.as_slice());
    }

    #[test]
    fn test_reorder_rejects_wrong_length() {
        let mut doc = doc_with(3);
        assert!(doc.reorder(&[1, 0]).is_err());
        assert!(doc.reorder(&[1, 0, 2, 3]).is_err());
        assert!(doc.reorder(&[0, 1, 5]).is_err());
    }

    #[test]
    fn test_set_tile_text_out_of_range() {
        let mut doc = doc_with(2);
        let err = doc.set_tile_text(2, "nope").unwrap_err();
        assert_eq!(err, MutationError::TileOutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn test_assign_id_once() {
        let mut doc = Document::new();
        doc.assign_id("abc").unwrap();
        assert_eq!(doc.id(), Some("abc"));
        assert_eq!(
            doc.assign_id("def"),
            Err(MutationError::IdAlreadyAssigned("abc".to_string()))
        );
        assert_eq!(doc.id(), Some("abc"));
    }

    #[test]
    fn test_prompt_fixed_after_id() {
        let mut doc = Document::new();
        doc.set_metadata(&MetadataUpdate {
            prompt: Some("a cat in space".to_string()),
            ..MetadataUpdate::default()
        })
        .unwrap();
        doc.assign_id("abc").unwrap();

        let err = doc
            .set_metadata(&MetadataUpdate {
                prompt: Some("a dog".to_string()),
                ..MetadataUpdate::default()
            })
            .unwrap_err();
        assert_eq!(err, MutationError::PromptImmutable);
        assert_eq!(doc.prompt, "a cat in space");
    }

    #[test]
    fn test_apply_all_is_all_or_nothing() {
        let mut doc = doc_with(2);
        let before = doc.clone();

        let result = doc.apply_all(&[
            Mutation::SetTileText {
                index: 0,
                text: "changed".to_string(),
            },
            Mutation::SetTileText {
                index: 9,
                text: "boom".to_string(),
            },
        ]);

        assert!(result.is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_tile_wire_names() {
        let tile = Tile::new("A hero rises", "https://img/1.png");
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["scene"], "A hero rises");
        assert_eq!(json["image"], "https://img/1.png");
    }
}
