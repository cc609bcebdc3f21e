//! Read-only rendering of the whole comic
//!
//! Built from a document snapshot; shows every tile regardless of the
//! current page.

use crate::document::Document;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTile {
    /// 1-based reading position
    pub number: usize,
    pub scene: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComicPreview {
    pub title: String,
    pub story: String,
    pub inspiration: String,
    pub tiles: Vec<PreviewTile>,
}

impl ComicPreview {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            story: doc.story.clone(),
            inspiration: doc.inspiration.clone(),
            tiles: doc
                .tiles()
                .iter()
                .enumerate()
                .map(|(i, tile)| PreviewTile {
                    number: i + 1,
                    scene: tile.scene_text.clone(),
                    image: tile.image_ref.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for ComicPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        };
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f)?;
        writeln!(f, "Story")?;
        writeln!(f, "  {}", self.story)?;
        writeln!(f)?;
        writeln!(f, "Inspiration")?;
        writeln!(f, "  {}", self.inspiration)?;
        writeln!(f)?;
        writeln!(f, "Tiles")?;
        for tile in &self.tiles {
            writeln!(f, "  Tile {}", tile.number)?;
            writeln!(f, "    {}", tile.scene)?;
            writeln!(f, "    [{}]", tile.image)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MetadataUpdate, Tile};

    #[test]
    fn test_preview_numbers_tiles_in_order() {
        let mut doc = Document::new();
        doc.set_metadata(&MetadataUpdate {
            title: Some("Space Cats".to_string()),
            story: Some("Cats go to space.".to_string()),
            inspiration: Some("Laika".to_string()),
            ..MetadataUpdate::default()
        })
        .unwrap();
        doc.replace_tiles(vec![Tile::new("Launch", "a.png"), Tile::new("Orbit", "b.png")]);
        doc.reorder(&[1, 0]).unwrap();

        let preview = ComicPreview::from_document(&doc);
        assert_eq!(preview.tiles[0].number, 1);
        assert_eq!(preview.tiles[0].scene, "Orbit");

        let text = preview.to_string();
        assert!(text.starts_with("Space Cats\n==========\n"));
        assert!(text.contains("  Tile 2\n    Launch\n    [a.png]\n"));
    }

    #[test]
    fn test_untitled_preview() {
        let text = ComicPreview::from_document(&Document::new()).to_string();
        assert!(text.starts_with("(untitled)\n"));
    }
}
