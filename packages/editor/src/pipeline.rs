//! # Editing Pipeline
//!
//! Coordinates one step of the edit lifecycle: Mutate → Effects → Repaginate
//!
//! The Pipeline owns:
//! - The document (source of truth)
//! - The pagination view derived from it
//! - The post-effect engine that decides what follows a mutation

use crate::document::{Document, Tile};
use crate::mutations::{Mutation, MutationError};
use crate::pagination::{PageInfo, PaginationView};
use crate::post_effects::{PostEffectEngine, SessionEffect};

/// Manages the document → page view pipeline
#[derive(Debug)]
pub struct Pipeline {
    document: Document,
    pages: PaginationView,
    effects: PostEffectEngine,
}

impl Pipeline {
    /// Create pipeline for document
    pub fn new(document: Document, page_size: usize) -> Self {
        let mut pages = PaginationView::new(page_size);
        pages.recompute(document.tile_count());

        Self {
            document,
            pages,
            effects: PostEffectEngine::new(),
        }
    }

    /// Apply mutation and carry out view effects
    ///
    /// This:
    /// 1. Applies the mutation (or nothing, on error)
    /// 2. Collects post-effects
    /// 3. Recomputes pages when the sequence was reshaped
    /// 4. Returns the effects the session still has to act on
    pub fn apply_mutation(&mut self, mutation: Mutation) -> Result<PipelineResult, MutationError> {
        let result = self.document.apply(&mutation)?;
        let effects = self.effects.analyze(&mutation, &self.document);
        self.settle(&effects);

        tracing::debug!(
            version = result.version,
            tiles = result.tile_count,
            ?mutation,
            "mutation applied"
        );

        Ok(PipelineResult {
            version: result.version,
            effects,
        })
    }

    /// Apply a group of mutations atomically (create and load responses)
    pub fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<PipelineResult, MutationError> {
        let result = self.document.apply_all(&mutations)?;

        let mut effects = Vec::new();
        for mutation in &mutations {
            for effect in self.effects.analyze(mutation, &self.document) {
                if !effects.contains(&effect) {
                    effects.push(effect);
                }
            }
        }
        self.settle(&effects);

        Ok(PipelineResult {
            version: result.version,
            effects,
        })
    }

    /// Get current document
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_info(&self) -> PageInfo {
        self.pages.info()
    }

    pub fn visible_tiles(&self) -> Vec<Tile> {
        self.pages.visible(self.document.tiles()).to_vec()
    }

    /// Pure view navigation; never touches the document
    pub fn change_page(&mut self, delta: isize) -> usize {
        self.pages.change_page(delta)
    }

    fn settle(&mut self, effects: &[SessionEffect]) {
        if effects.contains(&SessionEffect::RecomputePages) {
            self.pages.recompute(self.document.tile_count());
        }
    }
}

/// Result of pipeline execution
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// New version number
    pub version: u64,

    /// Effects produced by the mutation(s)
    pub effects: Vec<SessionEffect>,
}

impl PipelineResult {
    pub fn wants_save(&self) -> bool {
        self.effects.contains(&SessionEffect::RequestSave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(n: usize) -> Vec<Tile> {
        (0..n)
            .map(|i| Tile::new(format!("scene {}", i), format!("{}.png", i)))
            .collect()
    }

    #[test]
    fn test_pipeline_initial_pages() {
        let mut doc = Document::new();
        doc.replace_tiles(tiles(12));

        let pipeline = Pipeline::new(doc, 5);
        let info = pipeline.page_info();
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.current_page, 1);
        assert_eq!(pipeline.visible_tiles().len(), 5);
    }

    #[test]
    fn test_pipeline_mutation_increments_version() {
        let mut doc = Document::new();
        doc.replace_tiles(tiles(2));
        let mut pipeline = Pipeline::new(doc, 5);

        let result = pipeline
            .apply_mutation(Mutation::SetTileText {
                index: 0,
                text: "Hello".to_string(),
            })
            .unwrap();

        assert_eq!(result.version, 1);
        assert!(!result.wants_save());
        assert_eq!(pipeline.document().version, 1);
    }

    #[test]
    fn test_replace_tiles_clamps_page() {
        let mut doc = Document::new();
        doc.replace_tiles(tiles(12));
        let mut pipeline = Pipeline::new(doc, 5);
        pipeline.change_page(2);
        assert_eq!(pipeline.page_info().current_page, 3);

        pipeline
            .apply_mutation(Mutation::ReplaceTiles { tiles: tiles(4) })
            .unwrap();
        assert_eq!(pipeline.page_info().current_page, 1);
        assert_eq!(pipeline.page_info().total_pages, 1);
    }

    #[test]
    fn test_reorder_requests_save() {
        let mut doc = Document::new();
        doc.replace_tiles(tiles(3));
        let mut pipeline = Pipeline::new(doc, 5);

        let result = pipeline
            .apply_mutation(Mutation::Reorder {
                order: vec![1, 2, 0],
            })
            .unwrap();
        assert!(result.wants_save());
    }

    #[test]
    fn test_failed_batch_changes_nothing() {
        let mut pipeline = Pipeline::new(Document::new(), 5);

        let result = pipeline.apply_batch(vec![
            Mutation::ReplaceTiles { tiles: tiles(3) },
            Mutation::SetTileText {
                index: 7,
                text: "x".to_string(),
            },
        ]);

        assert!(result.is_err());
        assert_eq!(pipeline.document().tile_count(), 0);
        assert_eq!(pipeline.document().version, 0);
    }
}
