//! # Post-Effect System
//!
//! Mutations trigger follow-up work outside the document itself.
//!
//! ## Design
//!
//! Applying a mutation may require the session to do more than change the
//! tile sequence. For example:
//! - Reordering tiles → persist immediately (a lost reorder is very visible)
//! - Replacing or reordering tiles → recompute the pagination view
//!
//! Post-effects are:
//! - **Deterministic**: Same mutation always produces same effects
//! - **Deduplicated**: Each effect is reported at most once per mutation
//! - **Declarative**: The pipeline and session decide how to carry them out

use crate::document::Document;
use crate::mutations::Mutation;

/// Work the session must do after a mutation landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Tile count or order changed
    RecomputePages,

    /// Start a persistence cycle right away
    RequestSave,
}

/// Post-effect that can be triggered by a mutation
pub trait PostEffect: std::fmt::Debug + Send + Sync {
    /// Analyze the applied mutation and report follow-up effects
    fn analyze(&self, mutation: &Mutation, doc: &Document) -> Vec<SessionEffect>;
}

/// Keep the page window in step with the sequence
#[derive(Debug)]
pub struct RepaginateOnReshape;

impl PostEffect for RepaginateOnReshape {
    fn analyze(&self, mutation: &Mutation, _doc: &Document) -> Vec<SessionEffect> {
        if mutation.reshapes_tiles() {
            vec![SessionEffect::RecomputePages]
        } else {
            vec![]
        }
    }
}

/// Reorders are saved straight away
#[derive(Debug)]
pub struct SaveAfterReorder;

impl PostEffect for SaveAfterReorder {
    fn analyze(&self, mutation: &Mutation, _doc: &Document) -> Vec<SessionEffect> {
        match mutation {
            Mutation::Reorder { .. } => vec![SessionEffect::RequestSave],
            _ => vec![],
        }
    }
}

/// Post-effect engine that runs all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(RepaginateOnReshape), Box::new(SaveAfterReorder)],
        }
    }

    /// Collect the effects of an applied mutation
    pub fn analyze(&self, mutation: &Mutation, doc: &Document) -> Vec<SessionEffect> {
        let mut effects: Vec<SessionEffect> = Vec::new();

        for effect in &self.effects {
            for produced in effect.analyze(mutation, doc) {
                if !effects.contains(&produced) {
                    effects.push(produced);
                }
            }
        }

        effects
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tile;

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.effects.len(), 2);
    }

    #[test]
    fn test_text_edit_has_no_effects() {
        let engine = PostEffectEngine::new();
        let doc = Document::new();

        let effects = engine.analyze(
            &Mutation::SetTileText {
                index: 0,
                text: "hi".to_string(),
            },
            &doc,
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_reorder_repaginates_and_saves() {
        let engine = PostEffectEngine::new();
        let doc = Document::new();

        let effects = engine.analyze(&Mutation::Reorder { order: vec![1, 0] }, &doc);
        assert_eq!(
            effects,
            vec![SessionEffect::RecomputePages, SessionEffect::RequestSave]
        );
    }

    #[test]
    fn test_replace_tiles_only_repaginates() {
        let engine = PostEffectEngine::new();
        let doc = Document::new();

        let effects = engine.analyze(
            &Mutation::ReplaceTiles {
                tiles: vec![Tile::new("a", "b")],
            },
            &doc,
        );
        assert_eq!(effects, vec![SessionEffect::RecomputePages]);
    }
}
