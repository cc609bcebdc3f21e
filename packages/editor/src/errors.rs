//! Error types for the editor

use crate::mutations::MutationError;
use thiserror::Error;

/// Message shown for failures the server never explained
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Validation error: {0}")]
    Validation(#[from] MutationError),

    /// Server answered with `success: false`; the message is shown verbatim
    #[error("{0}")]
    RemoteRejection(String),

    /// No response, non-2xx without a parseable body, or a malformed body
    #[error("An error occurred. Please try again.")]
    Transport { detail: String },

    #[error("Failed to regenerate image for tile {}: {source}", .index + 1)]
    Regeneration {
        index: usize,
        #[source]
        source: Box<EditorError>,
    },

    #[error("There is no comic to save yet")]
    NoDocument,

    #[error("Comic already created (id {0})")]
    AlreadyCreated(String),

    #[error("Comic {0} is not loaded in this session")]
    NotLoaded(String),

    #[error("A comic is already being created")]
    CreateInProgress,
}

/// Coarse classification of an [`EditorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    RemoteRejection,
    Transport,
    PartialRegeneration,
    Lifecycle,
}

impl EditorError {
    pub fn transport(detail: impl Into<String>) -> Self {
        EditorError::Transport {
            detail: detail.into(),
        }
    }

    /// Rejection carrying the server's message, or the generic one if it sent none
    pub fn rejected(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => EditorError::RemoteRejection(message),
            _ => EditorError::RemoteRejection(GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Validation(_) => ErrorKind::Validation,
            EditorError::RemoteRejection(_) => ErrorKind::RemoteRejection,
            EditorError::Transport { .. } => ErrorKind::Transport,
            EditorError::Regeneration { .. } => ErrorKind::PartialRegeneration,
            EditorError::NoDocument
            | EditorError::AlreadyCreated(_)
            | EditorError::NotLoaded(_)
            | EditorError::CreateInProgress => ErrorKind::Lifecycle,
        }
    }

    /// Text for the transient error banner
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Regeneration { source, .. } => match source.as_ref() {
                EditorError::RemoteRejection(message) => message.clone(),
                _ => "Failed to regenerate image. Please try again.".to_string(),
            },
            other => other.to_string(),
        }
    }
}
