//! # Remote Store Contract
//!
//! The comic server as seen from the session: create, load, update,
//! regenerate one image, logout. Every response shares the same envelope, a
//! success flag plus an optional message shown verbatim when it is false.
//!
//! Implementations turn network and parse failures into
//! [`EditorError::Transport`] and `success: false` into
//! [`EditorError::RemoteRejection`]; callers never see raw envelopes.

use crate::document::{Document, MetadataUpdate, Tile};
use crate::errors::EditorError;
use crate::mutations::Mutation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote operations consumed by the session
#[async_trait]
pub trait ComicRemote: Send + Sync {
    /// Generate a comic from a prompt and store it server-side
    async fn create_comic(&self, request: CreateComicRequest) -> Result<CreatedComic, EditorError>;

    /// Fetch a stored comic by id
    async fn load_comic(&self, id: &str) -> Result<LoadedComic, EditorError>;

    /// Overwrite title and tiles of a stored comic
    async fn update_comic(&self, request: UpdateComicRequest) -> Result<(), EditorError>;

    /// Generate a new image for a scene, returning its URL
    async fn regenerate_image(&self, request: RegenerateImageRequest) -> Result<String, EditorError>;

    async fn logout(&self) -> Result<(), EditorError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateComicRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateComicRequest {
    pub comic_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<Tile>>,
}

impl UpdateComicRequest {
    /// Full-snapshot update: id, title and every tile in order
    pub fn from_snapshot(comic_id: &str, title: String, snapshot: &Document) -> Self {
        Self {
            comic_id: comic_id.to_string(),
            title: Some(title),
            tiles: Some(snapshot.tiles().to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerateImageRequest {
    pub scene: String,
}

/// Response of `POST /create-comic`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateComicResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub comic_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub inspiration: Option<String>,
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /load-comic/<id>`; carries `success` only on failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadComicResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub inspiration: Option<String>,
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope-only response (update, logout)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegenerateImageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A successfully created comic
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedComic {
    pub id: String,
    pub title: String,
    pub story: String,
    pub inspiration: String,
    pub tiles: Vec<Tile>,
}

impl CreatedComic {
    /// Mutations that install this comic into a document as one step
    pub fn install(&self, prompt: &str) -> Vec<Mutation> {
        vec![
            Mutation::SetMetadata {
                update: MetadataUpdate {
                    title: Some(self.title.clone()),
                    prompt: Some(prompt.to_string()),
                    story: Some(self.story.clone()),
                    inspiration: Some(self.inspiration.clone()),
                },
            },
            Mutation::ReplaceTiles {
                tiles: self.tiles.clone(),
            },
            Mutation::AssignId {
                id: self.id.clone(),
            },
        ]
    }
}

/// A comic fetched by id
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedComic {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub story: String,
    pub inspiration: String,
    pub tiles: Vec<Tile>,
}

impl LoadedComic {
    pub fn install(&self) -> Vec<Mutation> {
        vec![
            Mutation::SetMetadata {
                update: MetadataUpdate {
                    title: Some(self.title.clone()),
                    prompt: Some(self.prompt.clone()),
                    story: Some(self.story.clone()),
                    inspiration: Some(self.inspiration.clone()),
                },
            },
            Mutation::ReplaceTiles {
                tiles: self.tiles.clone(),
            },
            Mutation::AssignId {
                id: self.id.clone(),
            },
        ]
    }
}

impl CreateComicResponse {
    pub fn into_result(self) -> Result<CreatedComic, EditorError> {
        if !self.success {
            return Err(EditorError::rejected(self.message));
        }
        let id = self
            .comic_id
            .ok_or_else(|| EditorError::transport("create response without comic_id"))?;

        Ok(CreatedComic {
            id,
            title: self.title.unwrap_or_default(),
            story: self.story.unwrap_or_default(),
            inspiration: self.inspiration.unwrap_or_default(),
            tiles: self.tiles,
        })
    }
}

impl LoadComicResponse {
    /// `requested_id` fills in for servers that omit the id from the body
    pub fn into_result(self, requested_id: &str) -> Result<LoadedComic, EditorError> {
        if self.success == Some(false) {
            return Err(EditorError::rejected(self.message));
        }

        Ok(LoadedComic {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title.unwrap_or_default(),
            prompt: self.prompt.unwrap_or_default(),
            story: self.story.unwrap_or_default(),
            inspiration: self.inspiration.unwrap_or_default(),
            tiles: self.tiles,
        })
    }
}

impl AckResponse {
    pub fn into_result(self) -> Result<(), EditorError> {
        if self.success {
            Ok(())
        } else {
            Err(EditorError::rejected(self.message))
        }
    }
}

impl RegenerateImageResponse {
    pub fn into_result(self) -> Result<String, EditorError> {
        if !self.success {
            return Err(EditorError::rejected(self.message));
        }
        match self.image_url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(EditorError::transport("regenerate response without image_url")),
        }
    }
}
