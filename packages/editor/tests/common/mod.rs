//! Shared fixtures for the editor integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use comic_editor::{
    ComicRemote, ComicSession, CreateComicRequest, CreatedComic, EditorError, LoadedComic,
    RegenerateImageRequest, SessionConfig, Tile, UpdateComicRequest,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CreateComicRequest),
    Load(String),
    Update(UpdateComicRequest),
    Regenerate(RegenerateImageRequest),
    Logout,
}

/// In-memory comic server that records every request
///
/// Creates, updates and regenerations can be held at a gate so tests control exactly
/// when an in-flight request completes.
#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<Call>>,
    tile_count: Mutex<usize>,
    create_gate: Mutex<Option<Arc<Semaphore>>>,
    update_gate: Mutex<Option<Arc<Semaphore>>>,
    regenerate_gate: Mutex<Option<Arc<Semaphore>>>,
    create_failures: Mutex<VecDeque<EditorError>>,
    update_failures: Mutex<VecDeque<EditorError>>,
    regenerate_failures: Mutex<VecDeque<EditorError>>,
    images_issued: Mutex<usize>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tile_count: Mutex::new(3),
            ..Self::default()
        })
    }

    pub fn with_tiles(count: usize) -> Arc<Self> {
        let remote = Self::new();
        *remote.tile_count.lock() = count;
        remote
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn updates(&self) -> Vec<UpdateComicRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Update(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<CreateComicRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Create(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn regenerations(&self) -> Vec<RegenerateImageRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Regenerate(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Hold every create until [`FakeRemote::release_creates`]
    pub fn gate_creates(&self) {
        *self.create_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_creates(&self, count: usize) {
        if let Some(gate) = self.create_gate.lock().as_ref() {
            gate.add_permits(count);
        }
    }

    /// Hold every update until [`FakeRemote::release_updates`]
    pub fn gate_updates(&self) {
        *self.update_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_updates(&self, count: usize) {
        if let Some(gate) = self.update_gate.lock().as_ref() {
            gate.add_permits(count);
        }
    }

    pub fn gate_regenerations(&self) {
        *self.regenerate_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_regenerations(&self, count: usize) {
        if let Some(gate) = self.regenerate_gate.lock().as_ref() {
            gate.add_permits(count);
        }
    }

    pub fn fail_next_create(&self, error: EditorError) {
        self.create_failures.lock().push_back(error);
    }

    pub fn fail_next_update(&self, error: EditorError) {
        self.update_failures.lock().push_back(error);
    }

    pub fn fail_next_regeneration(&self, error: EditorError) {
        self.regenerate_failures.lock().push_back(error);
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn tiles(&self) -> Vec<Tile> {
        let count = *self.tile_count.lock();
        (1..=count)
            .map(|n| Tile::new(format!("Scene {}", n), format!("img-{}.png", n)))
            .collect()
    }
}

async fn pass(gate: &Mutex<Option<Arc<Semaphore>>>) {
    let gate = gate.lock().clone();
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

#[async_trait]
impl ComicRemote for FakeRemote {
    async fn create_comic(&self, request: CreateComicRequest) -> Result<CreatedComic, EditorError> {
        let title = request
            .title
            .clone()
            .unwrap_or_else(|| "Generated Title".to_string());
        self.record(Call::Create(request));
        pass(&self.create_gate).await;

        if let Some(error) = self.create_failures.lock().pop_front() {
            return Err(error);
        }

        Ok(CreatedComic {
            id: "comic-1".to_string(),
            title,
            story: "Once upon a time".to_string(),
            inspiration: "Old cartoons".to_string(),
            tiles: self.tiles(),
        })
    }

    async fn load_comic(&self, id: &str) -> Result<LoadedComic, EditorError> {
        self.record(Call::Load(id.to_string()));

        if id == "missing" {
            return Err(EditorError::rejected(Some("Comic not found".to_string())));
        }

        Ok(LoadedComic {
            id: id.to_string(),
            title: "Loaded Comic".to_string(),
            prompt: "A loaded prompt".to_string(),
            story: "Story".to_string(),
            inspiration: "Inspiration".to_string(),
            tiles: self.tiles(),
        })
    }

    async fn update_comic(&self, request: UpdateComicRequest) -> Result<(), EditorError> {
        self.record(Call::Update(request));
        pass(&self.update_gate).await;

        match self.update_failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn regenerate_image(&self, request: RegenerateImageRequest) -> Result<String, EditorError> {
        self.record(Call::Regenerate(request));
        pass(&self.regenerate_gate).await;

        if let Some(error) = self.regenerate_failures.lock().pop_front() {
            return Err(error);
        }

        let mut issued = self.images_issued.lock();
        *issued += 1;
        Ok(format!("regenerated-{}.png", *issued))
    }

    async fn logout(&self) -> Result<(), EditorError> {
        self.record(Call::Logout);
        Ok(())
    }
}

/// Long interval so autosave never fires unless a test advances time
pub fn test_config() -> SessionConfig {
    SessionConfig {
        autosave_interval: Duration::from_secs(60),
        ..SessionConfig::default()
    }
}

pub fn session_with(remote: &Arc<FakeRemote>) -> ComicSession {
    let remote: Arc<dyn ComicRemote> = remote.clone();
    ComicSession::new(remote, test_config())
}

/// Session holding the created fixture comic (3 tiles, id `comic-1`)
pub async fn created_session(remote: &Arc<FakeRemote>) -> ComicSession {
    let session = session_with(remote);
    session
        .create("A cat learns to fly", Some("Flying Cat"))
        .await
        .expect("fixture create");
    session
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Yield until the remote has seen `count` calls matching `pred`
pub async fn wait_for(remote: &FakeRemote, count: usize, pred: impl Fn(&Call) -> bool) {
    for _ in 0..1000 {
        if remote.calls().iter().filter(|call| pred(call)).count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("remote never received {} matching calls: {:?}", count, remote.calls());
}

pub fn is_create(call: &Call) -> bool {
    matches!(call, Call::Create(_))
}

pub fn is_update(call: &Call) -> bool {
    matches!(call, Call::Update(_))
}

pub fn is_regenerate(call: &Call) -> bool {
    matches!(call, Call::Regenerate(_))
}
