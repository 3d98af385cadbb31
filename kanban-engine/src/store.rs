//! Durable storage for the state document

use crate::error::{KanbanError, Result};
use crate::types::BoardState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What a fresh install starts with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub board_name: String,
    pub default_columns: bool,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            board_name: "My Board".to_string(),
            default_columns: true,
        }
    }
}

impl Seed {
    /// Build a new seed state. Each call allocates fresh ids.
    pub fn state(&self) -> BoardState {
        BoardState::seed(&self.board_name, self.default_columns)
    }
}

/// Storage abstraction for the whole state document
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Read the persisted state, or `None` if nothing was saved yet
    async fn load(&self) -> Result<Option<BoardState>>;

    /// Replace the persisted state. A failed save leaves the previous
    /// document intact.
    async fn save(&self, state: &BoardState) -> Result<()>;
}

/// Parse and validate a persisted document.
///
/// Every field of the document is required and records must be JSON
/// objects; anything else is `CorruptData`.
pub fn decode(content: &str) -> Result<BoardState> {
    let unreadable =
        |e: serde_json::Error| KanbanError::corrupt(format!("unreadable state document: {e}"));
    let document: Value = serde_json::from_str(content).map_err(unreadable)?;
    ensure_keyed(&document)?;
    let mut state: BoardState = serde_json::from_value(document).map_err(unreadable)?;
    state.relink();
    state.check_integrity()?;
    Ok(state)
}

fn keyed<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| KanbanError::corrupt(format!("{what} is not a JSON object")))
}

fn records<'a>(parent: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    parent.get(key).and_then(Value::as_array).into_iter().flatten()
}

/// Serde also accepts records written as arrays; the document only allows objects
fn ensure_keyed(document: &Value) -> Result<()> {
    let root = keyed(document, "state document")?;
    for board in records(root, "boards") {
        let board = keyed(board, "board")?;
        for column in records(board, "columns") {
            let column = keyed(column, "column")?;
            for task in records(column, "tasks") {
                keyed(task, "task")?;
            }
        }
    }
    Ok(())
}

/// Render a state as the persisted document
pub fn encode(state: &BoardState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Load the state, seeding when nothing was saved or the document is corrupt.
///
/// The recovered error is handed back so the caller can tell the user their
/// data was not readable. IO errors still propagate.
pub async fn load_or_seed(
    storage: &dyn StateStorage,
    seed: &Seed,
) -> Result<(BoardState, Option<KanbanError>)> {
    match storage.load().await {
        Ok(Some(state)) => Ok((state, None)),
        Ok(None) => {
            info!(board = %seed.board_name, "no saved state, seeding");
            Ok((seed.state(), None))
        }
        Err(e) if e.is_corrupt() => {
            warn!(error = %e, "stored state is corrupt, starting from seed");
            Ok((seed.state(), Some(e)))
        }
        Err(e) => Err(e),
    }
}

/// JSON document on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Staging file next to the target, so the rename never crosses filesystems
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStorage for FileStore {
    async fn load(&self) -> Result<Option<BoardState>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state = decode(&content)?;
        info!(path = %self.path.display(), boards = state.boards.len(), "loaded state");
        Ok(Some(state))
    }

    async fn save(&self, state: &BoardState) -> Result<()> {
        let content = encode(state)?;
        let staging = self.staging_path();
        if let Err(e) = atomic_write(&self.path, &staging, content.as_bytes()).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        debug!(path = %self.path.display(), bytes = content.len(), "saved state");
        Ok(())
    }
}

/// Write to the staging file, flush it to disk, then rename over the target
async fn atomic_write(path: &Path, staging: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(staging).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(staging, path).await?;
    Ok(())
}

/// In-memory document store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted document, valid or not
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
            ..Self::default()
        }
    }

    /// Make every following save fail with an IO error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The last saved document, parsed
    pub async fn saved_state(&self) -> Option<Result<BoardState>> {
        self.document.lock().await.as_deref().map(decode)
    }
}

#[async_trait]
impl StateStorage for MemoryStore {
    async fn load(&self) -> Result<Option<BoardState>> {
        self.document.lock().await.as_deref().map(decode).transpose()
    }

    async fn save(&self, state: &BoardState) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("memory store is set to fail").into());
        }
        let content = encode(state)?;
        *self.document.lock().await = Some(content);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
