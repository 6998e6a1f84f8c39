//! Session markers: a best-effort trace of running games on disk.
//!
//! A marker is written when a game starts and cleared when it ends. If the
//! process dies in between, the marker is still there after restart, so an
//! operator (or a status command) can show "you were in a game heading for
//! 100 70 100 with 2:13 left".
//!
//! Markers are never the source of truth while the engine runs (the
//! in-memory registry is) and are never read back to resume a game.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use wayforge_protocol::{Codec, JsonCodec, Location, ParticipantId};

use crate::MarkerError;

/// The persisted shape of a running (or crashed) game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub active: bool,
    pub target: Location,
    pub remaining_secs: u32,
    pub ended: bool,
}

/// Where markers live.
pub trait MarkerStore: Send + Sync + 'static {
    fn save(&self, participant: ParticipantId, marker: &SessionMarker) -> Result<(), MarkerError>;

    /// Removes the marker. Clearing a marker that doesn't exist is fine.
    fn clear(&self, participant: ParticipantId) -> Result<(), MarkerError>;

    fn load(&self, participant: ParticipantId) -> Result<Option<SessionMarker>, MarkerError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps markers in a map. Survives nothing; useful for tests and for
/// hosts that don't want files.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    markers: Mutex<HashMap<ParticipantId, SessionMarker>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers currently stored.
    pub fn len(&self) -> usize {
        self.markers.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn save(&self, participant: ParticipantId, marker: &SessionMarker) -> Result<(), MarkerError> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still usable.
        let mut markers = self.markers.lock().unwrap_or_else(|e| e.into_inner());
        markers.insert(participant, marker.clone());
        Ok(())
    }

    fn clear(&self, participant: ParticipantId) -> Result<(), MarkerError> {
        let mut markers = self.markers.lock().unwrap_or_else(|e| e.into_inner());
        markers.remove(&participant);
        Ok(())
    }

    fn load(&self, participant: ParticipantId) -> Result<Option<SessionMarker>, MarkerError> {
        let markers = self.markers.lock().unwrap_or_else(|e| e.into_inner());
        Ok(markers.get(&participant).cloned())
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// One file per participant under a directory: `<dir>/<id>.json`.
///
/// Uses blocking `std::fs` calls on whatever thread drives the engine,
/// which under the engine actor is a Tokio
/// worker. The manager only touches markers when a game starts or ends,
/// never per tick, so a local disk is fine. On slow or networked storage,
/// or with a high tick rate and many concurrent starts, prefer
/// [`MemoryMarkerStore`] or a store that hands writes to its own thread.
pub struct FileMarkerStore<C: Codec = JsonCodec> {
    dir: PathBuf,
    codec: C,
}

impl FileMarkerStore<JsonCodec> {
    /// A JSON store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_codec(dir, JsonCodec)
    }
}

impl<C: Codec> FileMarkerStore<C> {
    pub fn with_codec(dir: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            dir: dir.into(),
            codec,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, participant: ParticipantId) -> PathBuf {
        self.dir.join(format!("{}.json", participant.0))
    }
}

impl<C: Codec> MarkerStore for FileMarkerStore<C> {
    fn save(&self, participant: ParticipantId, marker: &SessionMarker) -> Result<(), MarkerError> {
        std::fs::create_dir_all(&self.dir)?;
        let bytes = self.codec.encode(marker)?;
        std::fs::write(self.path_for(participant), bytes)?;
        Ok(())
    }

    fn clear(&self, participant: ParticipantId) -> Result<(), MarkerError> {
        match std::fs::remove_file(self.path_for(participant)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self, participant: ParticipantId) -> Result<Option<SessionMarker>, MarkerError> {
        let bytes = match std::fs::read(self.path_for(participant)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(self.codec.decode(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(remaining: u32) -> SessionMarker {
        SessionMarker {
            active: true,
            target: Location::block_centre("world", 100, 70, 100),
            remaining_secs: remaining,
            ended: false,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wayforge-markers-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_memory_store_save_load_clear() {
        let store = MemoryMarkerStore::new();
        let p = ParticipantId(1);

        store.save(p, &marker(300)).unwrap();
        assert_eq!(store.load(p).unwrap(), Some(marker(300)));

        store.clear(p).unwrap();
        assert_eq!(store.load(p).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_clear_missing_is_ok() {
        let store = MemoryMarkerStore::new();
        assert!(store.clear(ParticipantId(9)).is_ok());
    }

    #[test]
    fn test_file_store_writes_one_file_per_participant() {
        let dir = scratch_dir("per-participant");
        let store = FileMarkerStore::new(&dir);

        store.save(ParticipantId(7), &marker(120)).unwrap();

        assert!(dir.join("7.json").exists());
        assert_eq!(store.load(ParticipantId(7)).unwrap(), Some(marker(120)));
        assert_eq!(store.load(ParticipantId(8)).unwrap(), None);

        store.clear(ParticipantId(7)).unwrap();
        assert!(!dir.join("7.json").exists());
        store.clear(ParticipantId(7)).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_corrupt_marker_is_codec_error() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("3.json"), b"{ half a marker").unwrap();
        let store = FileMarkerStore::new(&dir);

        let result = store.load(ParticipantId(3));

        assert!(matches!(result, Err(MarkerError::Codec(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
