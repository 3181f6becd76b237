use std::path::{Path, PathBuf};

use uuid::Uuid;

const SESSION_FILE: &str = "session_id";
const DEFAULT_STATE_DIR: &str = ".hipoteca";

/// Where the client keeps its session identifier.
///
/// The id survives restarts until the state is cleared, then a fresh one is
/// generated on the next load.
#[derive(Clone, Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.hipoteca`, or a relative `.hipoteca` when no home is known.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_STATE_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_or_create(&self) -> std::io::Result<String> {
        let path = self.path();
        if let Ok(existing) = std::fs::read_to_string(&path) {
            let existing = existing.trim();
            if Uuid::parse_str(existing).is_ok() {
                return Ok(existing.to_string());
            }
            tracing::warn!(path = %path.display(), "ignoring malformed session id");
        }
        std::fs::create_dir_all(&self.dir)?;
        let session_id = Uuid::new_v4().to_string();
        std::fs::write(&path, &session_id)?;
        tracing::info!(session_id = %session_id, "generated session id");
        Ok(session_id)
    }

    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_stable_until_cleared() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("state"));

        let first = store.load_or_create().expect("create");
        let second = store.load_or_create().expect("reload");
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());

        store.clear().expect("clear");
        let third = store.load_or_create().expect("regenerate");
        assert_ne!(first, third);
    }

    #[test]
    fn malformed_file_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "not-a-uuid").expect("write");
        let store = SessionStore::new(dir.path());
        let id = store.load_or_create().expect("create");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn clearing_twice_is_fine() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path());
        store.clear().expect("clear missing");
    }
}
