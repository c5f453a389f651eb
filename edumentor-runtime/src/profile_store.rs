use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use edumentor_core::types::SessionRecord;
use edumentor_engine::traits::ProfileStorage;

use crate::fs::write_atomic;

/// The session record as one JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileProfileStorage {
    path: PathBuf,
}

impl FileProfileStorage {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStorage for FileProfileStorage {
    fn load(&self) -> anyhow::Result<Option<SessionRecord>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read session record: {}", self.path.display())));
            }
        };
        let record = serde_json::from_slice(&bytes).context("decode session record")?;
        Ok(Some(record))
    }

    fn save(&self, record: &SessionRecord) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(record).context("encode session record")?;
        write_atomic(&self.path, &json)?;
        log::debug!("saved session record to {}", self.path.display());
        Ok(())
    }
}
