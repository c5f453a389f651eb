use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use edumentor_core::config::ClientConfig;

use crate::defaults::default_config_path;
use crate::fs::write_atomic;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_path() -> Self {
        Self::at_path(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<ClientConfig> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: ClientConfig = serde_json::from_slice(&bytes).context("decode config JSON")?;
        Ok(cfg)
    }

    /// A missing file means defaults; a malformed one is still an error.
    pub fn load_or_default(&self) -> anyhow::Result<ClientConfig> {
        match std::fs::metadata(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no config at {}; using defaults", self.path.display());
                Ok(ClientConfig::default())
            }
            _ => self.load(),
        }
    }

    pub fn save(&self, cfg: &ClientConfig) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(cfg).context("encode config JSON")?;
        write_atomic(&self.path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edumentor_core::config::IntegrationProfile;

    #[test]
    fn round_trips_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("config.json"));

        let cfg = ClientConfig {
            integration: IntegrationProfile::Form,
            form_base_url: "http://tutor.local:8000".into(),
            request_timeout_secs: Some(45),
            ..Default::default()
        };

        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults_but_garbage_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("config.json"));
        assert_eq!(store.load_or_default().unwrap(), ClientConfig::default());

        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(store.load_or_default().is_err());
    }
}
