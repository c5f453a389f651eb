use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::speech::{Voice, VoicePreference};

pub const DEFAULT_SESSION_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_FORM_API_URL: &str = "http://localhost:8000";

/// Which backend contract the client speaks. Never mixed within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationProfile {
    #[default]
    SessionJson,
    Form,
}

impl std::str::FromStr for IntegrationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session-json" | "session" | "json" => Ok(IntegrationProfile::SessionJson),
            "form" => Ok(IntegrationProfile::Form),
            other => Err(format!("unknown integration profile: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Program plus leading arguments; the utterance text goes to stdin.
    #[serde(default)]
    pub command: Vec<String>,

    /// Voices the command can produce. Empty means the engine's default voice.
    #[serde(default)]
    pub voices: Vec<Voice>,

    #[serde(default)]
    pub preference: VoicePreference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub integration: IntegrationProfile,

    #[serde(default = "default_session_api_url")]
    pub base_url: String,

    #[serde(default = "default_form_api_url")]
    pub form_base_url: String,

    /// Unset means requests run until they finish or the transport fails.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Where the session record lives. Unset means the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub input_device: Option<String>,

    #[serde(default)]
    pub speech: SpeechConfig,
}

fn default_session_api_url() -> String {
    DEFAULT_SESSION_API_URL.to_string()
}

fn default_form_api_url() -> String {
    DEFAULT_FORM_API_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            integration: IntegrationProfile::default(),
            base_url: default_session_api_url(),
            form_base_url: default_form_api_url(),
            request_timeout_secs: None,
            data_dir: None,
            input_device: None,
            speech: SpeechConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Origin of whichever backend the active profile talks to.
    pub fn active_base_url(&self) -> &str {
        match self.integration {
            IntegrationProfile::SessionJson => &self.base_url,
            IntegrationProfile::Form => &self.form_base_url,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.active_base_url(), DEFAULT_SESSION_API_URL);
        assert_eq!(cfg.request_timeout(), None);
        assert!(!cfg.speech.enabled);
    }

    #[test]
    fn form_profile_uses_its_own_origin() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{"integration":"form","request_timeout_secs":30}"#).unwrap();
        assert_eq!(cfg.integration, IntegrationProfile::Form);
        assert_eq!(cfg.active_base_url(), DEFAULT_FORM_API_URL);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn profile_names_parse() {
        assert_eq!(
            "session-json".parse::<IntegrationProfile>().unwrap(),
            IntegrationProfile::SessionJson
        );
        assert_eq!("Form".parse::<IntegrationProfile>().unwrap(), IntegrationProfile::Form);
        assert!("soap".parse::<IntegrationProfile>().is_err());
    }
}
