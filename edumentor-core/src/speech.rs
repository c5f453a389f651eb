use serde::{Deserialize, Serialize};

use crate::text::clean_for_speech;

pub const DEFAULT_SPEECH_RATE: f32 = 0.95;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// Simple name/language match used to pick a read-aloud voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePreference {
    pub name_contains: String,
    pub languages: Vec<String>,
}

impl Default for VoicePreference {
    fn default() -> Self {
        Self {
            name_contains: "Google".into(),
            languages: vec!["en-IN".into(), "hi-IN".into()],
        }
    }
}

impl VoicePreference {
    fn matches(&self, voice: &Voice) -> bool {
        voice.name.contains(&self.name_contains) && self.languages.iter().any(|l| *l == voice.lang)
    }
}

/// First preferred voice, else the first installed one. `None` means the
/// platform default voice.
pub fn select_voice<'a>(voices: &'a [Voice], pref: &VoicePreference) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|v| pref.matches(v))
        .or_else(|| voices.first())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub lang: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn prepare(text: &str, voices: &[Voice], pref: &VoicePreference) -> Self {
        let voice = select_voice(voices, pref).cloned();
        let lang = voice.as_ref().map(|v| v.lang.clone());
        Self {
            text: clean_for_speech(text),
            voice,
            lang,
            rate: DEFAULT_SPEECH_RATE,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}
