use std::sync::Arc;

use edumentor_core::speech::{Utterance, VoicePreference};
use edumentor_core::types::TranscriptRole;

use crate::traits::SpeechSynthesizer;
use crate::transcript::Transcript;

struct ReadAloud {
    synth: Arc<dyn SpeechSynthesizer>,
    preference: VoicePreference,
}

/// Owns the transcript and, optionally, reads final answers aloud.
#[derive(Default)]
pub struct ResponseRenderer {
    transcript: Transcript,
    speech: Option<ReadAloud>,
}

impl std::fmt::Debug for ResponseRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseRenderer")
            .field("entries", &self.transcript.len())
            .field("read_aloud", &self.speech.is_some())
            .finish()
    }
}

impl ResponseRenderer {
    pub fn with_speech(
        mut self,
        synth: Arc<dyn SpeechSynthesizer>,
        preference: VoicePreference,
    ) -> Self {
        self.speech = Some(ReadAloud { synth, preference });
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn append(&mut self, role: TranscriptRole, content: impl Into<String>) {
        self.transcript.push(role, content);
    }

    /// Appends the ai turn, then speaks it. Speech problems never reach the
    /// transcript.
    pub async fn answer(&mut self, response: &str) {
        self.transcript.push(TranscriptRole::Ai, response);

        let Some(speech) = &self.speech else {
            return;
        };
        let utterance = Utterance::prepare(response, &speech.synth.voices(), &speech.preference);
        if utterance.text.trim().is_empty() {
            return;
        }
        if let Err(e) = speech.synth.speak(&utterance).await {
            log::warn!("read-aloud failed: {e:#}");
        }
    }
}
