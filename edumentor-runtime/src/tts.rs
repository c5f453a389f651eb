use std::process::ExitStatus;

use anyhow::{Context, bail};
use async_trait::async_trait;
use edumentor_core::config::SpeechConfig;
use edumentor_core::speech::{Utterance, Voice};
use edumentor_engine::traits::SpeechSynthesizer;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

/// Reads answers aloud through an external TTS program (`espeak-ng`, `say`,
/// `piper`, ...). The text is written to the program's stdin.
///
/// Placeholders in the arguments: `{voice}`, `{lang}`, `{rate}`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    voices: Vec<Voice>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, voices: Vec<Voice>) -> Self {
        Self {
            program: program.into(),
            args,
            voices,
        }
    }

    /// `None` when read-aloud is off or no command is configured.
    pub fn from_config(cfg: &SpeechConfig) -> Option<Self> {
        if !cfg.enabled {
            return None;
        }
        let (program, args) = cfg.command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), cfg.voices.clone()))
    }

    fn expand_args(&self, utterance: &Utterance) -> Vec<String> {
        let voice = utterance.voice.as_ref().map(|v| v.name.as_str()).unwrap_or("");
        let lang = utterance.lang.as_deref().unwrap_or("");
        // Most CLI engines take words per minute; 175 is the common default.
        let wpm = ((175.0 * utterance.rate).round() as u32).to_string();
        self.args
            .iter()
            .map(|a| {
                a.replace("{voice}", voice)
                    .replace("{lang}", lang)
                    .replace("{rate}", &wpm)
            })
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    async fn speak(&self, utterance: &Utterance) -> anyhow::Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.expand_args(utterance))
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::null())
            .spawn()
            .with_context(|| format!("spawn TTS program: {}", self.program))?;

        let status = feed(&mut child, &utterance.text).await?;
        if !status.success() {
            bail!("TTS program {} exited with {status}", self.program);
        }
        Ok(())
    }
}

/// Writes `text` to the child's stdin, then reaps it. A child that stops
/// reading is killed and reaped before the error is returned.
async fn feed(child: &mut Child, text: &str) -> anyhow::Result<ExitStatus> {
    if let Some(mut stdin) = child.stdin.take() {
        let written = stdin.write_all(text.as_bytes()).await;
        drop(stdin);
        if let Err(e) = written {
            if let Err(kill) = child.kill().await {
                log::debug!("kill TTS program: {kill}");
            }
            return Err(e).context("write TTS input");
        }
    }
    child.wait().await.context("wait for TTS program")
}
