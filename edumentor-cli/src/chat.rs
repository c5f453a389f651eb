use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use edumentor_audio::WavFileMicrophone;
use edumentor_core::config::ClientConfig;
use edumentor_core::profile::StudentProfile;
use edumentor_core::types::InputMode;
use edumentor_engine::capture::{ImageFile, RecordingState};
use edumentor_engine::session::ClientSession;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output;

const HELP: &str = "\
Commands:
  :text | :image | :voice          switch input mode
  :register class=<c> [name=<n>] [board=<b>] [language=<l>]
  :profile                         show the saved profile
  :file <path>                     image mode: pick a photo; voice mode: send a WAV
  :send                            image mode: send the picked photo
  :record / :stop                  voice mode: live microphone (native-audio builds)
  :help
  :quit
Anything else is asked as a question in text mode.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Empty,
    Mode(InputMode),
    Register(StudentProfile),
    Profile,
    File(PathBuf),
    Send,
    Record,
    Stop,
    Help,
    Quit,
    Question(String),
    Invalid(String),
}

pub fn parse_line(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return ChatCommand::Question(line.to_string());
    };

    let (word, arg) = match rest.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (rest, ""),
    };
    match word {
        "text" => ChatCommand::Mode(InputMode::Text),
        "image" => ChatCommand::Mode(InputMode::Image),
        "voice" => ChatCommand::Mode(InputMode::Voice),
        "register" => parse_register(arg),
        "profile" => ChatCommand::Profile,
        "file" if arg.is_empty() => ChatCommand::Invalid(":file needs a path".into()),
        "file" => ChatCommand::File(PathBuf::from(arg)),
        "send" => ChatCommand::Send,
        "record" => ChatCommand::Record,
        "stop" => ChatCommand::Stop,
        "help" | "h" | "?" => ChatCommand::Help,
        "quit" | "q" | "exit" => ChatCommand::Quit,
        other => ChatCommand::Invalid(format!("unknown command :{other} (try :help)")),
    }
}

/// `key=value` pairs; underscores in values stand for spaces. A missing class
/// is left empty so registration reports it.
fn parse_register(arg: &str) -> ChatCommand {
    let mut profile = StudentProfile::new("");
    for pair in arg.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            return ChatCommand::Invalid(format!("expected key=value, got `{pair}`"));
        };
        let value = value.replace('_', " ");
        profile = match key {
            "class" => StudentProfile {
                class: value,
                ..profile
            },
            "name" => profile.with_name(value),
            "board" => profile.with_board(value),
            "language" | "lang" => profile.with_language(value),
            other => return ChatCommand::Invalid(format!("unknown field `{other}`")),
        };
    }
    ChatCommand::Register(profile)
}

fn prompt(session: &ClientSession) {
    let mut line = format!("[{}", session.mode().as_str());
    if session.recording_state() == RecordingState::Recording {
        line.push_str(" ●rec");
    }
    if let Some(label) = session.image_selection() {
        line.push_str(&format!(" {label}"));
    }
    line.push_str("]> ");
    print!("{line}");
    let _ = std::io::stdout().flush();
}

pub async fn run(session: &mut ClientSession, cfg: &ClientConfig) -> anyhow::Result<ExitCode> {
    if !session.is_registered() {
        println!("Not registered yet. Start with :register class=<class>");
    } else {
        output::print_profile(session);
    }
    println!("Type :help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut mark = session.transcript().len();

    loop {
        prompt(session);
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Invalid(msg) => eprintln!("{msg}"),
            ChatCommand::Mode(mode) => session.select_mode(mode),
            ChatCommand::Profile => output::print_profile(session),
            ChatCommand::Register(profile) => {
                let _ = session.register(profile).await;
            }
            ChatCommand::Question(text) => match session.mode() {
                InputMode::Text => {
                    let _ = session.submit_text(&text).await;
                }
                InputMode::Image => println!("Image mode: use :file <path> then :send"),
                InputMode::Voice => println!("Voice mode: use :file <wav> or :record"),
            },
            ChatCommand::File(path) => match session.mode() {
                InputMode::Image => match ImageFile::from_path(&path) {
                    Ok(file) => session.select_image_file(file),
                    Err(e) => eprintln!("{e:#}"),
                },
                InputMode::Voice => {
                    let mic = WavFileMicrophone::new(path);
                    if session.start_recording(&mic).await.is_ok() {
                        let _ = session.stop_recording().await;
                    }
                }
                InputMode::Text => println!("Switch to :image or :voice first"),
            },
            ChatCommand::Send => {
                let _ = session.submit_image().await;
            }
            ChatCommand::Record => start_live(session, cfg).await,
            ChatCommand::Stop => {
                let _ = session.stop_recording().await;
            }
        }

        mark = output::print_since(session, mark);
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "native-audio")]
async fn start_live(session: &mut ClientSession, cfg: &ClientConfig) {
    let mic = edumentor_audio::CpalMicrophone::new(cfg.input_device.clone());
    if session.start_recording(&mic).await.is_ok() {
        println!("Recording... :stop to send");
    }
}

#[cfg(not(feature = "native-audio"))]
async fn start_live(_session: &mut ClientSession, _cfg: &ClientConfig) {
    eprintln!("This build has no microphone support; use :file <wav>");
}
