mod chat;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use edumentor_audio::WavFileMicrophone;
use edumentor_core::config::{ClientConfig, IntegrationProfile};
use edumentor_core::profile::{DEFAULT_LANGUAGE, StudentProfile};
use edumentor_engine::capture::ImageFile;
use edumentor_engine::error::ClientError;
use edumentor_engine::session::ClientSession;
use edumentor_engine::traits::Microphone;
use edumentor_runtime::defaults::session_file;
use edumentor_runtime::{
    CommandSynthesizer, ConfigStore, FileProfileStorage, backend_from_config,
};

#[derive(Parser, Debug)]
#[command(name = "edumentor")]
#[command(version, about = "Terminal client for the eduMentor tutoring backend", long_about = None)]
struct Args {
    /// Config file (JSON). Defaults to the platform config dir.
    #[arg(long, env = "EDUMENTOR_CONFIG", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend origin for the active integration profile.
    #[arg(long, env = "EDUMENTOR_BASE_URL", global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Backend contract: `session-json` or `form`.
    #[arg(long, global = true, value_name = "PROFILE")]
    integration: Option<IntegrationProfile>,

    /// Where the session record is stored.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds. 0 disables it.
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Read answers aloud with the configured speech command.
    #[arg(long, global = true)]
    speak: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the student with the backend and save the session.
    Register {
        #[arg(long)]
        class: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        board: String,
        #[arg(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
    },
    /// Show the saved student profile.
    Profile,
    /// Ask a typed question.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Send a photo of homework or notes.
    Image { path: PathBuf },
    /// Send a spoken question from a WAV file or the microphone.
    Voice {
        #[arg(long, value_name = "WAV", conflicts_with = "record_secs")]
        file: Option<PathBuf>,
        /// Record from the input device for this many seconds.
        #[arg(long, value_name = "SECS")]
        record_secs: Option<u64>,
    },
    /// Interactive session.
    Chat,
    /// Print the effective configuration.
    Config {
        /// Write it back to the config file.
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(cfg: &mut ClientConfig, args: &Args) {
    if let Some(profile) = args.integration {
        cfg.integration = profile;
    }
    if let Some(url) = &args.base_url {
        match cfg.integration {
            IntegrationProfile::SessionJson => cfg.base_url = url.clone(),
            IntegrationProfile::Form => cfg.form_base_url = url.clone(),
        }
    }
    if let Some(dir) = &args.data_dir {
        cfg.data_dir = Some(dir.clone());
    }
    if let Some(secs) = args.timeout_secs {
        cfg.request_timeout_secs = Some(secs);
    }
    if args.speak {
        cfg.speech.enabled = true;
    }
}

fn open_session(cfg: &ClientConfig) -> anyhow::Result<ClientSession> {
    let backend = backend_from_config(cfg)?;
    let storage = Arc::new(FileProfileStorage::at_path(session_file(cfg)));
    let mut session = ClientSession::start(backend, storage);

    if let Some(synth) = CommandSynthesizer::from_config(&cfg.speech) {
        session = session.with_speech(Arc::new(synth), cfg.speech.preference.clone());
    } else if cfg.speech.enabled {
        log::warn!("read-aloud is on but no speech command is configured");
    }
    Ok(session)
}

/// Errors were already printed as transcript entries; only the exit code is left.
fn outcome(result: Result<(), ClientError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let store = match &args.config {
        Some(path) => ConfigStore::at_path(path),
        None => ConfigStore::at_default_path(),
    };
    let mut cfg = store.load_or_default()?;
    apply_overrides(&mut cfg, &args);

    if let Command::Config { save } = &args.command {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        if *save {
            store.save(&cfg)?;
            log::info!("saved config to {}", store.path().display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = open_session(&cfg)?;
    let mark = session.transcript().len();

    let code = match args.command {
        Command::Config { .. } => ExitCode::SUCCESS,
        Command::Profile => {
            output::print_profile(&session);
            ExitCode::SUCCESS
        }
        Command::Register {
            class,
            name,
            board,
            language,
        } => {
            let profile = StudentProfile::new(class)
                .with_name(name)
                .with_board(board)
                .with_language(language);
            let result = session.register(profile).await;
            output::print_since(&session, mark);
            outcome(result)
        }
        Command::Ask { question } => {
            let result = session.submit_text(&question.join(" ")).await;
            output::print_since(&session, mark);
            outcome(result)
        }
        Command::Image { path } => {
            let file = ImageFile::from_path(&path)?;
            session.select_image_file(file);
            let result = session.submit_image().await;
            output::print_since(&session, mark);
            outcome(result)
        }
        Command::Voice { file, record_secs } => {
            let result = match (file, record_secs) {
                (Some(path), _) => record(&mut session, &WavFileMicrophone::new(path), None).await,
                (None, Some(secs)) => record_live(&mut session, &cfg, secs).await?,
                (None, None) => bail!("pass --file <WAV> or --record-secs <SECS>"),
            };
            output::print_since(&session, mark);
            outcome(result)
        }
        Command::Chat => chat::run(&mut session, &cfg).await?,
    };
    Ok(code)
}

/// One recording turn. `hold` keeps the microphone open before stopping.
async fn record(
    session: &mut ClientSession,
    mic: &dyn Microphone,
    hold: Option<Duration>,
) -> Result<(), ClientError> {
    session.start_recording(mic).await?;
    if let Some(hold) = hold {
        println!("Recording for {}s...", hold.as_secs());
        tokio::time::sleep(hold).await;
    }
    session.stop_recording().await
}

#[cfg(feature = "native-audio")]
async fn record_live(
    session: &mut ClientSession,
    cfg: &ClientConfig,
    secs: u64,
) -> anyhow::Result<Result<(), ClientError>> {
    let mic = edumentor_audio::CpalMicrophone::new(cfg.input_device.clone());
    Ok(record(session, &mic, Some(Duration::from_secs(secs))).await)
}

#[cfg(not(feature = "native-audio"))]
async fn record_live(
    _session: &mut ClientSession,
    _cfg: &ClientConfig,
    _secs: u64,
) -> anyhow::Result<Result<(), ClientError>> {
    bail!("live recording needs the `native-audio` feature; pass --file <WAV> instead")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn overrides_target_the_active_profile() {
        let args = Args::try_parse_from([
            "edumentor",
            "--integration",
            "form",
            "--base-url",
            "http://tutor.local:9000",
            "--timeout-secs",
            "30",
            "profile",
        ])
        .unwrap();
        let mut cfg = ClientConfig::default();
        apply_overrides(&mut cfg, &args);

        assert_eq!(cfg.integration, IntegrationProfile::Form);
        assert_eq!(cfg.form_base_url, "http://tutor.local:9000");
        assert_eq!(cfg.base_url, edumentor_core::config::DEFAULT_SESSION_API_URL);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn register_defaults_language() {
        let args = Args::try_parse_from(["edumentor", "register", "--class", "10"]).unwrap();
        match args.command {
            Command::Register {
                class, language, ..
            } => {
                assert_eq!(class, "10");
                assert_eq!(language, DEFAULT_LANGUAGE);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn voice_sources_are_exclusive() {
        assert!(
            Args::try_parse_from(["edumentor", "voice", "--file", "a.wav", "--record-secs", "3"])
                .is_err()
        );
    }

    #[test]
    fn ask_joins_words() {
        let args = Args::try_parse_from(["edumentor", "ask", "what", "is", "pi"]).unwrap();
        match args.command {
            Command::Ask { question } => assert_eq!(question.join(" "), "what is pi"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
