use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use lumiishift_core::{
    credential, CompletionSettings, Config, Credential, InteractionState, KeySource, MoodCatalog,
    ResponseOrchestrator,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

const DEFAULT_LOG_FILTER: &str = "lumiishift=info,lumiishift_core=info";

#[derive(Parser)]
#[command(name = "lumiishift", version)]
#[command(about = "Pick your mood and get a warm, AI-powered reply")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Together.ai API key
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Chat model to use
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat-completion endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available moods
    Moods,
    /// Get a reply for one mood and print it
    Respond {
        /// Mood id, e.g. happy or peaceful
        mood: String,
        /// Exit with an error unless the reply came back successfully
        #[arg(long)]
        strict: bool,
        /// Print the resulting state as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// CLI flags win over the config file.
    fn completion_settings(&self, config: &Config) -> CompletionSettings {
        let mut settings = config.completion_settings();
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }
}

fn log_file_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("lumiishift").join("lumiishift.log"))
}

/// The TUI owns the terminal, so it logs to a file; one-shot commands log to stderr.
fn init_logging(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if to_file {
        let path = log_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    // Load .env before parsing so TOGETHER_API_KEY can come from it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(cli.command.is_none())?;

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Could not read config, using defaults");
        Config::new()
    });
    let settings = cli.completion_settings(&config);
    let orchestrator = ResponseOrchestrator::new(MoodCatalog::standard(), settings)?;

    match &cli.command {
        None => {
            let credential = credential::resolve(cli.api_key.as_deref(), &config).ok();
            run_tui(orchestrator, credential).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Moods) => {
            list_moods(orchestrator.catalog());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Respond { mood, strict, json }) => {
            respond_once(&orchestrator, &cli, &config, mood, *strict, *json).await
        }
    }
}

fn mood_lines(catalog: &MoodCatalog) -> Vec<String> {
    catalog
        .iter()
        .map(|entry| {
            format!(
                "{} {:<12} {}  {}",
                entry.icon, entry.id, entry.theme_color, entry.acknowledgment
            )
        })
        .collect()
}

fn list_moods(catalog: &MoodCatalog) {
    for line in mood_lines(catalog) {
        println!("{}", line);
    }
}

/// Fetch one reply. The mood is checked before the key so a typo fails
/// with `UnknownMood` even when no key is configured.
async fn respond_state(
    orchestrator: &ResponseOrchestrator,
    api_key: Option<&str>,
    config: &Config,
    mood: &str,
    strict: bool,
) -> Result<(InteractionState, ExitCode)> {
    orchestrator.catalog().lookup(mood)?;

    let (credential, source) = credential::resolve(api_key, config)?;
    info!(source = source.as_str(), "Using API key");

    let mut state = InteractionState::new();
    let outcome = orchestrator.respond(&mut state, mood, &credential).await?;

    let code = if strict && !outcome.is_success() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };
    Ok((state, code))
}

async fn respond_once(
    orchestrator: &ResponseOrchestrator,
    cli: &Cli,
    config: &Config,
    mood: &str,
    strict: bool,
    json: bool,
) -> Result<ExitCode> {
    let (state, code) = respond_state(orchestrator, cli.api_key.as_deref(), config, mood, strict).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        if let Ok(entry) = orchestrator.catalog().lookup(mood) {
            println!("{} {} - {}", entry.icon, entry.display_name(), entry.acknowledgment);
        }
        println!("{}", state.last_reply());
    }
    Ok(code)
}

async fn run_tui(
    orchestrator: ResponseOrchestrator,
    credential: Option<(Credential, KeySource)>,
) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(orchestrator, credential);
    info!("LumiiShift started");

    let result = run_app(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }
        app.poll_pending().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumiishift_core::MoodError;

    #[test]
    fn test_cli_parses_respond() {
        let cli = Cli::try_parse_from([
            "lumiishift",
            "respond",
            "happy",
            "--strict",
            "--model",
            "other/model",
            "--api-key",
            "k",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("other/model"));
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        match cli.command {
            Some(Commands::Respond { mood, strict, json }) => {
                assert_eq!(mood, "happy");
                assert!(strict);
                assert!(!json);
            }
            _ => panic!("expected respond"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["lumiishift", "--timeout-secs", "5", "--endpoint", "http://localhost:1/x"])
            .unwrap();
        let config = Config {
            model: Some("from/config".to_string()),
            endpoint: Some("http://config/x".to_string()),
            ..Config::new()
        };
        let settings = cli.completion_settings(&config);
        assert_eq!(settings.model, "from/config");
        assert_eq!(settings.endpoint, "http://localhost:1/x");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.max_tokens, 100);
    }

    const CONNECTION_ERROR: &str = "Connection error. Please check your internet connection.";

    /// Orchestrator pointed at a local port with nothing listening.
    async fn unreachable_orchestrator() -> ResponseOrchestrator {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = CompletionSettings {
            endpoint: format!("http://{}/v1/chat/completions", addr),
            timeout: Duration::from_millis(500),
            ..CompletionSettings::default()
        };
        ResponseOrchestrator::new(MoodCatalog::standard(), settings).unwrap()
    }

    #[tokio::test]
    async fn test_respond_strict_fails_on_connection_error() {
        let orchestrator = unreachable_orchestrator().await;
        let (state, code) = respond_state(&orchestrator, Some("k"), &Config::new(), "happy", true)
            .await
            .unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(state.selected_mood(), Some("happy"));
        assert_eq!(state.last_reply(), CONNECTION_ERROR);
    }

    #[tokio::test]
    async fn test_respond_without_strict_succeeds_and_serializes() {
        let orchestrator = unreachable_orchestrator().await;
        let (state, code) = respond_state(&orchestrator, Some("k"), &Config::new(), "happy", false)
            .await
            .unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["selected_mood"], "happy");
        assert_eq!(json["last_reply"], CONNECTION_ERROR);
    }

    #[tokio::test]
    async fn test_respond_unknown_mood_is_an_error() {
        let orchestrator = unreachable_orchestrator().await;
        let err = respond_state(&orchestrator, Some("k"), &Config::new(), "hangry", true)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<MoodError>(),
            Some(&MoodError::UnknownMood("hangry".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_mood_reported_before_missing_key() {
        let orchestrator = unreachable_orchestrator().await;
        // No flag and no config key
        let err = respond_state(&orchestrator, None, &Config::new(), "hangry", false)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<MoodError>().is_some());
        assert_eq!(err.to_string(), "Unknown mood: 'hangry'");
    }

    #[test]
    fn test_mood_lines_follow_catalog_order() {
        let catalog = MoodCatalog::standard();
        let lines = mood_lines(&catalog);

        assert_eq!(lines.len(), catalog.len());
        for (line, entry) in lines.iter().zip(catalog.iter()) {
            assert!(line.starts_with(entry.icon), "{line}");
            assert!(line.contains(entry.id), "{line}");
            assert!(line.contains(&entry.theme_color.to_string()), "{line}");
        }
        assert!(lines[0].contains("happy"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
