use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::tao::event::Event;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::config::{
    ENV_BACKEND, ENV_DATA_DIR, ENV_GITHUB_BRANCH, ENV_GITHUB_REPO, ENV_REQUIRE_SELECTION,
};
use services::{AppServices, Clock, DispatcherHandle, QuizConfig, QuizLoopService};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidBackend { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidBackend { raw } => {
                write!(f, "invalid --backend value: {raw} (expected local or github)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    backend: &'static str,
    quiz_loop: Arc<QuizLoopService>,
}

impl UiApp for DesktopApp {
    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    fn backend_name(&self) -> &'static str {
        self.backend
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--backend local|github] [--data-dir <dir>]");
    eprintln!("                      [--repo <owner/name>] [--branch <branch>] [--require-selection]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --backend local");
    eprintln!("  --data-dir data");
    eprintln!("  --branch main");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BACKEND, QUIZ_DATA_DIR, QUIZ_GITHUB_REPO, QUIZ_GITHUB_BRANCH,");
    eprintln!("  QUIZ_GITHUB_TOKEN, QUIZ_GITHUB_API_URL, QUIZ_REQUIRE_SELECTION,");
    eprintln!("  QUIZ_FLUSH_INTERVAL_SECS, RUST_LOG");
}

/// Command-line overrides, keyed by the environment variable they replace.
#[derive(Debug, Default)]
struct Args {
    overrides: HashMap<&'static str, String>,
    help: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--backend" => {
                    let value = require_value(args, "--backend")?;
                    if !matches!(value.trim(), "local" | "github") {
                        return Err(ArgsError::InvalidBackend { raw: value });
                    }
                    parsed.overrides.insert(ENV_BACKEND, value);
                }
                "--data-dir" => {
                    let value = require_value(args, "--data-dir")?;
                    parsed.overrides.insert(ENV_DATA_DIR, value);
                }
                "--repo" => {
                    let value = require_value(args, "--repo")?;
                    parsed.overrides.insert(ENV_GITHUB_REPO, value);
                }
                "--branch" => {
                    let value = require_value(args, "--branch")?;
                    parsed.overrides.insert(ENV_GITHUB_BRANCH, value);
                }
                "--require-selection" => {
                    parsed.overrides.insert(ENV_REQUIRE_SELECTION, "true".into());
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// Flags first, then the process environment.
    fn config(&self) -> Result<QuizConfig, services::ConfigError> {
        QuizConfig::from_lookup(|key| {
            self.overrides
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }
}

/// How long closing the window waits for queued progress to be committed.
const EXIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn drain_progress_on_exit(runtime: &Handle, writer: &DispatcherHandle) {
    let drained = writer.drain_blocking(runtime, EXIT_DRAIN_TIMEOUT);
    let stats = writer.stats();
    if drained {
        info!(
            committed = stats.committed,
            failed = stats.failed,
            "progress writer drained"
        );
    } else {
        warn!(
            pending = stats.pending,
            "exiting before every progress snapshot was committed"
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.help {
        print_usage();
        return Ok(());
    }

    init_tracing();

    let config = args.config()?;
    // The writer task lives as long as this scope, which is the whole app.
    let (services, _writer_task) = AppServices::new(&config, Clock::default_clock())?;

    let app = DesktopApp {
        backend: services.backend(),
        quiz_loop: services.quiz_loop(),
    };
    let app: Arc<dyn UiApp> = Arc::new(app);
    let context = build_app_context(&app);

    // The event loop never returns; the last event before the process exits
    // is LoopDestroyed.
    let runtime = Handle::current();
    let writer = services.dispatcher();
    let desktop_cfg = DesktopConfig::new()
        .with_window(
            WindowBuilder::new()
                .with_title("Quiz App")
                .with_always_on_top(false),
        )
        .with_custom_event_handler(move |event, _target| {
            if let Event::LoopDestroyed = event {
                drain_progress_on_exit(&runtime, &writer);
            }
        });

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_map_to_config_keys() {
        let args = parse(&["--backend", "github", "--repo", "octo/quizzes", "--require-selection"])
            .unwrap();
        assert_eq!(args.overrides.get(ENV_BACKEND).map(String::as_str), Some("github"));
        assert_eq!(
            args.overrides.get(ENV_GITHUB_REPO).map(String::as_str),
            Some("octo/quizzes")
        );
        assert_eq!(
            args.overrides.get(ENV_REQUIRE_SELECTION).map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["--data-dir"]),
            Err(ArgsError::MissingValue { flag: "--data-dir" })
        ));
        assert!(matches!(
            parse(&["--backend", "s3"]),
            Err(ArgsError::InvalidBackend { .. })
        ));
    }

    #[test]
    fn data_dir_flag_overrides_default() {
        let args = parse(&["--data-dir", "quizzes"]).unwrap();
        let config = args.config().unwrap();
        match config.backend {
            services::BackendConfig::Local { data_dir } => {
                assert_eq!(data_dir, std::path::PathBuf::from("quizzes"));
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }
}
