use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devflow_core::{AgentClient, Config, Task};

mod app;
mod handler;
mod headless;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_ENV: &str = "DEVFLOW_LOG";

#[derive(Parser)]
#[command(name = "devflow")]
#[command(version, about = "Explain, debug, review, and summarize code with an AI agent")]
struct Cli {
    /// Agent backend base URL (overrides DEVFLOW_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal UI (default)
    Tui,
    /// Run one analysis and print the result
    Run {
        /// explain, debug, review, or summarize
        #[arg(short, long, value_parser = parse_task)]
        task: Option<Task>,
        /// File to analyze (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Error message or stack trace to include
        #[arg(short, long, default_value = "")]
        error: String,
    },
    /// List the available analysis tasks
    Tasks,
}

fn parse_task(s: &str) -> Result<Task, String> {
    Task::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Task::all().iter().map(|t| t.as_str()).collect();
        format!("unknown task '{}' (expected one of: {})", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring config: {}", e);
        Config::new()
    });
    let api_url = config.api_url_with_override(cli.api_url.as_deref());
    let client = AgentClient::new(&api_url);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            init_file_logging();
            tracing::info!(api_url = %client.base_url(), "starting devflow tui");
            run_tui(client, config.default_task()).await?
        }
        Commands::Run { task, file, error } => {
            init_stderr_logging();
            let code = read_code(file.as_ref())?;
            let task = task.unwrap_or_else(|| config.default_task());
            let (report, ok) = headless::run_once(client, task, &code, &error).await?;
            print!("{}", report);
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Tasks => {
            for task in Task::all() {
                println!(
                    "{:<10} {:<16} {}",
                    task.as_str(),
                    task.display_name(),
                    task.description()
                );
            }
        }
    }

    Ok(())
}

async fn run_tui(client: AgentClient, task: Task) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client, task);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn read_code(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// The terminal owns stderr while the UI runs, so logs go to a file.
/// Without a writable cache directory the UI still starts, unlogged.
fn init_file_logging() {
    let log_file = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))
        .and_then(|dir| open_log_file(&dir.join("devflow")));

    match log_file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter("info"))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => eprintln!("Logging disabled: {:#}", e),
    }
}

fn open_log_file(log_dir: &Path) -> Result<File> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Could not create {}", log_dir.display()))?;
    let path = log_dir.join("devflow.log");
    File::create(&path).with_context(|| format!("Could not open {}", path.display()))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_error_lists_choices() {
        assert_eq!(parse_task("Debug"), Ok(Task::Debug));
        let err = parse_task("lint").unwrap_err();
        assert!(err.contains("explain, debug, review, summarize"));
    }

    #[test]
    fn test_cli_run_arguments() {
        let cli = Cli::try_parse_from([
            "devflow", "run", "--task", "debug", "--error", "ZeroDivisionError", "--api-url",
            "http://agent.local:9000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://agent.local:9000"));
        match cli.command {
            Some(Commands::Run { task, file, error }) => {
                assert_eq!(task, Some(Task::Debug));
                assert!(file.is_none());
                assert_eq!(error, "ZeroDivisionError");
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_tui() {
        let cli = Cli::try_parse_from(["devflow"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_open_log_file_reports_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        assert!(open_log_file(&blocker.join("devflow")).is_err());

        open_log_file(&dir.path().join("devflow")).unwrap();
        assert!(dir.path().join("devflow").join("devflow.log").exists());
    }

    #[test]
    fn test_read_code_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snippet.py");
        fs::write(&path, "def f(): return x/0\n").unwrap();

        assert_eq!(read_code(Some(&path)).unwrap(), "def f(): return x/0\n");
        assert!(read_code(Some(&dir.path().join("missing.py"))).is_err());
    }
}
