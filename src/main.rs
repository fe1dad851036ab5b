//! Purpose: `gridpulse` CLI entry point.
//! Role: Binary crate root; parses args, wires the session manager and engine
//! Role: loader, and runs the stdio MCP server.
//! Invariants: stdout carries only protocol or command output; diagnostics and
//! Invariants: logs go to stderr.
//! Invariants: Errors are emitted as JSON on stderr; the process exit code is
//! Invariants: derived from `core::error::to_exit_code`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridpulse::cases;
use gridpulse::config::ServerConfig;
use gridpulse::core::error::{Error, to_exit_code};
use gridpulse::core::session::SessionManager;
use gridpulse::engine::synthetic::SyntheticLoader;
use gridpulse::mcp::McpDispatcher;
use gridpulse::tools::SimToolHandler;

mod stdio;

#[derive(Parser)]
#[command(
    name = "gridpulse",
    version,
    about = "MCP server exposing power system simulation sessions over JSON-RPC"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdio.
    Serve {
        /// Directory containing case files.
        #[arg(long, value_hint = ValueHint::DirPath)]
        cases_dir: Option<PathBuf>,
        /// Maximum concurrently live sessions.
        #[arg(long)]
        max_sessions: Option<usize>,
        /// Idle seconds before a session expires.
        #[arg(long)]
        session_ttl: Option<u64>,
        /// Default bound on returned time-series points (0 disables).
        #[arg(long)]
        max_points: Option<usize>,
    },
    /// List available case files as JSON.
    Cases {
        #[arg(long, value_hint = ValueHint::DirPath)]
        cases_dir: Option<PathBuf>,
    },
    /// Generate shell completions.
    Completions { shell: Shell },
}

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            cases_dir,
            max_sessions,
            session_ttl,
            max_points,
        } => {
            init_tracing();
            let mut config = ServerConfig::new(cases_dir.unwrap_or_else(default_cases_dir));
            if let Some(max_sessions) = max_sessions {
                config.max_sessions = max_sessions.max(1);
            }
            if let Some(session_ttl) = session_ttl {
                config.session_ttl = Duration::from_secs(session_ttl);
            }
            if let Some(max_points) = max_points {
                config.max_result_points = max_points;
            }

            let sessions = Arc::new(SessionManager::new(config.max_sessions, config.session_ttl));
            let handler =
                SimToolHandler::new(config.clone(), sessions, Arc::new(SyntheticLoader));
            let dispatcher = McpDispatcher::new(
                config.server_name(),
                config.server_version(),
                handler,
            );
            info!(
                cases_dir = %config.cases_dir.display(),
                max_sessions = config.max_sessions,
                session_ttl_secs = config.session_ttl.as_secs(),
                "serving MCP on stdio"
            );
            stdio::serve(&dispatcher)
        }
        Command::Cases { cases_dir } => {
            let dir = cases_dir.unwrap_or_else(default_cases_dir);
            let found = cases::list_cases(&dir);
            let payload = json!({
                "cases_dir": dir.display().to_string(),
                "count": found.len(),
                "cases": found,
            });
            println!("{payload}");
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gridpulse", &mut io::stdout());
            Ok(())
        }
    }
}

fn default_cases_dir() -> PathBuf {
    std::env::var_os("GRIDPULSE_CASES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("cases"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    let mut payload = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.caller_message(),
        }
    });
    if let Some(hint) = err.hint() {
        payload["error"]["hint"] = json!(hint);
    }
    eprintln!("{payload}");
}
