mod api;
mod config;
mod driver;
mod session;

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use board::doc::TodoId;
use board::engine::Engine;
use board::geom::Size;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use api::{ApiError, HttpTodoApi, TodoRecord};
use config::{
    Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};
use driver::{DEFAULT_MAX_TICKS, DEFAULT_TICK_MS, ReplayError};
use session::{Session, SyncError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("replay input: {0}")]
    Replay(#[from] ReplayError),
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floatdo", about = "Floating todo board: drive the spatial engine against a todo backend")]
struct Cli {
    #[arg(long, env = "FLOATDO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "FLOATDO_VIEWPORT_WIDTH", default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    viewport_width: f64,

    #[arg(long, env = "FLOATDO_VIEWPORT_HEIGHT", default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    viewport_height: f64,

    #[arg(long, env = "FLOATDO_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[arg(long, env = "FLOATDO_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every todo with its board position as JSON.
    List,
    /// Create one todo.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Flip completion of one todo.
    Toggle { id: TodoId },
    /// Delete one todo.
    Rm { id: TodoId },
    /// Run repulsion until the board is at rest, then save every position.
    Settle(Ticking),
    /// Feed JSON-lines input events through the engine.
    Replay {
        /// Event file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,
        #[command(flatten)]
        ticking: Ticking,
    },
}

#[derive(Args, Debug)]
struct Ticking {
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: usize,

    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = Config::new(
        &cli.base_url,
        Size::new(cli.viewport_width, cli.viewport_height),
        cli.request_timeout_secs,
        cli.connect_timeout_secs,
    )?;
    let api = HttpTodoApi::new(&config)?;
    let mut session = Session::new(Engine::new(config.viewport), Arc::new(api));

    match cli.command {
        Command::List => {
            session.load().await?;
            print_json(&board_records(session.engine()))
        }
        Command::Add { title, description } => {
            let id = session.create(&title, description.as_deref()).await?;
            let record = session
                .engine()
                .snapshot(id)
                .map(|(todo, position)| TodoRecord::from_todo(&todo, position));
            print_json(&record)
        }
        Command::Toggle { id } => {
            session.load().await?;
            let completed = session.toggle(id).await?;
            print_json(&serde_json::json!({ "id": id, "completed": completed }))
        }
        Command::Rm { id } => {
            session.load().await?;
            session.delete(id).await?;
            print_json(&serde_json::json!({ "id": id, "deleted": true }))
        }
        Command::Settle(ticking) => {
            session.load().await?;
            let report = driver::settle(&mut session, ticking.max_ticks, ticking.tick_ms).await;
            print_json(&report)
        }
        Command::Replay { input, ticking } => {
            let events = if input == "-" {
                driver::parse_events(io::stdin().lock())?
            } else {
                let file = File::open(&input).map_err(|source| CliError::Open { path: input.clone(), source })?;
                driver::parse_events(BufReader::new(file))?
            };
            session.load().await?;
            let report = driver::replay(&mut session, events, ticking.tick_ms, ticking.max_ticks).await;
            print_json(&report)
        }
    }
}

fn board_records(engine: &Engine) -> Vec<TodoRecord> {
    engine
        .doc
        .ids()
        .into_iter()
        .filter_map(|id| engine.todo(id).map(|todo| TodoRecord::from_todo(todo, engine.position(id))))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
