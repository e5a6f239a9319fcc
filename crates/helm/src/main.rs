use anyhow::{Context, anyhow};
use clap::Parser;
use helm_common::platform::Platform;
use helm_engine::Engine;
use helm_engine::cli::{self, FileOptions, OutputHandlers, ReplOptions};
use helm_engine::clock::{Clock, SystemClock};
use helm_engine::config::ConfigLoader;
use helm_engine::executor::{CommandExecutor, ExecutorOptions};
use helm_engine::scheduler::SchedulerRuntime;
use helm_engine::storage::{FileStorage, Storage};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "helm", version, about = "Conversational browser assistant with recurring tasks")]
struct Args {
    /// Config file (defaults to ./helm.yaml, then ~/.helm/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding saved state
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Commands to execute (non-interactive mode)
    #[arg(long)]
    file: Option<String>,

    /// Skip the simulated processing delay
    #[arg(long)]
    no_latency: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so responses on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigLoader::load_default().await,
    };

    let state_dir = args.state_dir.unwrap_or(config.storage.state_dir.clone());
    info!(state_dir = %state_dir.display(), "Using state directory");
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(state_dir));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut engine = Engine::new(storage, clock.clone(), Platform::detect());

    let options = if args.no_latency {
        ExecutorOptions::instant()
    } else {
        config.executor.options()
    };
    let executor = CommandExecutor::new(options);

    let shutdown = CancellationToken::new();
    let runtime = config
        .scheduler
        .enabled
        .then(|| SchedulerRuntime::spawn(engine.scheduler().clone(), clock, shutdown.clone()));

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| eprintln!("{}", msg),
        reveal: |piece| {
            print!("{}", piece);
            let _ = std::io::stdout().flush();
        },
    };
    let repl_options = ReplOptions {
        banner_lines: &[
            "Helm is ready. Try 'search Google for rust async', 'weather in Paris',",
            "'schedule \"News\" to search Google for headlines every 30 minutes' or /help.",
            "Type 'exit' or 'quit' to close. Ctrl-C cancels a running command.",
        ],
        prompt: "> ",
        exit_commands: &["exit", "quit"],
        handle_ctrl_c: true,
        ctrl_c_message: Some("Goodbye."),
    };

    let result = match &args.file {
        Some(file_path) => cli::run_file(
            &mut engine,
            &executor,
            output,
            file_path,
            FileOptions { stop_on_error: true },
        )
        .await
        .map_err(|e| anyhow!("Error executing file {}: {}", file_path, e)),
        None => cli::run_repl(&mut engine, &executor, output, repl_options)
            .await
            .map_err(|e| anyhow!("Error during session: {}", e)),
    };

    shutdown.cancel();
    if let Some(handle) = runtime {
        handle.await.context("Scheduler runtime panicked")?;
    }
    result
}
