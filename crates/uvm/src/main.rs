//! uvm - self-updating version manager
//!
//! This is the main entry point for the uvm command-line interface.

mod cli;
mod commands;
mod context;
mod output;
mod prompt;

use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use std::fs::OpenOptions;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uvm_core::config::HierarchicalConfigLoader;

use cli::{Cli, Commands};
use context::AppContext;

const LOG_FILE: &str = "uvm.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    let log_dir = HierarchicalConfigLoader::new().ok().map(|l| l.log_dir());
    let _log_guard = init_tracing(cli.verbose, log_dir.as_deref());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match run(cli, cancel).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<uvm_core::Error>() {
            // Expected failures are reported, not escalated
            Some(domain) if domain.is_domain() => {
                tracing::error!("{}", domain);
                output::error(&domain.to_string());
                Ok(())
            }
            _ => Err(e),
        },
    }
}

async fn run(mut cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command.take().unwrap_or(Commands::Update) {
        // Local file helpers need no deployment context
        Commands::Hash(args) => commands::hash::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        command => run_in_context(&cli, cancel, command).await,
    }
}

async fn run_in_context(cli: &Cli, cancel: CancellationToken, command: Commands) -> Result<()> {
    let ctx = AppContext::build(cli, cancel)?;
    if let Err(e) = ctx.pipeline.reconcile() {
        tracing::warn!("Could not reconcile the current version marker: {}", e);
    }

    match command {
        Commands::Install(args) => commands::install::run(&ctx, args).await,
        Commands::Use(args) => commands::switch::run(&ctx, args).await,
        Commands::Clean(args) => commands::clean::run(&ctx, args).await,
        Commands::Update => commands::update::run(&ctx).await,
        Commands::SelfUpdate(args) => commands::self_update::run(&ctx, args).await,
        Commands::List => commands::list::run(&ctx),
        Commands::ListRemote => commands::list_remote::run(&ctx).await,
        Commands::Current => commands::current::run(&ctx),
        Commands::Info => commands::info::run(&ctx),
        Commands::Hash(args) => commands::hash::run(args),
        Commands::Generate(args) => commands::generate::run(args),
    }
}

/// Initialize tracing: a debug-level log file, plus stderr with -v
fn init_tracing(verbose: u8, log_dir: Option<&Utf8Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir.and_then(open_log_dir) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir.as_std_path(), LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = (verbose > 0).then(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        });
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    guard
}

/// Log directory, if it exists (or can be created) and the log file is writable
fn open_log_dir(dir: &Utf8Path) -> Option<&Utf8Path> {
    std::fs::create_dir_all(dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .ok()?;
    Some(dir)
}
