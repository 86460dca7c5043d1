pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod keychain;
pub mod loaders;
pub mod migrations;
pub mod store;
pub mod timestamp;
pub mod types;
pub mod watcher;

use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::store::sqlite::SqliteDocumentStore;

const DEFAULT_LOG_FILTER: &str = "sentiwatch=info,sentiwatch_lib=info";

/// Structured logging to stderr. Honors RUST_LOG; otherwise `info` for both
/// the binary and the library targets.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())
    } else {
        serde_json::to_string(value).map_err(|e| e.to_string())
    }
}

/// Render once and write the view. A failed render writes an error body
/// so the front-end shows an error state instead of stale or partial charts.
fn render_to(dashboard: &Dashboard, out: Option<&Path>, pretty: bool) -> Result<(), String> {
    let body = match dashboard.render() {
        Ok(view) => to_json(&view, pretty)?,
        Err(e) => {
            error!(error = %e, "Render failed");
            let body = to_json(&serde_json::json!({ "error": e.to_string() }), pretty)?;
            cli::write_output(out, &body)?;
            return Err(e.to_string());
        }
    };
    cli::write_output(out, &body)
}

fn watch(dashboard: &Dashboard, out: &Path, pretty: bool) -> Result<(), String> {
    let _ = render_to(dashboard, Some(out), pretty);

    let (tx, rx) = mpsc::channel();
    let targets =
        watcher::WatchTargets::from_config(dashboard.config()).map_err(|e| e.to_string())?;
    if targets.objects_root.is_none() {
        warn!("Object store is remote; only document store changes trigger renders");
    }
    let _watcher = watcher::create_watcher(tx, targets).map_err(|e| e.to_string())?;
    info!(out = %out.display(), "Watching for store changes");

    while let Ok(event) = rx.recv() {
        // Coalesce bursts (a write usually touches the db and its WAL).
        while rx.try_recv().is_ok() {}
        info!(?event, "Store changed, re-rendering");
        let _ = render_to(dashboard, Some(out), pretty);
    }
    Ok(())
}

/// Load a JSON array of stream documents into the configured collection.
fn import(config: &AppConfig, input: &Path) -> Result<(), String> {
    let payload = std::fs::read(input).map_err(|e| format!("{}: {}", input.display(), e))?;
    let db_path = config.document_store.path().map_err(|e| e.to_string())?;
    let store = SqliteDocumentStore::create(&db_path).map_err(|e| e.to_string())?;
    let count = store
        .import_json(&config.collection, &payload)
        .map_err(|e| e.to_string())?;
    info!(collection = %config.collection, documents = count, "Imported stream documents");
    Ok(())
}

pub fn run() -> ExitCode {
    init_tracing();

    // Environment settings may live in a .env file next to the working directory
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (explicit, command) = match cli.explicit_settings() {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = %e, "Failed to load settings");
            return ExitCode::FAILURE;
        }
    };
    let config = match AppConfig::from_environment(&explicit) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to resolve configuration");
            return ExitCode::FAILURE;
        }
    };
    let result = match command {
        Command::Render { out, pretty } => {
            render_to(&Dashboard::new(config), out.as_deref(), pretty)
        }
        Command::Watch { out, pretty } => watch(&Dashboard::new(config), &out, pretty),
        Command::Import { input } => import(&config, &input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sentiwatch failed");
            ExitCode::FAILURE
        }
    }
}
