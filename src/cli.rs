use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;
use crate::error::ConfigError;

#[derive(Debug, Parser)]
#[command(name = "sentiwatch", version, about = "Render sentiment dashboard data for the web front-end")]
pub struct Cli {
    /// JSON settings file (defaults to ~/.sentiwatch/config.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Explicit settings given on the command line. These win over the config file.
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    #[arg(long, global = true)]
    pub bucket_name: Option<String>,
    #[arg(long, global = true)]
    pub sentiment_key: Option<String>,
    #[arg(long, global = true)]
    pub topic_key: Option<String>,
    #[arg(long, global = true)]
    pub object_store_url: Option<String>,
    #[arg(long, global = true)]
    pub document_store_url: Option<String>,
    #[arg(long, global = true)]
    pub collection: Option<String>,
}

impl SettingsArgs {
    pub fn into_settings(self) -> Settings {
        Settings {
            bucket_name: self.bucket_name,
            sentiment_key: self.sentiment_key,
            topic_key: self.topic_key,
            object_store_url: self.object_store_url,
            document_store_url: self.document_store_url,
            collection: self.collection,
            ..Default::default()
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render once and write the dashboard view as JSON
    Render {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Re-render whenever local object or document store files change
    Watch {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Load a JSON array of stream documents into the document store
    Import {
        /// File holding the documents
        input: PathBuf,
    },
}

impl Cli {
    /// Config file settings overlaid with command-line flags.
    pub fn explicit_settings(self) -> Result<(Settings, Command), ConfigError> {
        let file = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => match Settings::default_path().filter(|p| p.exists()) {
                Some(path) => Settings::from_file(&path)?,
                None => Settings::default(),
            },
        };
        Ok((file.overlay(self.overrides.into_settings()), self.command))
    }
}

pub fn write_output(out: Option<&Path>, body: &str) -> Result<(), String> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            std::fs::write(path, body).map_err(|e| format!("{}: {}", path.display(), e))
        }
        None => {
            println!("{}", body);
            Ok(())
        }
    }
}
