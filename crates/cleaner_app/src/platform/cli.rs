//! Command-line definitions. Flags override the stored settings.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use super::settings::Settings;

/// Fill product tables with fields extracted by a chat-completion model.
#[derive(Debug, Parser)]
#[command(name = "cleaner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input CSV table
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output CSV table (written after every batch)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API key for the chat-completion service
    #[arg(long, env = "CLEANER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Read the rule template from this file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Rows per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Concurrent remote calls
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Retries per row for timeouts and server errors
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Chat-completion endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name sent with every request
    #[arg(long)]
    pub model: Option<String>,

    /// Prefix the output with a UTF-8 BOM
    #[arg(long)]
    pub utf8_bom: bool,

    /// Settings file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log file path (defaults to ./cleaner.log)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// On Ctrl-C, drop the in-flight batch instead of saving it
    #[arg(long)]
    pub discard_on_interrupt: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the fields the rule template will generate, then exit
    Fields,
}

impl Cli {
    pub fn apply_overrides(&self, settings: &mut Settings) -> anyhow::Result<()> {
        if let Some(input) = &self.input {
            settings.input_file = input.display().to_string();
        }
        if let Some(output) = &self.output {
            settings.output_file = output.display().to_string();
        }
        if let Some(api_key) = &self.api_key {
            settings.api_key = api_key.clone();
        }
        if let Some(path) = &self.prompt_file {
            settings.prompt = fs::read_to_string(path)
                .with_context(|| format!("reading rule template {}", path.display()))?;
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        if let Some(max_workers) = self.max_workers {
            settings.max_workers = max_workers;
        }
        if let Some(max_retries) = self.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if self.utf8_bom {
            settings.utf8_bom = true;
        }
        Ok(())
    }
}
