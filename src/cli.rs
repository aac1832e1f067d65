//! CLI interface for the team optimizer

use crate::config::OutputFormat;
use crate::output::report::OptimizationMode;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "team-optimizer")]
#[command(about = "Constraint-aware team assignment search and scoring")]
#[command(long_about = "Match employees to project roles with semantic embeddings, enforce staffing constraints, and score workload balance and team chemistry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble and rank teams for a project
    Optimize {
        /// Snapshot file holding projects and employees (JSON, TOML)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Project id within the snapshot
        #[arg(short, long)]
        project: String,

        /// Optimization mode: advanced, basic
        #[arg(short, long, default_value = "advanced")]
        mode: String,

        /// Seed for the chemistry noise source
        #[arg(long)]
        seed: Option<u64>,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Show every ranked team and full metrics
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the projects in a snapshot
    Projects {
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Parse a constraint string and print the resulting predicates
    Constraints {
        /// e.g. "at least 2 senior, max 1 junior, must have python"
        text: String,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download a model
    Download {
        /// Model id, name or Hugging Face repo id
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove { model: String },

    /// Show model information
    Info { model: String },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "chemistry.seed")
        key: String,

        value: String,
    },
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}

pub fn parse_mode(mode: &str) -> Result<OptimizationMode, String> {
    match mode.to_lowercase().as_str() {
        "advanced" => Ok(OptimizationMode::Advanced),
        "basic" | "simple" => Ok(OptimizationMode::Basic),
        _ => Err(format!("Invalid mode: {}. Supported: advanced, basic", mode)),
    }
}

pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed_extensions.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            allowed_extensions.join(", ")
        )),
        None => Err("File has no extension".to_string()),
    }
}
