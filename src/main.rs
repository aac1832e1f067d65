//! Team optimizer: constraint-aware team assignment from the command line

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use team_optimizer::audit::sink_from_config;
use team_optimizer::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use team_optimizer::input::manager::SnapshotLoader;
use team_optimizer::output::report::OptimizationMode;
use team_optimizer::output::{save_report_to_file, ReportGenerator};
use team_optimizer::processing::constraints::parse_constraints;
use team_optimizer::processing::embedding_manager::EmbeddingModelManager;
use team_optimizer::processing::embeddings::{backend_from_config, EmbeddingBackend};
use team_optimizer::processing::TeamOptimizer;
use team_optimizer::{Config, Result, TeamOptimizerError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Optimize {
            snapshot,
            project,
            mode,
            seed,
            output,
            save,
            detailed,
        } => {
            cli::validate_file_extension(&snapshot, &["json", "toml"])
                .map_err(|e| TeamOptimizerError::InvalidInput(format!("Snapshot file: {}", e)))?;
            let mode = cli::parse_mode(&mode).map_err(TeamOptimizerError::InvalidInput)?;
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(TeamOptimizerError::InvalidInput)?,
                None => config.output.format,
            };

            let store = SnapshotLoader::new().open_store(&snapshot).await?;

            let backend: Option<Arc<dyn EmbeddingBackend>> = match mode {
                OptimizationMode::Advanced => {
                    let bar = spinner(&format!("Loading embedding model {}", config.models.embedding_model));
                    let backend = backend_from_config(&config);
                    bar.finish_and_clear();
                    Some(backend?)
                }
                OptimizationMode::Basic => None,
            };

            let optimizer = TeamOptimizer::new(&config, backend)
                .with_seed(seed)
                .with_audit(sink_from_config(&config.audit));

            let bar = spinner(&format!("Optimizing project {}", project));
            let report = optimizer.optimize(&store, &project, mode).await;
            bar.finish_and_clear();
            let report = report?;

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
                true,
            );
            let content = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    save_report_to_file(&content, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", content),
            }
        }

        Commands::Projects { snapshot } => {
            let store = SnapshotLoader::new().open_store(&snapshot).await?;
            let ids = store.project_ids();
            if ids.is_empty() {
                println!("No projects in {}", snapshot.display());
            }
            for id in ids {
                println!("{}", id);
            }
        }

        Commands::Constraints { text } => {
            let constraints = parse_constraints(&text);
            println!("{}", serde_json::to_string_pretty(&constraints)?);
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("Embedding models\n");
                    for (id, info) in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(id) { "downloaded" } else { "available" };
                        println!("  • {} ({}) - {} MB [{}]", id, info.repo_id, info.size_mb, status);
                        println!("    {}", info.description);
                    }
                }

                ModelAction::Download { model, force } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| TeamOptimizerError::NotFound(format!("Unknown model '{}'", model)))?;

                    if manager.is_model_downloaded(&model_id) {
                        if !force {
                            println!("Model '{}' is already downloaded (use --force to re-download)", model_id);
                            return Ok(());
                        }
                        manager.remove_model(&model_id).await?;
                    }

                    let bar = spinner(&format!("Downloading {}", model_id));
                    let result = manager.download_model(&model_id).await;
                    bar.finish_and_clear();
                    let path = result?;
                    println!("Model '{}' downloaded to {}", model_id, path.display());
                }

                ModelAction::Remove { model } => {
                    let model_id = manager.resolve_model_id(&model).unwrap_or(model);
                    manager.remove_model(&model_id).await?;
                    println!("Model '{}' removed", model_id);
                }

                ModelAction::Info { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| TeamOptimizerError::NotFound(format!("Unknown model '{}'", model)))?;
                    if let Some(info) = manager.get_model_info(&model_id) {
                        println!("Name: {}", info.name);
                        println!("Repository: {}", info.repo_id);
                        println!("Size: {} MB", info.size_mb);
                        println!("Dimensions: {}", info.dimensions);
                        println!("Description: {}", info.description);
                    }
                    match manager.get_model_path(&model_id) {
                        Some(path) => println!("Status: downloaded ({})", path.display()),
                        None => println!("Status: not downloaded (team-optimizer models download {})", model_id),
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("# {}\n", config_path.display());
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    TeamOptimizerError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                info!("Configuration reset to defaults at {}", config_path.display());
            }

            Some(ConfigAction::Set { key, value }) => {
                config.set_value(&key, &value)?;
                config.validate()?;
                config.save_to(config_path)?;
                info!("Set {} = {}", key, value);
            }
        },
    }

    Ok(())
}
