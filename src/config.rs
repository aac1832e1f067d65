//! Configuration management for the team optimizer

use crate::error::{Result, TeamOptimizerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on the number of assignments enumerated per project.
pub const MAX_CANDIDATE_CAP: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub optimization: OptimizationConfig,
    pub workload: WorkloadConfig,
    pub chemistry: ChemistryConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
    pub backend: EmbeddingBackendKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackendKind {
    /// Pretrained Model2Vec static embeddings loaded from `models_dir`.
    Model2vec,
    /// Offline feature-hashing embedder, no model files required.
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Hard cap on enumerated candidate assignments per request.
    pub candidate_cap: usize,
    /// Number of ranked teams returned.
    pub top_k: usize,
    /// Appended to every employee skill profile before embedding.
    pub generic_vocabulary: Vec<String>,
    pub fallback_first_use_score: f64,
    pub fallback_repeat_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub strategy: WorkloadStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStrategy {
    /// `skill_count * (1 + avg_level_rank * 0.5)`
    LevelWeighted,
    /// `skill_count * 2`
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemistryConfig {
    pub model: ChemistryModel,
    /// Pins the chemistry noise source. `None` draws a fresh seed per request.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemistryModel {
    /// Noise-perturbed base scores folded with skill overlap and gender diversity.
    Composite,
    /// Noise-perturbed base scores only.
    Simple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub workload_bonus_weight: f64,
    pub chemistry_bonus_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub enabled: bool,
    /// JSON-lines file receiving audit events. Events go to the log when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".team-optimizer")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-base-8M".to_string(),
                backend: EmbeddingBackendKind::Model2vec,
            },
            optimization: OptimizationConfig::default(),
            workload: WorkloadConfig {
                strategy: WorkloadStrategy::LevelWeighted,
            },
            chemistry: ChemistryConfig {
                model: ChemistryModel::Composite,
                seed: None,
            },
            scoring: ScoringConfig {
                workload_bonus_weight: 0.2,
                chemistry_bonus_weight: 0.3,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
            audit: AuditConfig {
                enabled: true,
                log_path: None,
            },
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            candidate_cap: 1000,
            top_k: 3,
            generic_vocabulary: ["programming", "development", "software", "technical"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_first_use_score: 0.5,
            fallback_repeat_score: 0.3,
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first use.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| TeamOptimizerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TeamOptimizerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("team-optimizer")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CANDIDATE_CAP).contains(&self.optimization.candidate_cap) {
            return Err(TeamOptimizerError::Configuration(format!(
                "optimization.candidate_cap must be within [1, {}], got {}",
                MAX_CANDIDATE_CAP, self.optimization.candidate_cap
            )));
        }
        if self.optimization.top_k == 0 {
            return Err(TeamOptimizerError::Configuration(
                "optimization.top_k must be at least 1".to_string(),
            ));
        }
        for (key, value) in [
            ("optimization.fallback_first_use_score", self.optimization.fallback_first_use_score),
            ("optimization.fallback_repeat_score", self.optimization.fallback_repeat_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TeamOptimizerError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }

    /// Set a single value addressed by a dotted key, e.g. `workload.strategy`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |expected: &str| {
            TeamOptimizerError::Configuration(format!(
                "Invalid value '{}' for {}: expected {}",
                value, key, expected
            ))
        };

        match key {
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "models.embedding_model" => self.models.embedding_model = value.to_string(),
            "models.backend" => {
                self.models.backend = match value.to_lowercase().as_str() {
                    "model2vec" => EmbeddingBackendKind::Model2vec,
                    "hashing" => EmbeddingBackendKind::Hashing,
                    _ => return Err(invalid("model2vec or hashing")),
                }
            }
            "optimization.candidate_cap" => {
                self.optimization.candidate_cap = value.parse().map_err(|_| invalid("an integer"))?
            }
            "optimization.top_k" => {
                self.optimization.top_k = value.parse().map_err(|_| invalid("an integer"))?
            }
            "optimization.generic_vocabulary" => {
                self.optimization.generic_vocabulary = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }
            "workload.strategy" => {
                self.workload.strategy = match value.to_lowercase().as_str() {
                    "level_weighted" => WorkloadStrategy::LevelWeighted,
                    "flat" => WorkloadStrategy::Flat,
                    _ => return Err(invalid("level_weighted or flat")),
                }
            }
            "chemistry.model" => {
                self.chemistry.model = match value.to_lowercase().as_str() {
                    "composite" => ChemistryModel::Composite,
                    "simple" => ChemistryModel::Simple,
                    _ => return Err(invalid("composite or simple")),
                }
            }
            "chemistry.seed" => {
                self.chemistry.seed = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid("an integer or 'none'"))?)
                }
            }
            "scoring.workload_bonus_weight" => {
                self.scoring.workload_bonus_weight = value.parse().map_err(|_| invalid("a number"))?
            }
            "scoring.chemistry_bonus_weight" => {
                self.scoring.chemistry_bonus_weight = value.parse().map_err(|_| invalid("a number"))?
            }
            "output.format" => {
                self.output.format =
                    crate::cli::parse_output_format(value).map_err(TeamOptimizerError::Configuration)?
            }
            "output.detailed" => self.output.detailed = value.parse().map_err(|_| invalid("true or false"))?,
            "output.color_output" => {
                self.output.color_output = value.parse().map_err(|_| invalid("true or false"))?
            }
            "audit.enabled" => self.audit.enabled = value.parse().map_err(|_| invalid("true or false"))?,
            "audit.log_path" => {
                self.audit.log_path = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => {
                return Err(TeamOptimizerError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        self.validate()
    }
}
