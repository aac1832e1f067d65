//! Report structures produced by an optimization run

use crate::processing::chemistry::ChemistryMetrics;
use crate::processing::constraints::ConstraintSet;
use crate::processing::model::{Skill, SkillLevel};
use crate::processing::workload::WorkloadMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete result of one optimization call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub project_id: String,
    pub project_name: String,

    pub mode: OptimizationMode,

    /// Ranked teams, best first. Members are aligned with the project roles.
    pub teams: Vec<TeamReport>,

    /// Whether the best team came from ranking or from the degraded fallback
    pub confidence: TeamConfidence,

    /// Metrics and advice for the best team
    pub workload_metrics: WorkloadMetrics,
    pub chemistry_metrics: ChemistryMetrics,
    pub recommendations: Vec<String>,

    /// `min(1, raw fit sum + workload bonus + chemistry bonus)`
    pub overall_score: f64,

    pub constraints: ConstraintSet,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    /// Embedding-driven enumeration, constraint scoring and ranking
    Advanced,
    /// Sequential assignment without embeddings
    Basic,
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationMode::Advanced => write!(f, "advanced"),
            OptimizationMode::Basic => write!(f, "basic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamConfidence {
    /// Best of the enumerated candidates that passed every hard constraint
    Ranked,
    /// Deterministic placeholder assignment with fixed low scores
    Fallback,
    /// Sequential assignment from basic mode, never ranked
    Heuristic,
}

impl fmt::Display for TeamConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamConfidence::Ranked => write!(f, "ranked"),
            TeamConfidence::Fallback => write!(f, "fallback"),
            TeamConfidence::Heuristic => write!(f, "heuristic"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamReport {
    /// 1-based rank
    pub rank: usize,
    pub members: Vec<TeamMemberView>,
    /// Per-role capped fit scores
    pub explanations: Vec<f64>,
    pub total_score: f64,
    pub diversity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberView {
    pub name: String,
    pub role: String,
    pub skills: Vec<Skill>,
    pub gender: Option<String>,
    /// True when this member already holds an earlier role in the same team
    pub reused: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub optimizer_version: String,
    pub processing_time_ms: u64,
    pub embedding_model: Option<String>,
    pub candidates_enumerated: usize,
    pub candidates_surviving: usize,
}

impl OptimizationReport {
    pub fn best_team(&self) -> Option<&TeamReport> {
        self.teams.first()
    }

    pub fn is_fallback(&self) -> bool {
        self.confidence == TeamConfidence::Fallback
    }

    pub fn overall_score_percentage(&self) -> u8 {
        (self.overall_score.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_fallback() {
            return "No ranked team satisfied the constraints; showing a placeholder assignment";
        }
        match self.overall_score_percentage() {
            90..=100 => "Excellent team fit",
            75..=89 => "Strong team fit",
            60..=74 => "Workable team with some gaps",
            _ => "Weak team fit, review role coverage",
        }
    }
}

/// Compact `name (level)` list for display.
pub fn format_skills(skills: &[Skill]) -> String {
    skills
        .iter()
        .map(|s| match s.level {
            Some(level) => format!("{} ({})", s.name, SkillLevel::as_key(&level)),
            None => s.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
