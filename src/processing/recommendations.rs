//! Threshold-driven team advice

use crate::processing::chemistry::ChemistryMetrics;
use crate::processing::workload::WorkloadMetrics;

pub const BALANCE_THRESHOLD: f64 = 0.7;
pub const CONFLICT_RISK_THRESHOLD: f64 = 0.6;
pub const COMMUNICATION_THRESHOLD: f64 = 0.7;
pub const COLLABORATION_THRESHOLD: f64 = 0.7;
pub const LARGE_TEAM_SIZE: usize = 5;

pub const WELL_BALANCED: &str = "Team composition looks well-balanced!";

/// Build advice for a team of `team_size` role slots. Never returns an empty list.
pub fn generate_recommendations(
    workload: &WorkloadMetrics,
    chemistry: &ChemistryMetrics,
    team_size: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !workload.overloaded_members.is_empty() {
        recommendations.push(format!(
            "Consider redistributing tasks from {}",
            workload.overloaded_members.join(", ")
        ));
    }

    if !workload.underutilized_members.is_empty() {
        recommendations.push(format!(
            "Assign additional responsibilities to {}",
            workload.underutilized_members.join(", ")
        ));
    }

    if workload.balance_score < BALANCE_THRESHOLD {
        recommendations.push("Workload distribution needs improvement - consider task reallocation".to_string());
    }

    if chemistry.conflict_risk > CONFLICT_RISK_THRESHOLD {
        recommendations.push("High conflict risk detected - consider team building activities".to_string());
    }

    if chemistry.communication_score < COMMUNICATION_THRESHOLD {
        recommendations.push("Communication score is low - implement regular check-ins".to_string());
    }

    if chemistry.collaboration_score < COLLABORATION_THRESHOLD {
        recommendations.push("Collaboration needs improvement - consider pair programming or mentoring".to_string());
    }

    if team_size > LARGE_TEAM_SIZE {
        recommendations.push("Large team size detected - consider breaking into smaller sub-teams".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push(WELL_BALANCED.to_string());
    }

    recommendations
}
