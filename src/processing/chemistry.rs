//! Team chemistry heuristics
//!
//! There is no real signal source for communication or collaboration quality.
//! Those two scores are base constants perturbed by bounded noise drawn from
//! the caller-supplied RNG, so a seeded RNG pins every output. Skill overlap
//! and gender diversity are derived from the team itself.
//!
//! Every output lies in [0, 1]. Conflict risk falls as skill cohesion rises.

use crate::config::ChemistryModel;
use crate::processing::model::Employee;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemistryMetrics {
    pub overall_chemistry: f64,
    pub communication_score: f64,
    pub collaboration_score: f64,
    pub conflict_risk: f64,
    pub team_cohesion: f64,
}

impl ChemistryMetrics {
    /// A team of fewer than two people has no pairwise relationships to score.
    pub fn perfect() -> Self {
        Self {
            overall_chemistry: 1.0,
            communication_score: 1.0,
            collaboration_score: 1.0,
            conflict_risk: 0.0,
            team_cohesion: 1.0,
        }
    }
}

pub struct ChemistryCalculator {
    model: ChemistryModel,
}

impl ChemistryCalculator {
    pub fn new(model: ChemistryModel) -> Self {
        Self { model }
    }

    /// `team` holds indices into `employees`; repeated members count once.
    pub fn calculate<R: Rng>(&self, team: &[usize], employees: &[Employee], rng: &mut R) -> ChemistryMetrics {
        let mut seen = HashSet::new();
        let members: Vec<&Employee> = team
            .iter()
            .filter(|&&index| seen.insert(index))
            .map(|&index| &employees[index])
            .collect();

        if members.len() < 2 {
            return ChemistryMetrics::perfect();
        }

        let communication_score = clamp01(0.8 + rng.random_range(-0.2..=0.2));
        let collaboration_score = clamp01(0.75 + rng.random_range(-0.25..=0.25));

        let (conflict_risk, team_cohesion) = match self.model {
            ChemistryModel::Composite => {
                let skill_cohesion = skill_cohesion(&members);
                let diversity = gender_diversity(&members);
                let workload_variance = 0.3 + rng.random_range(-0.2..=0.2);

                let conflict_risk = clamp01(workload_variance * (1.0 - skill_cohesion));
                let team_cohesion = (communication_score + collaboration_score + skill_cohesion + diversity) / 4.0;
                (conflict_risk, team_cohesion)
            }
            ChemistryModel::Simple => {
                let conflict_risk = rng.random_range(0.1..=0.4);
                (conflict_risk, (communication_score + collaboration_score) / 2.0)
            }
        };

        let team_cohesion = clamp01(team_cohesion);
        ChemistryMetrics {
            overall_chemistry: clamp01(team_cohesion * (1.0 - conflict_risk * 0.5)),
            communication_score,
            collaboration_score,
            conflict_risk,
            team_cohesion,
        }
    }
}

/// Duplicate skill names across members, normalised by team size and capped at 1.
pub fn skill_cohesion(members: &[&Employee]) -> f64 {
    let all_skills: Vec<String> = members.iter().flat_map(|m| m.skill_names()).collect();
    let distinct: HashSet<&String> = all_skills.iter().collect();
    let overlap = (all_skills.len() - distinct.len()) as f64;
    (overlap / members.len().max(1) as f64).min(1.0)
}

/// Distinct genders divided by member count.
pub fn gender_diversity(members: &[&Employee]) -> f64 {
    let genders: HashSet<_> = members.iter().map(|m| m.gender).collect();
    genders.len() as f64 / members.len().max(1) as f64
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
