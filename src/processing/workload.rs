//! Workload distribution metrics
//!
//! Workload is a synthetic proxy derived from an employee's skills, not
//! measured effort.

use crate::config::WorkloadStrategy;
use crate::processing::model::{Employee, SkillLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberWorkload {
    pub name: String,
    pub workload: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadMetrics {
    pub total_workload: f64,
    /// One entry per distinct member, in team order.
    pub distribution: Vec<MemberWorkload>,
    pub balance_score: f64,
    pub overloaded_members: Vec<String>,
    pub underutilized_members: Vec<String>,
}

impl WorkloadMetrics {
    pub fn empty() -> Self {
        Self {
            total_workload: 0.0,
            distribution: Vec::new(),
            balance_score: 0.0,
            overloaded_members: Vec::new(),
            underutilized_members: Vec::new(),
        }
    }
}

impl WorkloadStrategy {
    pub fn member_workload(&self, employee: &Employee) -> f64 {
        let skill_count = employee.skills.len() as f64;
        match self {
            WorkloadStrategy::LevelWeighted => {
                let rank_sum: f64 = employee.skills.iter().map(|s| f64::from(SkillLevel::rank(s.level))).sum();
                let avg_level = rank_sum / skill_count.max(1.0);
                skill_count * (1.0 + avg_level * 0.5)
            }
            WorkloadStrategy::Flat => skill_count * 2.0,
        }
    }
}

/// `max(0, 1 - variance / (mean^2 + 1))`
pub fn balance_score(workloads: &[f64]) -> f64 {
    if workloads.is_empty() {
        return 0.0;
    }
    let n = workloads.len() as f64;
    let mean = workloads.iter().sum::<f64>() / n;
    let variance = workloads.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance / (mean * mean + 1.0)).clamp(0.0, 1.0)
}

pub struct WorkloadCalculator {
    strategy: WorkloadStrategy,
}

impl WorkloadCalculator {
    pub fn new(strategy: WorkloadStrategy) -> Self {
        Self { strategy }
    }

    /// `team` holds indices into `employees`. A member filling several roles
    /// is counted once.
    pub fn calculate(&self, team: &[usize], employees: &[Employee]) -> WorkloadMetrics {
        let mut seen = HashSet::new();
        let distribution: Vec<MemberWorkload> = team
            .iter()
            .filter(|&&index| seen.insert(index))
            .map(|&index| MemberWorkload {
                name: employees[index].name.clone(),
                workload: self.strategy.member_workload(&employees[index]),
            })
            .collect();

        if distribution.is_empty() {
            return WorkloadMetrics::empty();
        }

        let workloads: Vec<f64> = distribution.iter().map(|m| m.workload).collect();
        let total_workload: f64 = workloads.iter().sum();
        let mean = total_workload / workloads.len() as f64;

        let overloaded_members = distribution
            .iter()
            .filter(|m| m.workload > mean * 1.5)
            .map(|m| m.name.clone())
            .collect();
        let underutilized_members = distribution
            .iter()
            .filter(|m| m.workload < mean * 0.5)
            .map(|m| m.name.clone())
            .collect();

        WorkloadMetrics {
            total_workload,
            balance_score: balance_score(&workloads),
            distribution,
            overloaded_members,
            underutilized_members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::model::{Gender, Skill};

    fn employee(name: &str, levels: &[Option<SkillLevel>]) -> Employee {
        Employee {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: String::new(),
            skills: levels
                .iter()
                .enumerate()
                .map(|(i, l)| Skill { name: format!("skill-{}", i), level: *l })
                .collect(),
            gender: Gender::Other,
            raw_gender: None,
            department: None,
        }
    }

    #[test]
    fn test_level_weighted_workload() {
        let e = employee("A", &[Some(SkillLevel::Senior), Some(SkillLevel::Junior)]);
        // 2 skills, avg rank 2 -> 2 * (1 + 1)
        assert_eq!(WorkloadStrategy::LevelWeighted.member_workload(&e), 4.0);
        assert_eq!(WorkloadStrategy::Flat.member_workload(&e), 4.0);

        let e = employee("B", &[None, None, None]);
        assert_eq!(WorkloadStrategy::LevelWeighted.member_workload(&e), 3.0);
        assert_eq!(WorkloadStrategy::Flat.member_workload(&e), 6.0);
    }

    #[test]
    fn test_even_team_is_balanced() {
        let employees = vec![
            employee("A", &[Some(SkillLevel::Mid)]),
            employee("B", &[Some(SkillLevel::Mid)]),
        ];
        let metrics = WorkloadCalculator::new(WorkloadStrategy::LevelWeighted).calculate(&[0, 1], &employees);
        assert_eq!(metrics.balance_score, 1.0);
        assert!(metrics.overloaded_members.is_empty());
        assert!(metrics.underutilized_members.is_empty());
    }

    #[test]
    fn test_imbalanced_team_flags_members() {
        let employees = vec![
            employee("Heavy", &[None; 10]),
            employee("Light", &[None]),
            employee("Mid", &[None; 4]),
        ];
        let metrics = WorkloadCalculator::new(WorkloadStrategy::Flat).calculate(&[0, 1, 2], &employees);
        assert_eq!(metrics.total_workload, 30.0);
        assert_eq!(metrics.overloaded_members, vec!["Heavy"]);
        assert_eq!(metrics.underutilized_members, vec!["Light"]);
        assert!(metrics.balance_score >= 0.0 && metrics.balance_score < 1.0);
    }

    #[test]
    fn test_repeated_member_counted_once() {
        let employees = vec![employee("Solo", &[Some(SkillLevel::Senior)])];
        let metrics = WorkloadCalculator::new(WorkloadStrategy::LevelWeighted).calculate(&[0, 0, 0], &employees);
        assert_eq!(metrics.distribution.len(), 1);
        assert_eq!(metrics.balance_score, 1.0);
    }

    #[test]
    fn test_empty_team() {
        let metrics = WorkloadCalculator::new(WorkloadStrategy::Flat).calculate(&[], &[]);
        assert_eq!(metrics, WorkloadMetrics::empty());
    }
}
