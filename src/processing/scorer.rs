//! Constraint checking and fit scoring for candidate assignments

use crate::processing::constraints::ConstraintSet;
use crate::processing::embeddings::SimilarityMatrix;
use crate::processing::enumerator::Assignment;
use crate::processing::model::Employee;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Ceiling applied when an `at_least` or `max` predicate is violated.
pub const HARD_LIMIT_CEILING: f64 = 0.5;
/// Ceiling applied when a `prefer` target is missed.
pub const PREFERENCE_CEILING: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub assignment: Assignment,
    /// Capped per-role fit, aligned with the roles.
    pub explanations: Vec<f64>,
    pub total: f64,
    pub diversity_score: f64,
    /// Position in enumeration order, used for tie-breaking.
    pub order: usize,
}

/// Counts over the distinct employees of one candidate.
///
/// Seniority levels count once per skill carrying that level, so an employee
/// with two senior skills adds 2 to `senior`. Gender and lower-cased skill
/// names count once per employee. Repeat occurrences of an employee add nothing.
#[derive(Debug, Clone, Default)]
pub struct CandidateTally {
    pub counts: HashMap<String, usize>,
    pub skills: HashSet<String>,
}

impl CandidateTally {
    pub fn build(assignment: &[usize], employees: &[Employee]) -> Self {
        let mut tally = Self::default();
        let mut seen = HashSet::new();

        for &index in assignment {
            if !seen.insert(index) {
                continue;
            }
            let employee = &employees[index];

            for level in employee.skill_levels() {
                tally.add(level.as_key());
            }
            tally.add(employee.gender.as_key());

            let names: HashSet<String> = employee.skill_names().collect();
            for skill in names {
                tally.add(&skill);
                tally.skills.insert(skill);
            }
        }

        tally
    }

    fn add(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

/// Round to 3 decimals and clamp into [0, 1].
pub fn fit_score(similarity: f32) -> f64 {
    let rounded = (f64::from(similarity) * 1000.0).round() / 1000.0;
    rounded.clamp(0.0, 1.0)
}

pub struct ConstraintScorer<'a> {
    constraints: &'a ConstraintSet,
}

impl<'a> ConstraintScorer<'a> {
    pub fn new(constraints: &'a ConstraintSet) -> Self {
        Self { constraints }
    }

    /// Every `must_have` skill is held by someone on the team.
    pub fn satisfies_hard_constraints(&self, tally: &CandidateTally) -> bool {
        self.constraints.must_have.iter().all(|skill| tally.skills.contains(skill))
    }

    /// Soft-constraint ceiling. The worst violation wins; penalties do not compound.
    pub fn diversity_score(&self, tally: &CandidateTally) -> f64 {
        let mut score: f64 = 1.0;

        for (key, &minimum) in &self.constraints.at_least {
            if tally.count(key) < minimum {
                score = score.min(HARD_LIMIT_CEILING);
            }
        }
        for (key, &maximum) in &self.constraints.max {
            if tally.count(key) > maximum {
                score = score.min(HARD_LIMIT_CEILING);
            }
        }
        for (key, &target) in &self.constraints.prefer {
            if tally.count(key) < target {
                score = score.min(PREFERENCE_CEILING);
            }
        }

        score
    }

    /// Score one candidate, or `None` when it fails a hard constraint.
    ///
    /// Only an employee's first role earns its fit; later roles held by the
    /// same employee score 0.
    pub fn score(
        &self,
        order: usize,
        assignment: &[usize],
        employees: &[Employee],
        matrix: &SimilarityMatrix,
    ) -> Option<ScoredCandidate> {
        let tally = CandidateTally::build(assignment, employees);
        if !self.satisfies_hard_constraints(&tally) {
            return None;
        }

        let diversity_score = self.diversity_score(&tally);
        let mut seen = HashSet::new();
        let explanations: Vec<f64> = assignment
            .iter()
            .enumerate()
            .map(|(role, &employee)| {
                if seen.insert(employee) {
                    fit_score(matrix.get(role, employee)).min(diversity_score)
                } else {
                    0.0
                }
            })
            .collect();
        let total = explanations.iter().sum();

        Some(ScoredCandidate {
            assignment: assignment.to_vec(),
            explanations,
            total,
            diversity_score,
            order,
        })
    }
}

/// Stable descending sort by total, keeping the first `top_k`.
pub fn rank(mut candidates: Vec<ScoredCandidate>, top_k: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    candidates.truncate(top_k);
    candidates
}

/// Score a fallback assignment: first use of an employee earns `first_use`,
/// later roles held by the same employee earn `repeat`.
pub fn fallback_candidate(assignment: Assignment, first_use: f64, repeat: f64) -> ScoredCandidate {
    let mut seen = HashSet::new();
    let explanations: Vec<f64> = assignment
        .iter()
        .map(|&employee| if seen.insert(employee) { first_use } else { repeat })
        .collect();
    let total = explanations.iter().sum();

    ScoredCandidate {
        assignment,
        explanations,
        total,
        diversity_score: 1.0,
        order: 0,
    }
}
