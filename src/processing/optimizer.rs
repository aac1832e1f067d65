//! Optimization engine coordinating matching, enumeration, scoring and metrics

use crate::audit::{notify_in_background, AuditEvent, AuditSink};
use crate::config::{ChemistryModel, Config, OptimizationConfig, ScoringConfig, WorkloadStrategy};
use crate::error::{Result, TeamOptimizerError};
use crate::input::store::DocumentStore;
use crate::output::report::{
    OptimizationMode, OptimizationReport, ReportMetadata, TeamConfidence, TeamMemberView, TeamReport,
};
use crate::processing::chemistry::ChemistryCalculator;
use crate::processing::constraints::{parse_constraints, ConstraintSet};
use crate::processing::embeddings::{EmbeddingBackend, SemanticMatcher};
use crate::processing::enumerator::{enumerate_assignments, fallback_assignment};
use crate::processing::model::{Employee, Project};
use crate::processing::recommendations::generate_recommendations;
use crate::processing::scorer::{fallback_candidate, rank, ConstraintScorer, ScoredCandidate};
use crate::processing::workload::WorkloadCalculator;
use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Fit awarded by the basic planner to an employee's first role.
pub const BASIC_FIRST_USE_SCORE: f64 = 0.8;
/// Fit awarded by the basic planner to every further role of the same employee.
pub const BASIC_REPEAT_SCORE: f64 = 0.5;

/// Ranked candidates plus bookkeeping about how they were found.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub teams: Vec<ScoredCandidate>,
    pub confidence: TeamConfidence,
    pub candidates_enumerated: usize,
    pub candidates_surviving: usize,
}

/// Stateless between calls; cheap to clone and share across tasks.
#[derive(Clone)]
pub struct TeamOptimizer {
    matcher: Option<SemanticMatcher>,
    optimization: OptimizationConfig,
    workload_strategy: WorkloadStrategy,
    chemistry_model: ChemistryModel,
    scoring: ScoringConfig,
    seed: Option<u64>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl TeamOptimizer {
    /// `backend` may be `None` when only basic mode will be used.
    pub fn new(config: &Config, backend: Option<Arc<dyn EmbeddingBackend>>) -> Self {
        let matcher =
            backend.map(|backend| SemanticMatcher::new(backend, config.optimization.generic_vocabulary.clone()));

        Self {
            matcher,
            optimization: config.optimization.clone(),
            workload_strategy: config.workload.strategy,
            chemistry_model: config.chemistry.model,
            scoring: config.scoring.clone(),
            seed: config.chemistry.seed,
            audit: None,
        }
    }

    pub fn with_audit(mut self, sink: Option<Arc<dyn AuditSink>>) -> Self {
        self.audit = sink;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// Fetch the project and roster from `store` and optimize the team.
    ///
    /// The CPU-bound work runs on a blocking worker thread and completes
    /// before the result is returned.
    pub async fn optimize<S: DocumentStore>(
        &self,
        store: &S,
        project_id: &str,
        mode: OptimizationMode,
    ) -> Result<OptimizationReport> {
        let project_record = store.project(project_id).await?;
        let employee_records = store.employees().await?;

        let project = Project::from_record(project_id, &project_record);
        let employees: Vec<Employee> = employee_records
            .iter()
            .enumerate()
            .map(|(i, record)| Employee::from_record(record, i))
            .collect();

        info!(
            "Optimizing project '{}' ({} roles, {} employees, {} mode)",
            project.name,
            project.roles.len(),
            employees.len(),
            mode
        );

        let optimizer = self.clone();
        let seed = self.seed;
        let report = tokio::task::spawn_blocking(move || {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            optimizer.evaluate(&project, &employees, mode, &mut rng)
        })
        .await
        .map_err(|e| TeamOptimizerError::Processing(format!("Optimization task failed: {}", e)))??;

        if let Some(sink) = &self.audit {
            let event = AuditEvent::optimize(project_id, &mode.to_string(), report.is_fallback());
            notify_in_background(Arc::clone(sink), event).await;
        }

        Ok(report)
    }

    /// Run one optimization over an already-resolved snapshot.
    pub fn evaluate<R: Rng>(
        &self,
        project: &Project,
        employees: &[Employee],
        mode: OptimizationMode,
        rng: &mut R,
    ) -> Result<OptimizationReport> {
        let start_time = Instant::now();

        if employees.is_empty() {
            return Err(TeamOptimizerError::NoCandidatePool(project.id.clone()));
        }

        let constraints = parse_constraints(&project.constraints);
        if !constraints.ignored.is_empty() {
            info!("Ignored {} unrecognized constraint clause(s)", constraints.ignored.len());
        }

        let (outcome, embedding_model) = match mode {
            OptimizationMode::Advanced => {
                let matcher = self.matcher.as_ref().ok_or_else(|| {
                    TeamOptimizerError::EmbeddingUnavailable("No embedding backend configured".to_string())
                })?;
                let outcome = self.search(project, employees, &constraints, matcher)?;
                (outcome, Some(matcher.model_name().to_string()))
            }
            OptimizationMode::Basic => (self.basic_assignment(project, employees)?, None),
        };

        let (workload_strategy, chemistry_model) = match mode {
            OptimizationMode::Advanced => (self.workload_strategy, self.chemistry_model),
            OptimizationMode::Basic => (WorkloadStrategy::Flat, ChemistryModel::Simple),
        };

        let best = outcome
            .teams
            .first()
            .ok_or_else(|| TeamOptimizerError::NoCandidatePool(project.id.clone()))?;

        let workload_metrics = WorkloadCalculator::new(workload_strategy).calculate(&best.assignment, employees);
        let chemistry_metrics = ChemistryCalculator::new(chemistry_model).calculate(&best.assignment, employees, rng);
        let recommendations = generate_recommendations(&workload_metrics, &chemistry_metrics, best.assignment.len());

        let base_score = match mode {
            OptimizationMode::Advanced => best.total,
            OptimizationMode::Basic => best.total / best.explanations.len().max(1) as f64,
        };
        let overall_score = (base_score
            + workload_metrics.balance_score * self.scoring.workload_bonus_weight
            + chemistry_metrics.overall_chemistry * self.scoring.chemistry_bonus_weight)
            .min(1.0);

        let teams = outcome
            .teams
            .iter()
            .enumerate()
            .map(|(i, candidate)| Self::team_report(i + 1, candidate, project, employees))
            .collect();

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Optimization finished in {}ms: overall score {:.1}%",
            processing_time_ms,
            overall_score * 100.0
        );

        Ok(OptimizationReport {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            mode,
            teams,
            confidence: outcome.confidence,
            workload_metrics,
            chemistry_metrics,
            recommendations,
            overall_score,
            constraints,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                optimizer_version: env!("CARGO_PKG_VERSION").to_string(),
                processing_time_ms,
                embedding_model,
                candidates_enumerated: outcome.candidates_enumerated,
                candidates_surviving: outcome.candidates_surviving,
            },
        })
    }

    /// Enumerate, filter and rank assignments, falling back to a degraded
    /// team when nothing usable survives.
    pub fn search(
        &self,
        project: &Project,
        employees: &[Employee],
        constraints: &ConstraintSet,
        matcher: &SemanticMatcher,
    ) -> Result<SearchOutcome> {
        let role_count = project.roles.len();
        let employee_count = employees.len();

        let matrix = matcher.similarity_matrix(&project.role_labels(), employees)?;

        let candidates = enumerate_assignments(employee_count, role_count, self.optimization.candidate_cap);
        let scorer = ConstraintScorer::new(constraints);
        let surviving: Vec<ScoredCandidate> = candidates
            .iter()
            .enumerate()
            .filter_map(|(order, assignment)| scorer.score(order, assignment, employees, &matrix))
            .collect();

        info!(
            "Enumerated {} candidate(s), {} passed hard constraints",
            candidates.len(),
            surviving.len()
        );

        let candidates_enumerated = candidates.len();
        let candidates_surviving = surviving.len();

        // A lone employee asked to cover several roles leaves nothing to rank.
        let single_person_team = employee_count == 1 && role_count > 1;

        if surviving.is_empty() || single_person_team {
            warn!(
                "No rankable team for project '{}', using fallback assignment",
                project.name
            );
            let assignment = fallback_assignment(employee_count, role_count)
                .ok_or_else(|| TeamOptimizerError::NoCandidatePool(project.id.clone()))?;
            let fallback = fallback_candidate(
                assignment,
                self.optimization.fallback_first_use_score,
                self.optimization.fallback_repeat_score,
            );

            return Ok(SearchOutcome {
                teams: vec![fallback],
                confidence: TeamConfidence::Fallback,
                candidates_enumerated,
                candidates_surviving,
            });
        }

        let teams = rank(surviving, self.optimization.top_k);
        debug!(
            "Top team totals: {:?}",
            teams.iter().map(|t| t.total).collect::<Vec<_>>()
        );

        Ok(SearchOutcome {
            teams,
            confidence: TeamConfidence::Ranked,
            candidates_enumerated,
            candidates_surviving,
        })
    }

    /// Sequential role i <- employee i (mod pool) with fixed scores.
    fn basic_assignment(&self, project: &Project, employees: &[Employee]) -> Result<SearchOutcome> {
        let assignment = fallback_assignment(employees.len(), project.roles.len())
            .ok_or_else(|| TeamOptimizerError::NoCandidatePool(project.id.clone()))?;

        Ok(SearchOutcome {
            teams: vec![fallback_candidate(assignment, BASIC_FIRST_USE_SCORE, BASIC_REPEAT_SCORE)],
            confidence: TeamConfidence::Heuristic,
            candidates_enumerated: 1,
            candidates_surviving: 1,
        })
    }

    fn team_report(rank: usize, candidate: &ScoredCandidate, project: &Project, employees: &[Employee]) -> TeamReport {
        let mut seen = HashSet::new();
        let members = candidate
            .assignment
            .iter()
            .zip(project.roles.iter())
            .map(|(&index, role)| {
                let employee = &employees[index];
                TeamMemberView {
                    name: employee.name.clone(),
                    role: role.role.clone(),
                    skills: employee.skills.clone(),
                    gender: employee.raw_gender.clone(),
                    reused: !seen.insert(index),
                }
            })
            .collect();

        TeamReport {
            rank,
            members,
            explanations: candidate.explanations.clone(),
            total_score: candidate.total,
            diversity_score: candidate.diversity_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::HashingBackend;
    use crate::processing::model::{Gender, RoleRequirement, Skill, SkillLevel};

    fn project(roles: &[&str], constraints: &str) -> Project {
        Project {
            id: "p1".to_string(),
            name: "Apollo".to_string(),
            description: String::new(),
            roles: roles
                .iter()
                .map(|r| RoleRequirement { role: r.to_string(), description: None })
                .collect(),
            constraints: constraints.to_string(),
        }
    }

    fn employee(name: &str, skills: &[(&str, SkillLevel)]) -> Employee {
        Employee {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: String::new(),
            skills: skills
                .iter()
                .map(|(n, l)| Skill { name: n.to_string(), level: Some(*l) })
                .collect(),
            gender: Gender::Other,
            raw_gender: None,
            department: None,
        }
    }

    fn optimizer() -> TeamOptimizer {
        TeamOptimizer::new(&Config::default(), Some(Arc::new(HashingBackend::default())))
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let result = optimizer().evaluate(
            &project(&["Engineer"], ""),
            &[],
            OptimizationMode::Advanced,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(TeamOptimizerError::NoCandidatePool(_))));
    }

    #[test]
    fn test_advanced_without_backend_is_unavailable() {
        let optimizer = TeamOptimizer::new(&Config::default(), None);
        let employees = vec![employee("Alice", &[("rust", SkillLevel::Mid)])];
        let result = optimizer.evaluate(
            &project(&["Engineer"], ""),
            &employees,
            OptimizationMode::Advanced,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(TeamOptimizerError::EmbeddingUnavailable(_))));
    }

    #[test]
    fn test_unsatisfiable_must_have_falls_back() {
        let employees = vec![
            employee("Alice", &[("rust", SkillLevel::Mid)]),
            employee("Bob", &[("go", SkillLevel::Junior)]),
        ];
        let report = optimizer()
            .evaluate(
                &project(&["Engineer", "Reviewer"], "must have cobol"),
                &employees,
                OptimizationMode::Advanced,
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap();

        assert_eq!(report.confidence, TeamConfidence::Fallback);
        assert_eq!(report.teams.len(), 1);
        assert_eq!(report.teams[0].explanations, vec![0.5, 0.5]);
        assert_eq!(report.metadata.candidates_surviving, 0);
    }

    #[test]
    fn test_basic_mode_scores() {
        let employees = vec![
            employee("Alice", &[("rust", SkillLevel::Mid)]),
            employee("Bob", &[("go", SkillLevel::Junior)]),
        ];
        let report = TeamOptimizer::new(&Config::default(), None)
            .evaluate(
                &project(&["A", "B", "C"], ""),
                &employees,
                OptimizationMode::Basic,
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap();

        assert_eq!(report.confidence, TeamConfidence::Heuristic);
        assert_eq!(report.teams[0].explanations, vec![0.8, 0.8, 0.5]);
        assert!(report.teams[0].members[2].reused);
        assert!(report.metadata.embedding_model.is_none());
        assert!(report.overall_score <= 1.0);
    }
}
