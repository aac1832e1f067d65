//! End-to-end optimizer tests over snapshot fixtures

use std::path::PathBuf;
use std::sync::Arc;
use team_optimizer::audit::{AuditEvent, AuditSink, JsonlAuditSink};
use team_optimizer::input::manager::SnapshotLoader;
use team_optimizer::input::store::{EmployeeRecord, ProjectRecord, RoleRecord, SkillRecord, Snapshot, SnapshotStore};
use team_optimizer::output::report::{OptimizationMode, TeamConfidence};
use team_optimizer::processing::embeddings::EmbeddingBackend;
use team_optimizer::processing::TeamOptimizer;
use team_optimizer::{Config, Result, TeamOptimizerError};
use tempfile::TempDir;

/// Bag-of-topics embedder: backend, design and infrastructure words plus a bias term.
struct TopicBackend;

const TOPICS: [&[&str]; 3] = [
    &["python", "backend"],
    &["design", "figma"],
    &["go", "kubernetes", "platform"],
];

impl EmbeddingBackend for TopicBackend {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let lowered = text.to_lowercase();
                let words: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
                let mut vector: Vec<f32> = TOPICS
                    .iter()
                    .map(|topic| {
                        words
                            .iter()
                            .filter(|w| topic.iter().any(|k| w.starts_with(k)))
                            .count() as f32
                    })
                    .collect();
                vector.push(1.0);
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "topic-stub"
    }
}

struct OfflineBackend;

impl EmbeddingBackend for OfflineBackend {
    fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(TeamOptimizerError::EmbeddingUnavailable("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

async fn company_store() -> SnapshotStore {
    SnapshotLoader::new().open_store(&fixture("company.json")).await.unwrap()
}

fn optimizer() -> TeamOptimizer {
    TeamOptimizer::new(&Config::default(), Some(Arc::new(TopicBackend))).with_seed(Some(42))
}

fn employee(name: &str, gender: &str, skills: &[(&str, &str)]) -> EmployeeRecord {
    EmployeeRecord {
        id: None,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        skills: skills
            .iter()
            .map(|(n, l)| SkillRecord { name: n.to_string(), level: Some(l.to_string()) })
            .collect(),
        gender: Some(gender.to_string()),
        department: None,
    }
}

fn single_project_store(roles: &[&str], constraints: &str, employees: Vec<EmployeeRecord>) -> SnapshotStore {
    let mut snapshot = Snapshot::default();
    snapshot.projects.insert(
        "p1".to_string(),
        ProjectRecord {
            name: "Test Project".to_string(),
            description: String::new(),
            required_roles: roles
                .iter()
                .map(|r| RoleRecord { role: r.to_string(), description: None })
                .collect(),
            constraints: Some(constraints.to_string()),
        },
    );
    snapshot.employees = employees;
    SnapshotStore::new(Arc::new(snapshot))
}

#[tokio::test]
async fn test_must_have_skill_holder_is_on_every_team() {
    let store = company_store().await;
    let report = optimizer()
        .optimize(&store, "apollo", OptimizationMode::Advanced)
        .await
        .unwrap();

    assert_eq!(report.confidence, TeamConfidence::Ranked);
    assert_eq!(report.metadata.candidates_enumerated, 6);
    // Only the four permutations that place Alice survive.
    assert_eq!(report.metadata.candidates_surviving, 4);
    assert_eq!(report.teams.len(), 3);

    for team in &report.teams {
        assert!(team.members.iter().any(|m| m.name == "Alice"));
        assert_eq!(team.members[0].role, "Backend Engineer");
        assert_eq!(team.members[1].role, "Designer");
    }

    let best = report.best_team().unwrap();
    assert_eq!(best.members[0].name, "Alice");
    assert_eq!(best.members[1].name, "Bob");
    assert!((best.explanations[0] - 0.816).abs() < 1e-9);
    assert!((best.explanations[1] - 1.0).abs() < 1e-9);
    assert_eq!(report.metadata.embedding_model.as_deref(), Some("topic-stub"));
}

#[tokio::test]
async fn test_ranking_is_non_increasing_and_capped_by_diversity() {
    let store = company_store().await;
    for project in ["apollo", "platform"] {
        let report = optimizer()
            .optimize(&store, project, OptimizationMode::Advanced)
            .await
            .unwrap();

        assert!(report.teams.len() <= 3);
        for pair in report.teams.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
        for team in &report.teams {
            for score in &team.explanations {
                assert!(*score >= 0.0 && *score <= team.diversity_score);
            }
        }
        assert!(report.overall_score >= 0.0 && report.overall_score <= 1.0);
    }
}

#[tokio::test]
async fn test_tie_break_follows_enumeration_order() {
    let store = company_store().await;
    let report = optimizer()
        .optimize(&store, "apollo", OptimizationMode::Advanced)
        .await
        .unwrap();

    // [Alice, Carol] and [Carol, Alice] tie; the earlier permutation wins.
    let third = &report.teams[2];
    assert_eq!(third.members[0].name, "Alice");
    assert_eq!(third.members[1].name, "Carol");
}

#[tokio::test]
async fn test_blank_roles_and_unknown_clauses_are_skipped() {
    let store = company_store().await;
    let report = optimizer()
        .optimize(&store, "platform", OptimizationMode::Advanced)
        .await
        .unwrap();

    assert_eq!(report.best_team().unwrap().members.len(), 2);
    assert_eq!(report.constraints.at_least.get("female"), Some(&2));
    assert_eq!(report.constraints.max.get("junior"), Some(&1));
    assert_eq!(report.constraints.ignored.len(), 1);

    // Alice and Carol are the only pair with two women on the team.
    let best = report.best_team().unwrap();
    assert_eq!(best.diversity_score, 1.0);
    let mut names: Vec<&str> = best.members.iter().map(|m| m.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[tokio::test]
async fn test_unsatisfiable_must_have_uses_marked_fallback() {
    let store = company_store().await;
    let report = optimizer()
        .optimize(&store, "mainframe", OptimizationMode::Advanced)
        .await
        .unwrap();

    assert!(report.is_fallback());
    assert_eq!(report.metadata.candidates_surviving, 0);
    assert_eq!(report.teams.len(), 1);
    assert_eq!(report.teams[0].explanations, vec![0.5, 0.5]);
    assert_eq!(report.teams[0].members[0].name, "Alice");
    assert_eq!(report.teams[0].members[1].name, "Bob");
}

#[tokio::test]
async fn test_single_employee_covers_every_role() {
    let store = single_project_store(
        &["Backend Engineer", "Designer", "Platform Engineer"],
        "",
        vec![employee("Solo", "female", &[("python", "senior")])],
    );
    let report = optimizer()
        .optimize(&store, "p1", OptimizationMode::Advanced)
        .await
        .unwrap();

    assert_eq!(report.confidence, TeamConfidence::Fallback);
    let team = &report.teams[0];
    assert_eq!(team.explanations, vec![0.5, 0.3, 0.3]);
    assert!(team.members.iter().all(|m| m.name == "Solo"));
    assert!(!team.members[0].reused);
    assert!(team.members[1].reused && team.members[2].reused);

    // One distinct person: chemistry is perfect by definition.
    let chemistry = &report.chemistry_metrics;
    assert_eq!(
        [
            chemistry.overall_chemistry,
            chemistry.communication_score,
            chemistry.collaboration_score,
            chemistry.conflict_risk,
            chemistry.team_cohesion
        ],
        [1.0, 1.0, 1.0, 0.0, 1.0]
    );
}

#[tokio::test]
async fn test_more_roles_than_people_rewards_distinct_members() {
    let store = single_project_store(
        &["Backend Engineer", "Product Designer", "Python Developer"],
        "",
        vec![
            employee("Alice", "female", &[("python", "senior")]),
            employee("Bob", "male", &[("figma", "mid")]),
        ],
    );
    let report = optimizer()
        .optimize(&store, "p1", OptimizationMode::Advanced)
        .await
        .unwrap();

    assert_eq!(report.confidence, TeamConfidence::Ranked);
    assert_eq!(report.metadata.candidates_enumerated, 8);

    for team in &report.teams {
        for (member, score) in team.members.iter().zip(&team.explanations) {
            if member.reused {
                assert_eq!(*score, 0.0);
            }
        }
    }

    // Alice on both Python roles would score 3.0 if repeats kept their fit.
    let best = report.best_team().unwrap();
    let names: Vec<&str> = best.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Alice"]);
    assert!(best.members[2].reused);
    assert_eq!(best.explanations, vec![1.0, 1.0, 0.0]);
    assert!((best.total_score - 2.0).abs() < 1e-9);
    assert!(report.teams.iter().all(|t| t.total_score <= best.total_score));
}

#[tokio::test]
async fn test_violated_max_floors_diversity() {
    let store = single_project_store(
        &["Lead", "Architect"],
        "max 1 senior, prefer 2 female",
        vec![
            employee("Dana", "female", &[("python", "senior")]),
            employee("Erin", "female", &[("go", "senior")]),
        ],
    );
    let report = optimizer()
        .optimize(&store, "p1", OptimizationMode::Advanced)
        .await
        .unwrap();

    for team in &report.teams {
        assert!(team.diversity_score <= 0.5);
        assert!(team.explanations.iter().all(|s| *s <= 0.5));
    }
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let store = company_store().await;
    let result = optimizer().optimize(&store, "atlantis", OptimizationMode::Advanced).await;
    assert!(matches!(result, Err(TeamOptimizerError::NotFound(_))));
}

#[tokio::test]
async fn test_empty_roster_is_no_candidate_pool() {
    let store = single_project_store(&["Backend Engineer"], "", Vec::new());
    for mode in [OptimizationMode::Advanced, OptimizationMode::Basic] {
        let result = optimizer().optimize(&store, "p1", mode).await;
        assert!(matches!(result, Err(TeamOptimizerError::NoCandidatePool(_))));
    }
}

#[tokio::test]
async fn test_embedding_outage_is_fatal() {
    let store = company_store().await;
    let optimizer = TeamOptimizer::new(&Config::default(), Some(Arc::new(OfflineBackend)));
    let result = optimizer.optimize(&store, "apollo", OptimizationMode::Advanced).await;
    assert!(matches!(result, Err(TeamOptimizerError::EmbeddingUnavailable(_))));
}

#[tokio::test]
async fn test_seed_pins_chemistry() {
    let store = company_store().await;
    let first = optimizer().optimize(&store, "apollo", OptimizationMode::Advanced).await.unwrap();
    let second = optimizer().optimize(&store, "apollo", OptimizationMode::Advanced).await.unwrap();
    assert_eq!(first.chemistry_metrics, second.chemistry_metrics);
    assert_eq!(first.overall_score, second.overall_score);
}

#[tokio::test]
async fn test_basic_mode_needs_no_embeddings() {
    let store = company_store().await;
    let optimizer = TeamOptimizer::new(&Config::default(), None).with_seed(Some(1));
    let report = optimizer.optimize(&store, "apollo", OptimizationMode::Basic).await.unwrap();

    assert_eq!(report.confidence, TeamConfidence::Heuristic);
    let team = report.best_team().unwrap();
    assert_eq!(team.members[0].name, "Alice");
    assert_eq!(team.members[1].name, "Bob");
    assert_eq!(team.explanations, vec![0.8, 0.8]);
    assert!(report.metadata.embedding_model.is_none());
    assert!(!report.recommendations.is_empty());
}

#[tokio::test]
async fn test_audit_event_is_recorded_after_optimization() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("audit.jsonl");
    let sink: Arc<dyn AuditSink> = Arc::new(JsonlAuditSink::new(log_path.clone()));

    let store = company_store().await;
    optimizer()
        .with_audit(Some(sink))
        .optimize(&store, "mainframe", OptimizationMode::Advanced)
        .await
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let events: Vec<AuditEvent> = content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].project_id, "mainframe");
    assert_eq!(events[0].mode, "advanced");
    assert!(events[0].fallback);
}

#[tokio::test]
async fn test_broken_audit_sink_does_not_fail_optimization() {
    let temp_dir = TempDir::new().unwrap();
    // A directory where the log file should be makes every append fail.
    let log_path = temp_dir.path().join("blocked");
    std::fs::create_dir_all(&log_path).unwrap();
    let sink: Arc<dyn AuditSink> = Arc::new(JsonlAuditSink::new(log_path));

    let store = company_store().await;
    let report = optimizer()
        .with_audit(Some(sink))
        .optimize(&store, "apollo", OptimizationMode::Advanced)
        .await;
    assert!(report.is_ok());
}
