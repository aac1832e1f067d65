//! Document store boundary
//!
//! Persistence lives outside the engine. The optimizer only needs key lookups
//! for a project and the full current employee roster, expressed by
//! [`DocumentStore`]. [`SnapshotStore`] serves both from an in-memory snapshot.

use crate::error::{Result, TeamOptimizerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub role: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_roles: Vec<RoleRecord>,
    #[serde(default)]
    pub constraints: Option<String>,
}

/// A point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectRecord>,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
}

pub trait DocumentStore {
    /// Look up a project by id. Missing projects yield [`TeamOptimizerError::NotFound`].
    fn project(&self, id: &str) -> impl Future<Output = Result<ProjectRecord>> + Send;

    /// Every employee in scope.
    fn employees(&self) -> impl Future<Output = Result<Vec<EmployeeRecord>>> + Send;
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot: Arc<Snapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn project_ids(&self) -> Vec<String> {
        self.snapshot.projects.keys().cloned().collect()
    }
}

impl DocumentStore for SnapshotStore {
    async fn project(&self, id: &str) -> Result<ProjectRecord> {
        self.snapshot
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| TeamOptimizerError::NotFound(format!("Project '{}' not found", id)))
    }

    async fn employees(&self) -> Result<Vec<EmployeeRecord>> {
        Ok(self.snapshot.employees.clone())
    }
}
