//! Endpoint definition store.
//!
//! The engine reads projects and endpoint definitions through
//! [`EndpointStore`] on every request and never writes to it.
//!
//! [`InMemoryStore`] is built from configuration. Whole-configuration
//! reloads swap its contents under a write lock; in-flight requests keep
//! the definitions they already read.

use crate::config::{EndpointDefinition, MockServerConfig, Project, ProjectDefinition};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to projects and their endpoint definitions.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Look up a project; `None` if it does not exist.
    async fn find_project(&self, project_id: &str) -> StoreResult<Option<Project>>;

    /// All endpoint definitions of a project, in matching order.
    async fn find_endpoints_by_project(
        &self,
        project_id: &str,
    ) -> StoreResult<Vec<EndpointDefinition>>;

    /// Number of projects currently held.
    async fn project_count(&self) -> StoreResult<usize>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct ProjectRecord {
    project: Project,
    endpoints: Vec<EndpointDefinition>,
}

impl From<&ProjectDefinition> for ProjectRecord {
    fn from(def: &ProjectDefinition) -> Self {
        Self {
            project: def.project(),
            endpoints: def.endpoints.clone(),
        }
    }
}

/// In-memory store of project definitions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    projects: Arc<RwLock<HashMap<String, ProjectRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the projects of `config`.
    pub fn from_config(config: &MockServerConfig) -> Self {
        Self {
            projects: Arc::new(RwLock::new(Self::records(config))),
        }
    }

    fn records(config: &MockServerConfig) -> HashMap<String, ProjectRecord> {
        config
            .projects
            .iter()
            .map(|p| (p.id.clone(), ProjectRecord::from(p)))
            .collect()
    }

    /// Replace every project with those of `config`.
    pub async fn replace_all(&self, config: &MockServerConfig) {
        let records = Self::records(config);
        *self.projects.write().await = records;
    }

    /// Insert or replace one project.
    pub async fn upsert_project(&self, project: &ProjectDefinition) {
        self.projects
            .write()
            .await
            .insert(project.id.clone(), ProjectRecord::from(project));
    }
}

#[async_trait]
impl EndpointStore for InMemoryStore {
    async fn find_project(&self, project_id: &str) -> StoreResult<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|r| r.project.clone()))
    }

    async fn find_endpoints_by_project(
        &self,
        project_id: &str,
    ) -> StoreResult<Vec<EndpointDefinition>> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(project_id)
            .map(|r| r.endpoints.clone())
            .unwrap_or_default())
    }

    async fn project_count(&self) -> StoreResult<usize> {
        Ok(self.projects.read().await.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
