// Remote project store: the `/projects` endpoint pair
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use netdraft_core::Project;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Whole-collection remote persistence. No versions, no partial writes.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `GET /projects`
    async fn fetch_projects(&self) -> Result<Vec<Project>>;
    /// `POST /projects`, overwriting everything the server holds.
    async fn push_projects(&self, projects: &[Project]) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Option<Vec<Project>>,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    projects: &'a [Project],
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    success: bool,
}

/// JSON over HTTP against `<base_url>/projects`.
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let response = self
            .client
            .get(self.projects_url())
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch projects: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to fetch projects: HTTP {}", response.status()));
        }

        let body: ProjectsResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to decode project list: {}", e))?;
        body.projects
            .ok_or_else(|| anyhow!("Server response carried no project list"))
    }

    async fn push_projects(&self, projects: &[Project]) -> Result<()> {
        let response = self
            .client
            .post(self.projects_url())
            .json(&PushRequest { projects })
            .send()
            .await
            .map_err(|e| anyhow!("Failed to push projects: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to push projects: HTTP {}", response.status()));
        }

        let ack: PushResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to decode push response: {}", e))?;
        if !ack.success {
            return Err(anyhow!("Server rejected project push"));
        }
        Ok(())
    }
}

/// In-process remote, used for tests and for running without a server.
#[derive(Default)]
pub struct MemoryRemote {
    projects: Mutex<Vec<Project>>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
    fail_fetches: AtomicBool,
    fail_pushes: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        let remote = Self::default();
        *remote.projects.lock() = projects;
        remote
    }

    /// Current server-side collection.
    pub fn projects(&self) -> Vec<Project> {
        self.projects.lock().clone()
    }

    #[inline]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Acquire)
    }

    /// Number of successful pushes.
    #[inline]
    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::Acquire)
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::Release);
    }

    pub fn set_fail_pushes(&self, fail: bool) {
        self.fail_pushes.store(fail, Ordering::Release);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        if self.fail_fetches.load(Ordering::Acquire) {
            return Err(anyhow!("Failed to fetch projects: HTTP 503 Service Unavailable"));
        }
        self.fetches.fetch_add(1, Ordering::AcqRel);
        Ok(self.projects.lock().clone())
    }

    async fn push_projects(&self, projects: &[Project]) -> Result<()> {
        if self.fail_pushes.load(Ordering::Acquire) {
            return Err(anyhow!("Failed to push projects: HTTP 500 Internal Server Error"));
        }
        *self.projects.lock() = projects.to_vec();
        self.pushes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
