use serde::{Deserialize, Serialize};

use crate::resources::{ApiResource, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

/// Asynchronous server-side job, e.g. processing of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<String>,
    /// URL of the object created by the task once it has succeeded
    #[serde(default)]
    pub result_url: Option<String>,
}

impl Task {
    pub fn is_succeeded(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }
}

impl ApiResource for Task {
    const KIND: ResourceKind = ResourceKind::Task;

    fn retrieve_query() -> &'static [(&'static str, &'static str)] {
        // finished tasks would otherwise redirect to the created object
        &[("no_redirect", "True")]
    }
}

/// Result of a processed upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: u64,
    pub url: String,
    pub queue: String,
    pub organization: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub additional_documents: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl ApiResource for Upload {
    const KIND: ResourceKind = ResourceKind::Upload;
}
