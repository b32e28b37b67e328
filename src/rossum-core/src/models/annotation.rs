use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, JsonMap, Linked, Queue, User};
use crate::resources::{ApiResource, ResourceKind};

/// Annotation lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStatus {
    Created,
    Importing,
    FailedImport,
    Split,
    ToReview,
    Reviewing,
    InWorkflow,
    Confirmed,
    Rejected,
    Exporting,
    Exported,
    FailedExport,
    Postponed,
    Deleted,
    Purged,
    #[serde(other)]
    Unknown,
}

impl AnnotationStatus {
    /// Import has finished, successfully or not
    pub fn is_imported(self) -> bool {
        !matches!(self, AnnotationStatus::Created | AnnotationStatus::Importing)
    }
}

/// Extracted data of one document in one queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub url: String,
    pub status: AnnotationStatus,
    pub document: Linked<Document>,
    pub queue: Linked<Queue>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub modifier: Option<Linked<User>>,
    #[serde(default)]
    pub content: Option<Linked<Vec<serde_json::Value>>>,
    #[serde(default)]
    pub pages: Vec<serde_json::Value>,
    #[serde(default)]
    pub labels: Vec<serde_json::Value>,
    #[serde(default)]
    pub relations: Vec<serde_json::Value>,
    #[serde(default)]
    pub automation_blocker: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<serde_json::Value>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rir_poll_id: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub automated: bool,
    #[serde(default)]
    pub restricted_access: bool,
}

impl ApiResource for Annotation {
    const KIND: ResourceKind = ResourceKind::Annotation;
}
