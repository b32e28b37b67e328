use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

/// Queue of documents sharing one schema and one workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub connector: Option<String>,
    pub schema: String,
    #[serde(default)]
    pub inbox: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub session_timeout: Option<String>,
    #[serde(default)]
    pub rir_url: Option<String>,
    #[serde(default)]
    pub rir_params: Option<String>,
    #[serde(default)]
    pub dedicated_engine: Option<serde_json::Value>,
    #[serde(default)]
    pub generic_engine: Option<serde_json::Value>,
    #[serde(default)]
    pub counts: JsonMap,
    #[serde(default)]
    pub default_score_threshold: Option<f64>,
    #[serde(default)]
    pub automation_enabled: bool,
    #[serde(default)]
    pub automation_level: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub settings: JsonMap,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub webhooks: Vec<String>,
    #[serde(default)]
    pub use_confirmed_state: bool,
    #[serde(default)]
    pub document_lifetime: Option<String>,
    #[serde(default)]
    pub delete_after: Option<DateTime<Utc>>,
}

impl ApiResource for Queue {
    const KIND: ResourceKind = ResourceKind::Queue;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub organization: String,
    #[serde(default)]
    pub queues: Vec<String>,
    #[serde(default)]
    pub autopilot: Option<bool>,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl ApiResource for Workspace {
    const KIND: ResourceKind = ResourceKind::Workspace;
}

/// Email address documents are imported from into a queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inbox {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub queues: Vec<String>,
    pub email: String,
    #[serde(default)]
    pub email_prefix: Option<String>,
    #[serde(default)]
    pub bounce_email_to: Option<String>,
    #[serde(default)]
    pub bounce_unprocessable_attachments: bool,
    #[serde(default)]
    pub bounce_postponed_annotations: bool,
    #[serde(default)]
    pub bounce_deleted_annotations: bool,
    #[serde(default)]
    pub bounce_email_with_no_attachments: bool,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub filters: JsonMap,
    #[serde(default)]
    pub dmarc_check_action: Option<String>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ApiResource for Inbox {
    const KIND: ResourceKind = ResourceKind::Inbox;
}

/// Extension validating and exporting annotations over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub queues: Vec<String>,
    pub service_url: String,
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub client_ssl_certificate: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub asynchronous: Option<bool>,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl ApiResource for Connector {
    const KIND: ResourceKind = ResourceKind::Connector;
}
