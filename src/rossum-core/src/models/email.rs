use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

/// Email received by an inbox or sent from the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub inbox: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_thread_email_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub email_from: Option<serde_json::Value>,
    #[serde(default)]
    pub to: Vec<serde_json::Value>,
    #[serde(default)]
    pub cc: Vec<serde_json::Value>,
    #[serde(default)]
    pub bcc: Vec<serde_json::Value>,
    #[serde(default)]
    pub body_text_plain: Option<String>,
    #[serde(default)]
    pub body_text_html: Option<String>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub annotation_counts: JsonMap,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, rename = "type")]
    pub email_type: Option<String>,
}

impl ApiResource for Email {
    const KIND: ResourceKind = ResourceKind::Email;
}

/// Template for emails sent manually or by triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub queue: String,
    pub organization: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub enabled: bool,
    pub automate: bool,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub to: Vec<JsonMap>,
    #[serde(default)]
    pub cc: Vec<JsonMap>,
    #[serde(default)]
    pub bcc: Vec<JsonMap>,
}

impl ApiResource for EmailTemplate {
    const KIND: ResourceKind = ResourceKind::EmailTemplate;
}
