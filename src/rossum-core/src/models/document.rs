use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

/// Uploaded file as stored by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub s3_name: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub mime_type: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrived_at: Option<DateTime<Utc>>,
    pub original_file_name: String,
    pub content: String,
    #[serde(default)]
    pub attachment_status: Option<String>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl ApiResource for Document {
    const KIND: ResourceKind = ResourceKind::Document;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRelationType {
    Export,
    Einvoice,
}

/// Links documents (e.g. generated exports) to an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRelation {
    pub id: u64,
    #[serde(rename = "type")]
    pub relation_type: DocumentRelationType,
    pub annotation: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    pub url: String,
}

impl ApiResource for DocumentRelation {
    const KIND: ResourceKind = ResourceKind::DocumentRelation;
}
