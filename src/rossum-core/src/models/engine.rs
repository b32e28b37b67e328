use serde::{Deserialize, Serialize};

use crate::resources::{ApiResource, ResourceKind};

/// Extraction engine trained for a set of queues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub id: u64,
    pub url: String,
    pub name: String,
    #[serde(rename = "type")]
    pub engine_type: String,
    #[serde(default)]
    pub learning_enabled: bool,
    #[serde(default)]
    pub training_queues: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agenda_id: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

impl ApiResource for Engine {
    const KIND: ResourceKind = ResourceKind::Engine;
}

/// Field an engine is able to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineField {
    pub id: u64,
    pub url: String,
    pub engine: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub pre_trained_field_id: Option<String>,
    #[serde(default)]
    pub tabular: bool,
    #[serde(default)]
    pub multiline: Option<String>,
    #[serde(default)]
    pub schemas: Vec<String>,
}

impl ApiResource for EngineField {
    const KIND: ResourceKind = ResourceKind::EngineField;
}
