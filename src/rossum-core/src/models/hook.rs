use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

/// Extension called on annotation/email/upload events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub active: bool,
    pub config: JsonMap,
    #[serde(default, rename = "type")]
    pub hook_type: Option<String>,
    #[serde(default)]
    pub test: JsonMap,
    #[serde(default)]
    pub guide: Option<String>,
    #[serde(default)]
    pub read_more_url: Option<String>,
    #[serde(default)]
    pub extension_image_url: Option<String>,
    #[serde(default)]
    pub queues: Vec<String>,
    #[serde(default)]
    pub run_after: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    /// `null` on the wire is kept as `None`; a missing field decodes as an empty map
    #[serde(default = "empty_settings")]
    pub settings: Option<JsonMap>,
    #[serde(default)]
    pub settings_schema: Option<JsonMap>,
    #[serde(default)]
    pub secrets: JsonMap,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub sideload: Vec<String>,
    #[serde(default)]
    pub token_owner: Option<String>,
    #[serde(default)]
    pub token_lifetime_s: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extension_source: Option<String>,
    #[serde(default)]
    pub hook_template: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

fn empty_settings() -> Option<JsonMap> {
    Some(JsonMap::new())
}

impl ApiResource for Hook {
    const KIND: ResourceKind = ResourceKind::Hook;
}

/// One logged hook execution, served from `hooks/logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookRunData {
    pub log_level: String,
    pub action: String,
    pub event: String,
    pub request_id: String,
    pub organization_id: u64,
    pub hook_id: u64,
    pub hook_type: String,
    pub timestamp: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub annotation_id: Option<u64>,
    #[serde(default)]
    pub queue_id: Option<u64>,
    #[serde(default)]
    pub email_id: Option<u64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

impl ApiResource for HookRunData {
    const KIND: ResourceKind = ResourceKind::HookRunData;
}

/// Store listing hooks can be created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookTemplate {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default = "default_hook_type", rename = "type")]
    pub hook_type: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub sideload: Vec<String>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(default)]
    pub test: JsonMap,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_extension_source")]
    pub extension_source: String,
    #[serde(default)]
    pub settings: JsonMap,
    #[serde(default)]
    pub settings_schema: Option<JsonMap>,
    #[serde(default)]
    pub secrets_schema: Option<JsonMap>,
    #[serde(default)]
    pub guide: Option<String>,
    #[serde(default)]
    pub read_more_url: Option<String>,
    #[serde(default)]
    pub extension_image_url: Option<String>,
}

fn default_hook_type() -> String {
    "webhook".to_string()
}

fn default_extension_source() -> String {
    "rossum_store".to_string()
}

impl ApiResource for HookTemplate {
    const KIND: ResourceKind = ResourceKind::HookTemplate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_hook() -> serde_json::Value {
        json!({
            "id": 1500,
            "name": "Test Hook",
            "url": "https://elis.rossum.ai/api/v1/hooks/1500",
            "active": true,
            "config": {"url": "https://example.com/webhook"},
            "test": {},
            "guide": null,
            "read_more_url": null,
            "extension_image_url": null
        })
    }

    #[test]
    fn test_hook_settings_null() {
        let mut payload = minimal_hook();
        payload["settings"] = serde_json::Value::Null;
        let hook: Hook = serde_json::from_value(payload).unwrap();
        assert_eq!(hook.settings, None);
    }

    #[test]
    fn test_hook_settings_missing_defaults_to_empty() {
        let hook: Hook = serde_json::from_value(minimal_hook()).unwrap();
        assert_eq!(hook.settings, Some(JsonMap::new()));
    }

    #[test]
    fn test_hook_settings_populated() {
        let mut payload = minimal_hook();
        payload["settings"] = json!({"key": "value", "nested": {"a": 1}});
        let hook: Hook = serde_json::from_value(payload).unwrap();
        assert_eq!(
            hook.settings.unwrap().get("nested"),
            Some(&json!({"a": 1}))
        );
    }

    #[test]
    fn test_hook_template_defaults() {
        let template: HookTemplate = serde_json::from_value(json!({
            "id": 5,
            "name": "Data matching",
            "url": "https://elis.rossum.ai/api/v1/hook_templates/5"
        }))
        .unwrap();
        assert_eq!(template.hook_type, "webhook");
        assert_eq!(template.extension_source, "rossum_store");
    }
}
