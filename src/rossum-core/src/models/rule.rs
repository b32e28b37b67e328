use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::default_true;
use crate::resources::{ApiResource, ResourceKind};

/// Business rule attached to a schema
///
/// `trigger_condition` is a TxScript formula; the actions run when it
/// evaluates strictly to `True`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    pub enabled: bool,
    pub organization: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_trigger_condition")]
    pub trigger_condition: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub rule_template: Option<String>,
    #[serde(default)]
    pub synchronized_from_template: bool,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

fn default_trigger_condition() -> String {
    "True".to_string()
}

impl ApiResource for Rule {
    const KIND: ResourceKind = ResourceKind::Rule;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleActionEvent {
    Validation,
    AnnotationImported,
    AnnotationConfirmed,
    AnnotationExported,
}

/// One action of a rule; the payload shape is selected by the wire `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRuleAction", into = "WireRuleAction")]
pub struct RuleAction {
    pub id: String,
    pub event: RuleActionEvent,
    pub enabled: bool,
    pub kind: RuleActionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleActionKind {
    ShowMessage(ShowMessagePayload),
    AddAutomationBlocker(AddAutomationBlockerPayload),
    ChangeStatus(ChangeStatusPayload),
    ChangeQueue(ChangeQueuePayload),
    AddLabel(LabelsPayload),
    RemoveLabel(LabelsPayload),
    AddRemoveLabel(LabelsPayload),
    ShowField(SchemaIdsPayload),
    HideField(SchemaIdsPayload),
    ShowHideField(SchemaIdsPayload),
    AddValidationSource(AddValidationSourcePayload),
    SendEmail(SendEmailPayload),
    /// `custom` actions carry an arbitrary payload
    Custom(Value),
    /// Action types this crate does not know yet
    Unknown { action_type: String, payload: Value },
}

impl RuleActionKind {
    pub fn action_type(&self) -> &str {
        match self {
            RuleActionKind::ShowMessage(_) => "show_message",
            RuleActionKind::AddAutomationBlocker(_) => "add_automation_blocker",
            RuleActionKind::ChangeStatus(_) => "change_status",
            RuleActionKind::ChangeQueue(_) => "change_queue",
            RuleActionKind::AddLabel(_) => "add_label",
            RuleActionKind::RemoveLabel(_) => "remove_label",
            RuleActionKind::AddRemoveLabel(_) => "add_remove_label",
            RuleActionKind::ShowField(_) => "show_field",
            RuleActionKind::HideField(_) => "hide_field",
            RuleActionKind::ShowHideField(_) => "show_hide_field",
            RuleActionKind::AddValidationSource(_) => "add_validation_source",
            RuleActionKind::SendEmail(_) => "send_email",
            RuleActionKind::Custom(_) => "custom",
            RuleActionKind::Unknown { action_type, .. } => action_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowMessagePayload {
    /// `error`, `warning` or `info`
    #[serde(rename = "type")]
    pub message_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAutomationBlockerPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatusPayload {
    /// `postpone`, `export`, `delete`, `confirm` or `reject`
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeQueuePayload {
    pub queue_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reimport: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelsPayload {
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaIdsPayload {
    #[serde(default)]
    pub schema_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddValidationSourcePayload {
    pub schema_id: String,
}

/// When `email_template` is set the explicit recipients, subject and body are ignored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SendEmailPayload {
    #[serde(default)]
    pub email_template: Option<String>,
    #[serde(default)]
    pub attach_document: bool,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireRuleAction {
    id: String,
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    payload: Value,
    event: RuleActionEvent,
    #[serde(default = "default_true")]
    enabled: bool,
}

impl TryFrom<WireRuleAction> for RuleAction {
    type Error = serde_json::Error;

    fn try_from(wire: WireRuleAction) -> Result<Self, Self::Error> {
        let payload = match wire.payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let kind = match wire.action_type.as_str() {
            "show_message" => RuleActionKind::ShowMessage(serde_json::from_value(payload)?),
            "add_automation_blocker" => {
                RuleActionKind::AddAutomationBlocker(serde_json::from_value(payload)?)
            }
            "change_status" => RuleActionKind::ChangeStatus(serde_json::from_value(payload)?),
            "change_queue" => RuleActionKind::ChangeQueue(serde_json::from_value(payload)?),
            "add_label" => RuleActionKind::AddLabel(serde_json::from_value(payload)?),
            "remove_label" => RuleActionKind::RemoveLabel(serde_json::from_value(payload)?),
            "add_remove_label" => RuleActionKind::AddRemoveLabel(serde_json::from_value(payload)?),
            "show_field" => RuleActionKind::ShowField(serde_json::from_value(payload)?),
            "hide_field" => RuleActionKind::HideField(serde_json::from_value(payload)?),
            "show_hide_field" => RuleActionKind::ShowHideField(serde_json::from_value(payload)?),
            "add_validation_source" => {
                RuleActionKind::AddValidationSource(serde_json::from_value(payload)?)
            }
            "send_email" => RuleActionKind::SendEmail(serde_json::from_value(payload)?),
            "custom" => RuleActionKind::Custom(payload),
            _ => RuleActionKind::Unknown {
                action_type: wire.action_type.clone(),
                payload,
            },
        };

        Ok(RuleAction {
            id: wire.id,
            event: wire.event,
            enabled: wire.enabled,
            kind,
        })
    }
}

impl From<RuleAction> for WireRuleAction {
    fn from(action: RuleAction) -> Self {
        let action_type = action.kind.action_type().to_string();
        let payload = match action.kind {
            RuleActionKind::ShowMessage(p) => serde_json::to_value(p),
            RuleActionKind::AddAutomationBlocker(p) => serde_json::to_value(p),
            RuleActionKind::ChangeStatus(p) => serde_json::to_value(p),
            RuleActionKind::ChangeQueue(p) => serde_json::to_value(p),
            RuleActionKind::AddLabel(p)
            | RuleActionKind::RemoveLabel(p)
            | RuleActionKind::AddRemoveLabel(p) => serde_json::to_value(p),
            RuleActionKind::ShowField(p)
            | RuleActionKind::HideField(p)
            | RuleActionKind::ShowHideField(p) => serde_json::to_value(p),
            RuleActionKind::AddValidationSource(p) => serde_json::to_value(p),
            RuleActionKind::SendEmail(p) => serde_json::to_value(p),
            RuleActionKind::Custom(payload) | RuleActionKind::Unknown { payload, .. } => {
                Ok(payload)
            }
        }
        // plain structs of strings, numbers and bools always serialize
        .unwrap_or(Value::Null);

        WireRuleAction {
            id: action.id,
            action_type,
            payload,
            event: action.event,
            enabled: action.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule_with_actions(actions: Value) -> Value {
        json!({
            "id": 123,
            "name": "Validate totals",
            "enabled": true,
            "organization": "https://elis.rossum.ai/api/v1/organizations/1",
            "schema": "https://elis.rossum.ai/api/v1/schemas/4",
            "trigger_condition": "field.amount_total > 1000",
            "actions": actions
        })
    }

    #[test]
    fn test_rule_actions_get_typed_payloads() {
        let rule: Rule = serde_json::from_value(rule_with_actions(json!([
            {
                "id": "a1",
                "type": "show_message",
                "event": "validation",
                "payload": {"type": "error", "content": "Too high", "schema_id": "amount_total"}
            },
            {
                "id": "a2",
                "type": "add_label",
                "event": "annotation_imported",
                "enabled": false,
                "payload": {"labels": ["https://elis.rossum.ai/api/v1/labels/1"]}
            },
            {
                "id": "a3",
                "type": "custom",
                "event": "annotation_confirmed",
                "payload": {"anything": [1, 2]}
            }
        ])))
        .unwrap();

        assert_eq!(rule.actions.len(), 3);
        match &rule.actions[0].kind {
            RuleActionKind::ShowMessage(payload) => {
                assert_eq!(payload.message_type, "error");
                assert_eq!(payload.schema_id.as_deref(), Some("amount_total"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(rule.actions[0].enabled);
        assert!(!rule.actions[1].enabled);
        assert!(matches!(rule.actions[1].kind, RuleActionKind::AddLabel(ref p) if p.labels.len() == 1));
        assert_eq!(rule.actions[2].kind, RuleActionKind::Custom(json!({"anything": [1, 2]})));
    }

    #[test]
    fn test_rule_action_serializes_type_and_payload() {
        let action = RuleAction {
            id: "b1".to_string(),
            event: RuleActionEvent::Validation,
            enabled: true,
            kind: RuleActionKind::ChangeQueue(ChangeQueuePayload {
                queue_id: 7,
                reimport: None,
            }),
        };

        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "change_queue");
        assert_eq!(value["payload"], json!({"queue_id": 7}));
        assert_eq!(value["event"], "validation");
    }

    #[test]
    fn test_unknown_action_type_is_preserved() {
        let action: RuleAction = serde_json::from_value(json!({
            "id": "c1",
            "type": "launch_rocket",
            "event": "validation",
            "payload": {"stage": 2}
        }))
        .unwrap();

        assert_eq!(action.kind.action_type(), "launch_rocket");
    }

    #[test]
    fn test_mismatched_payload_fails() {
        let result: Result<RuleAction, _> = serde_json::from_value(json!({
            "id": "d1",
            "type": "change_queue",
            "event": "validation",
            "payload": {"labels": []}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_defaults() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 1,
            "name": "r",
            "enabled": false,
            "organization": "https://elis.rossum.ai/api/v1/organizations/1"
        }))
        .unwrap();

        assert_eq!(rule.trigger_condition, "True");
        assert!(rule.actions.is_empty());
    }
}
