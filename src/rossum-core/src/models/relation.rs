use serde::{Deserialize, Serialize};

use crate::resources::{ApiResource, ResourceKind};

/// Type of relationship between annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Created by editing a document in the UI (rotation, split)
    Edit,
    /// One or more documents are attachments of another one
    Attachment,
    /// The same document was imported again; `key` holds the MD5 of its content
    Duplicate,
}

/// Common relation between annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: u64,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub key: Option<String>,
    pub parent: Option<String>,
    pub annotations: Vec<String>,
    pub url: String,
}

impl ApiResource for Relation {
    const KIND: ResourceKind = ResourceKind::Relation;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relation_decode() {
        let relation: Relation = serde_json::from_value(json!({
            "id": 1500,
            "type": "edit",
            "key": null,
            "parent": "https://elis.rossum.ai/api/v1/annotations/123",
            "annotations": [
                "https://elis.rossum.ai/api/v1/annotations/456",
                "https://elis.rossum.ai/api/v1/annotations/457"
            ],
            "url": "https://elis.rossum.ai/api/v1/relations/1500"
        }))
        .unwrap();

        assert_eq!(relation.relation_type, RelationType::Edit);
        assert_eq!(relation.annotations.len(), 2);
    }

    #[test]
    fn test_relation_rejects_unknown_type() {
        let result: Result<Relation, _> = serde_json::from_value(json!({
            "id": 1, "type": "sibling", "key": null, "parent": null,
            "annotations": [], "url": "https://elis.rossum.ai/api/v1/relations/1"
        }));
        assert!(result.is_err());
    }
}
