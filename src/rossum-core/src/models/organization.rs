use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub workspaces: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub organization_group: Option<String>,
    #[serde(default)]
    pub ui_settings: JsonMap,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_trial: Option<bool>,
    #[serde(default)]
    pub oidc_provider: Option<String>,
}

impl ApiResource for Organization {
    const KIND: ResourceKind = ResourceKind::Organization;
}

/// Organizations sharing one license
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationGroup {
    pub id: u64,
    pub name: String,
    pub is_trial: bool,
    pub is_production: bool,
    pub deployment_location: String,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub features: Option<JsonMap>,
    #[serde(default)]
    pub usage: JsonMap,
}

impl ApiResource for OrganizationGroup {
    const KIND: ResourceKind = ResourceKind::OrganizationGroup;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLimits {
    pub count_today: u64,
    pub count_today_notification: u64,
    pub count_total: u64,
    pub email_per_day_limit: u64,
    pub email_per_day_limit_notification: u64,
    #[serde(default)]
    pub email_total_limit: Option<u64>,
    #[serde(default)]
    pub last_sent_at: Option<String>,
    #[serde(default)]
    pub last_sent_at_notification: Option<String>,
}

/// Limits applied to an organization, served from `organizations/<id>/limits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationLimit {
    pub email_limits: EmailLimits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_limit_decode() {
        let limit: OrganizationLimit = serde_json::from_value(json!({
            "email_limits": {
                "count_today": 7,
                "count_today_notification": 4,
                "count_total": 9,
                "email_per_day_limit": 10,
                "email_per_day_limit_notification": 10,
                "email_total_limit": 20,
                "last_sent_at": "2022-01-13",
                "last_sent_at_notification": "2022-01-13"
            }
        }))
        .unwrap();

        assert_eq!(limit.email_limits.count_today, 7);
        assert_eq!(limit.email_limits.email_total_limit, Some(20));
    }

    #[test]
    fn test_organization_decode() {
        let organization: Organization = serde_json::from_value(json!({
            "id": 406,
            "url": "https://elis.rossum.ai/api/v1/organizations/406",
            "name": "East West Trading Co",
            "workspaces": ["https://elis.rossum.ai/api/v1/workspaces/7540"],
            "users": ["https://elis.rossum.ai/api/v1/users/10775"],
            "organization_group": "https://elis.rossum.ai/api/v1/organization_groups/17",
            "ui_settings": {},
            "metadata": {},
            "created_at": "2019-09-02T14:28:11.000000Z",
            "trial_expires_at": "2020-09-02T14:28:11.000000Z",
            "is_trial": true,
            "oidc_provider": "some_oidc_provider"
        }))
        .unwrap();

        assert_eq!(organization.is_trial, Some(true));
        assert!(organization.created_at.is_some());
    }
}
