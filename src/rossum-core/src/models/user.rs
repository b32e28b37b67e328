use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, JsonMap};
use crate::resources::{ApiResource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
    pub organization: String,
    #[serde(default)]
    pub queues: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ui_settings: JsonMap,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub oidc_id: Option<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

impl ApiResource for User {
    const KIND: ResourceKind = ResourceKind::User;
}

/// User role: a named set of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub url: String,
}

impl ApiResource for Group {
    const KIND: ResourceKind = ResourceKind::Group;
}
