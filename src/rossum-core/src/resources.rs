//! Resource catalog and URL path builders
//!
//! Every path produced here is relative to the configured base URL
//! (`https://elis.rossum.ai/api/v1/` and the like), without a leading slash.

use serde::de::DeserializeOwned;
use std::fmt;

/// Named category of remote entity with its own collection endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Annotation,
    Auth,
    Connector,
    Document,
    DocumentRelation,
    Email,
    EmailTemplate,
    Engine,
    EngineField,
    Group,
    Hook,
    HookRunData,
    HookTemplate,
    Inbox,
    Organization,
    OrganizationGroup,
    Queue,
    Relation,
    Rule,
    Schema,
    Task,
    Upload,
    User,
    Workspace,
}

impl ResourceKind {
    /// Collection path segment of the resource
    pub const fn segment(self) -> &'static str {
        match self {
            ResourceKind::Annotation => "annotations",
            ResourceKind::Auth => "auth",
            ResourceKind::Connector => "connectors",
            ResourceKind::Document => "documents",
            ResourceKind::DocumentRelation => "document_relations",
            ResourceKind::Email => "emails",
            ResourceKind::EmailTemplate => "email_templates",
            ResourceKind::Engine => "engines",
            ResourceKind::EngineField => "engine_fields",
            ResourceKind::Group => "groups",
            ResourceKind::Hook => "hooks",
            ResourceKind::HookRunData => "hooks/logs",
            ResourceKind::HookTemplate => "hook_templates",
            ResourceKind::Inbox => "inboxes",
            ResourceKind::Organization => "organizations",
            ResourceKind::OrganizationGroup => "organization_groups",
            ResourceKind::Queue => "queues",
            ResourceKind::Relation => "relations",
            ResourceKind::Rule => "rules",
            ResourceKind::Schema => "schemas",
            ResourceKind::Task => "tasks",
            ResourceKind::Upload => "uploads",
            ResourceKind::User => "users",
            ResourceKind::Workspace => "workspaces",
        }
    }

    /// How a single object of this kind is removed
    pub const fn delete_style(self) -> DeleteStyle {
        match self {
            // annotations are moved to the "deleted" status instead of being dropped
            ResourceKind::Annotation => DeleteStyle::PostAction,
            _ => DeleteStyle::HttpDelete,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    /// `DELETE <kind>/<id>`
    HttpDelete,
    /// `POST <kind>/<id>/delete`
    PostAction,
}

/// Sub-resource operations addressed below a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Confirm,
    Cancel,
    Delete,
    Content,
    ContentOperations,
    Export,
    Upload,
    Limits,
}

impl Action {
    pub const fn segment(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
            Action::Delete => "delete",
            Action::Content => "content",
            Action::ContentOperations => "content/operations",
            Action::Export => "export",
            Action::Upload => "upload",
            Action::Limits => "limits",
        }
    }
}

/// Binds a model type to the endpoint it is served from
pub trait ApiResource: DeserializeOwned + Send + 'static {
    const KIND: ResourceKind;

    /// Extra query parameters sent when retrieving a single object
    fn retrieve_query() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// `queues` or `queues/12`
pub fn resource_path(kind: ResourceKind, id: Option<u64>) -> String {
    match id {
        Some(id) => format!("{}/{}", kind.segment(), id),
        None => kind.segment().to_string(),
    }
}

/// `annotations/12/confirm`
pub fn action_path(kind: ResourceKind, id: u64, action: Action) -> String {
    format!("{}/{}/{}", kind.segment(), id, action.segment())
}

/// `annotations/search`
pub fn search_path(kind: ResourceKind) -> String {
    format!("{}/search", kind.segment())
}

pub const AUTH_LOGIN_PATH: &str = "auth/login";
pub const AUTH_USER_PATH: &str = "auth/user";
pub const EMAIL_IMPORT_PATH: &str = "emails/import";

/// Extract the trailing numeric ID from an object URL such as
/// `https://elis.rossum.ai/api/v1/annotations/315777`
pub fn parse_resource_id(url: &str) -> Option<u64> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|last| last.parse().ok())
}

/// Related objects that can be embedded into annotation listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sideload {
    Content,
    Documents,
    Modifiers,
    Queues,
    Pages,
    Labels,
    Relations,
    ChildRelations,
    AutomationBlockers,
    Emails,
    Assignees,
}

impl Sideload {
    /// Plural name used in the `sideload` query parameter and in the list envelope
    pub const fn name(self) -> &'static str {
        match self {
            Sideload::Content => "content",
            Sideload::Documents => "documents",
            Sideload::Modifiers => "modifiers",
            Sideload::Queues => "queues",
            Sideload::Pages => "pages",
            Sideload::Labels => "labels",
            Sideload::Relations => "relations",
            Sideload::ChildRelations => "child_relations",
            Sideload::AutomationBlockers => "automation_blockers",
            Sideload::Emails => "emails",
            Sideload::Assignees => "assignees",
        }
    }

    /// Field on the parent object holding the URL(s) of the sideloaded objects
    pub const fn field(self) -> &'static str {
        match self {
            Sideload::Documents => "document",
            Sideload::Modifiers => "modifier",
            Sideload::Queues => "queue",
            Sideload::AutomationBlockers => "automation_blocker",
            Sideload::Emails => "email",
            // list-valued fields keep the plural name
            other => other.name(),
        }
    }
}

/// Export file formats supported by `queues/<id>/export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Xlsx,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
