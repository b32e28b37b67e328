//! Serde shapes for the resources served by the API
//!
//! Unknown fields are ignored on decode, so newer server versions keep
//! decoding into these types. Decoding is all-or-nothing: a body that does not
//! match a shape never yields a partially populated object.

use serde::{Deserialize, Serialize};

mod annotation;
mod document;
mod email;
mod engine;
mod hook;
mod organization;
mod queue;
mod relation;
mod rule;
mod schema;
mod task;
mod user;

pub use annotation::{Annotation, AnnotationStatus};
pub use document::{Document, DocumentRelation, DocumentRelationType};
pub use email::{Email, EmailTemplate};
pub use engine::{Engine, EngineField};
pub use hook::{Hook, HookRunData, HookTemplate};
pub use organization::{EmailLimits, Organization, OrganizationGroup, OrganizationLimit};
pub use queue::{Connector, Inbox, Queue, Workspace};
pub use relation::{Relation, RelationType};
pub use rule::{
    AddAutomationBlockerPayload, AddValidationSourcePayload, ChangeQueuePayload,
    ChangeStatusPayload, LabelsPayload, Rule, RuleAction, RuleActionEvent, RuleActionKind,
    SchemaIdsPayload, SendEmailPayload, ShowMessagePayload,
};
pub use schema::{
    Datapoint, Multivalue, MultivalueChild, Schema, SchemaNode, Section, SectionChild, Tuple,
};
pub use task::{Task, TaskStatus, Upload};
pub use user::{Group, User};

/// Free-form JSON object (metadata, settings and the like)
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A reference to another object: its URL, or the object itself once sideloaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linked<T> {
    Url(String),
    Object(Box<T>),
}

impl<T> Linked<T> {
    pub fn url(&self) -> Option<&str> {
        match self {
            Linked::Url(url) => Some(url),
            Linked::Object(_) => None,
        }
    }

    pub fn object(&self) -> Option<&T> {
        match self {
            Linked::Url(_) => None,
            Linked::Object(object) => Some(object),
        }
    }

    pub fn is_sideloaded(&self) -> bool {
        matches!(self, Linked::Object(_))
    }
}

fn default_true() -> bool {
    true
}
