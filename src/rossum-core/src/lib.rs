//! Rossum Core Library
//!
//! Pure building blocks shared by the Rossum API client:
//! - Client configuration with serde defaults
//! - Resource catalog and URL path builders
//! - Domain models for every served resource

pub mod config;
pub mod models;
pub mod resources;

// Re-export commonly used types
pub use config::{ClientConfig, RetryConfig};
pub use models::*;
pub use resources::{
    parse_resource_id, Action, ApiResource, DeleteStyle, ExportFormat, ResourceKind, Sideload,
};
