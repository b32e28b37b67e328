//! Rossum API Client Library
//!
//! Typed access to the Rossum document-processing API. Every call goes
//! through one pipeline: transport, retry policy, response normalization
//! and, for listings, lazy pagination. The pipeline is exposed twice:
//! [`Client`] for async code and [`blocking::Client`] for blocking callers,
//! with identical methods and identical errors.

pub mod blocking;
mod client;
pub mod credentials;
mod error;
pub mod normalize;
pub mod pagination;
pub mod request;
pub mod resources;
pub mod retry;
pub mod telemetry;
pub mod transport;

pub use client::Client;
pub use credentials::{CredentialProvider, StaticToken};
pub use error::{Error, ErrorKind, Result, TransportError};
pub use pagination::Cursor;
pub use request::{Body, FormPart, ListQuery, PartContent, RequestDescriptor, Target};
pub use resources::{Resources, UploadFile};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RawResponse, Transport};

pub use reqwest::Method;
pub use rossum_core::{models, ClientConfig, ExportFormat, RetryConfig, Sideload};
