//! Request descriptors and list query parameters
//!
//! A [`RequestDescriptor`] is built once per logical call and never mutated;
//! the builder methods consume it and hand back a new value. Retries re-send
//! the same descriptor, pagination derives follow-up descriptors from it.

use std::fmt;

use bytes::Bytes;
use reqwest::Method;
use rossum_core::Sideload;
use serde_json::Value;

use crate::error::{Error, Result};

/// Where a request goes: a path below the base URL or an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(String),
    Url(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(path) => f.write_str(path),
            Target::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// One part of a `multipart/form-data` body
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    Text(String),
    File {
        file_name: String,
        mime_type: Option<String>,
        data: Bytes,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                mime_type: None,
                data: data.into(),
            },
        }
    }

    /// JSON document sent as an `application/json` file part
    pub fn json(name: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                file_name: String::new(),
                mime_type: Some("application/json".to_string()),
                data: Bytes::from(value.to_string()),
            },
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        if let PartContent::File { mime_type, .. } = &mut self.content {
            *mime_type = Some(mime.into());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    target: Target,
    query: Vec<(String, String)>,
    body: Option<Body>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            target: Target::Path(path.into()),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Request against an absolute URL, e.g. a link returned by the server
    pub fn url(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            target: Target::Url(url.into()),
            query: Vec::new(),
            body: None,
        }
    }

    /// Appends a query pair; keys may repeat
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(Body::Multipart(parts));
        self
    }

    /// Same method and body against an absolute `next` link; the link carries its own query
    pub fn follow(&self, url: impl Into<String>) -> Self {
        Self {
            method: self.method.clone(),
            target: Target::Url(url.into()),
            query: Vec::new(),
            body: self.body.clone(),
        }
    }

    /// Copy of this request with the `cursor` query parameter set to `token`
    pub fn with_cursor(&self, token: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.query.retain(|(key, _)| key != "cursor");
        next.query.push(("cursor".to_string(), token.into()));
        next
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// First value of a query key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Explicitly requested page size, used for the short-page stop
    pub fn page_size(&self) -> Option<usize> {
        self.query_value("page_size").and_then(|v| v.parse().ok())
    }
}

/// Filters, ordering and sideloads of a list call
///
/// Filters go out verbatim as query parameters; `ordering`, `sideload` and
/// `content.schema_id` are joined with commas into single parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    ordering: Vec<String>,
    page_size: Option<u32>,
    sideloads: Vec<Sideload>,
    content_schema_ids: Vec<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    /// Field name to order by; prefix with `-` for descending
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.ordering.push(field.into());
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn sideload(mut self, sideload: Sideload) -> Self {
        if !self.sideloads.contains(&sideload) {
            self.sideloads.push(sideload);
        }
        self
    }

    pub fn content_schema_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_schema_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn sideloads(&self) -> &[Sideload] {
        &self.sideloads
    }

    /// Query pairs in the order filters were added, followed by the joined parameters
    pub fn to_pairs(&self) -> Result<Vec<(String, String)>> {
        if self.sideloads.contains(&Sideload::Content) && self.content_schema_ids.is_empty() {
            return Err(Error::InvalidRequest(
                "sideloading content requires at least one content schema id".to_string(),
            ));
        }

        let mut pairs = self.filters.clone();
        if !self.ordering.is_empty() {
            pairs.push(("ordering".to_string(), self.ordering.join(",")));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size".to_string(), size.to_string()));
        }
        if !self.sideloads.is_empty() {
            let names: Vec<&str> = self.sideloads.iter().map(|s| s.name()).collect();
            pairs.push(("sideload".to_string(), names.join(",")));
        }
        if !self.content_schema_ids.is_empty() {
            pairs.push((
                "content.schema_id".to_string(),
                self.content_schema_ids.join(","),
            ));
        }
        Ok(pairs)
    }

    pub fn apply(&self, request: RequestDescriptor) -> Result<RequestDescriptor> {
        Ok(request.with_query_pairs(self.to_pairs()?))
    }
}
