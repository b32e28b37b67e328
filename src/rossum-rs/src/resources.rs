//! Per-resource operation handles
//!
//! [`Resources`] offers the generic CRUD surface for every resource kind.
//! Kinds with extra upstream endpoints get additional inherent methods below.

use std::marker::PhantomData;
use std::time::Duration;

use bytes::Bytes;
use futures::future::try_join_all;
use futures::stream::{BoxStream, TryStreamExt};
use reqwest::Method;
use rossum_core::models::{
    Annotation, Document, Email, Engine, EngineField, Organization, OrganizationLimit, Queue, Task,
};
use rossum_core::resources::{
    action_path, parse_resource_id, resource_path, search_path, Action, ExportFormat, ResourceKind,
    Sideload, EMAIL_IMPORT_PATH,
};
use rossum_core::ApiResource;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::request::{FormPart, ListQuery, RequestDescriptor};

/// Operations on one resource kind, borrowed from a [`Client`]
pub struct Resources<'a, T> {
    client: &'a Client,
    _kind: PhantomData<fn() -> T>,
}

impl<'a, T> Clone for Resources<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Resources<'a, T> {}

impl<'a, T: ApiResource> Resources<'a, T> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    pub async fn get(&self, id: u64) -> Result<T> {
        self.client.fetch_one(id).await
    }

    /// Lazy stream over every object matching `query`, in server order
    pub fn list(&self, query: &ListQuery) -> BoxStream<'static, Result<T>> {
        self.client.fetch_all(query)
    }

    /// Drain [`Self::list`] into a vector
    pub async fn list_all(&self, query: &ListQuery) -> Result<Vec<T>> {
        self.list(query).try_collect().await
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T> {
        self.client.create(payload).await
    }

    pub async fn update<P: Serialize + ?Sized>(&self, id: u64, payload: &P) -> Result<T> {
        self.client.update(id, payload).await
    }

    pub async fn replace<P: Serialize + ?Sized>(&self, id: u64, payload: &P) -> Result<T> {
        self.client.replace(id, payload).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete::<T>(id).await
    }
}

impl<'a> Resources<'a, Annotation> {
    /// Retrieve an annotation and embed the requested related objects
    ///
    /// Single-object endpoints do not sideload, so each linked object is
    /// fetched separately (concurrently) and swapped in before decoding.
    pub async fn get_with_sideloads(&self, id: u64, sideloads: &[Sideload]) -> Result<Annotation> {
        let raw: Value = self
            .client
            .request_json(RequestDescriptor::get(resource_path(ResourceKind::Annotation, Some(id))))
            .await?;
        self.sideload_into(raw, sideloads).await
    }

    async fn sideload_into(&self, mut raw: Value, sideloads: &[Sideload]) -> Result<Annotation> {
        let links: Vec<(Sideload, String)> = sideloads
            .iter()
            .filter_map(|sideload| {
                raw.get(sideload.field())
                    .and_then(Value::as_str)
                    .map(|url| (*sideload, url.to_string()))
            })
            .collect();

        let client = self.client;
        let loaded = try_join_all(links.into_iter().map(|(sideload, url)| async move {
            let value: Value = client
                .request_json(RequestDescriptor::url(Method::GET, url))
                .await?;
            Ok::<_, Error>((sideload, value))
        }))
        .await?;

        if let Value::Object(fields) = &mut raw {
            for (sideload, mut value) in loaded {
                if sideload == Sideload::Content {
                    // the content endpoint wraps the section list
                    value = value
                        .get_mut("content")
                        .map(Value::take)
                        .unwrap_or_else(|| Value::Array(Vec::new()));
                }
                fields.insert(sideload.field().to_string(), value);
            }
        }

        serde_json::from_value(raw).map_err(Error::Decode)
    }

    /// Full-text and structured search over annotations
    ///
    /// At least one of `query` and `query_string` is required. Follow-up pages
    /// are requested with the same POST body.
    pub fn search(
        &self,
        query: Option<Value>,
        query_string: Option<Value>,
        list: &ListQuery,
    ) -> BoxStream<'static, Result<Annotation>> {
        let mut body = Map::new();
        if let Some(query) = query {
            body.insert("query".to_string(), query);
        }
        if let Some(query_string) = query_string {
            body.insert("query_string".to_string(), query_string);
        }
        if body.is_empty() {
            let err = Error::InvalidRequest(
                "annotation search needs a query or a query string".to_string(),
            );
            return Box::pin(futures::stream::once(futures::future::ready(Err(err))));
        }

        let request = RequestDescriptor::post(search_path(ResourceKind::Annotation))
            .with_json(Value::Object(body));
        self.client.list_with_query(request, list)
    }

    async fn post_action(&self, id: u64, action: Action) -> Result<()> {
        self.client
            .execute(&RequestDescriptor::post(action_path(
                ResourceKind::Annotation,
                id,
                action,
            )))
            .await?;
        Ok(())
    }

    pub async fn start(&self, id: u64) -> Result<()> {
        self.post_action(id, Action::Start).await
    }

    pub async fn confirm(&self, id: u64) -> Result<()> {
        self.post_action(id, Action::Confirm).await
    }

    pub async fn cancel(&self, id: u64) -> Result<()> {
        self.post_action(id, Action::Cancel).await
    }

    /// Apply content operations (`add`, `replace`, `remove`) in one request
    pub async fn bulk_update_content(&self, id: u64, operations: Vec<Value>) -> Result<Value> {
        let request = RequestDescriptor::post(action_path(
            ResourceKind::Annotation,
            id,
            Action::ContentOperations,
        ))
        .with_json(json!({ "operations": operations }));
        self.client.request_json(request).await
    }

    /// Re-fetch every `interval` until `predicate` holds; sideloads are loaded once at the end
    ///
    /// There is no innate limit; wrap in `tokio::time::timeout` to bound it.
    pub async fn poll<F>(
        &self,
        id: u64,
        mut predicate: F,
        interval: Duration,
        sideloads: &[Sideload],
    ) -> Result<Annotation>
    where
        F: FnMut(&Annotation) -> bool,
    {
        let path = resource_path(ResourceKind::Annotation, Some(id));
        loop {
            let raw: Value = self
                .client
                .request_json(RequestDescriptor::get(path.clone()))
                .await?;
            let annotation: Annotation =
                serde_json::from_value(raw.clone()).map_err(Error::Decode)?;

            if predicate(&annotation) {
                if sideloads.is_empty() {
                    return Ok(annotation);
                }
                return self.sideload_into(raw, sideloads).await;
            }

            debug!(annotation_id = id, status = ?annotation.status, "annotation not ready, polling again");
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn poll_until_imported(&self, id: u64, interval: Duration) -> Result<Annotation> {
        self.poll(id, |a| a.status.is_imported(), interval, &[]).await
    }
}

/// A file to upload, held in memory
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    fn parts(&self, values: Option<&Value>, metadata: Option<&Value>) -> Vec<FormPart> {
        let mut parts = vec![FormPart::file("content", self.file_name.clone(), self.data.clone())
            .with_mime_type("application/octet-stream")];
        if let Some(values) = values {
            parts.push(FormPart::json("values", values));
        }
        if let Some(metadata) = metadata {
            parts.push(FormPart::json("metadata", metadata));
        }
        parts
    }
}

#[derive(Deserialize)]
struct CreatedLink {
    url: String,
}

#[derive(Deserialize)]
struct LegacyUploadResponse {
    results: Vec<LegacyUploadResult>,
}

#[derive(Deserialize)]
struct LegacyUploadResult {
    annotation: String,
}

fn id_from_url(url: &str) -> Result<u64> {
    parse_resource_id(url)
        .ok_or_else(|| Error::decode_message(format!("no object id at the end of {}", url)))
}

impl<'a> Resources<'a, Queue> {
    /// Annotations of a queue in the JSON export format, page by page
    pub fn export_json(&self, id: u64, query: &ListQuery) -> BoxStream<'static, Result<Annotation>> {
        let request = RequestDescriptor::get(action_path(ResourceKind::Queue, id, Action::Export))
            .with_query("format", ExportFormat::Json);
        self.client.list_with_query(request, query)
    }

    /// Raw export file in the requested format
    pub async fn export(&self, id: u64, format: ExportFormat, query: &ListQuery) -> Result<Bytes> {
        let request = RequestDescriptor::get(action_path(ResourceKind::Queue, id, Action::Export))
            .with_query("format", format);
        self.client.request_bytes(query.apply(request)?).await
    }

    /// Upload files through the upload API, one request per file, concurrently
    ///
    /// Returns the created tasks in the order of `files`.
    pub async fn upload_documents(
        &self,
        id: u64,
        files: &[UploadFile],
        values: Option<&Value>,
        metadata: Option<&Value>,
    ) -> Result<Vec<Task>> {
        let client = self.client;
        try_join_all(files.iter().map(|file| async move {
            let request = RequestDescriptor::post(resource_path(ResourceKind::Upload, None))
                .with_query("queue", id)
                .with_multipart(file.parts(values, metadata));
            let created: CreatedLink = client.request_json(request).await?;
            client.tasks().get(id_from_url(&created.url)?).await
        }))
        .await
    }

    /// Legacy upload endpoint; returns the created annotation ids in the order of `files`
    pub async fn import_documents(
        &self,
        id: u64,
        files: &[UploadFile],
        values: Option<&Value>,
        metadata: Option<&Value>,
    ) -> Result<Vec<u64>> {
        let client = self.client;
        try_join_all(files.iter().map(|file| async move {
            let request = RequestDescriptor::post(action_path(ResourceKind::Queue, id, Action::Upload))
                .with_multipart(file.parts(values, metadata));
            let response: LegacyUploadResponse = client.request_json(request).await?;
            match response.results.as_slice() {
                [result] => id_from_url(&result.annotation),
                other => Err(Error::decode_message(format!(
                    "expected one upload result per file, got {}",
                    other.len()
                ))),
            }
        }))
        .await
    }

    /// Import one file and wait until its annotation leaves the importing states
    pub async fn upload_and_wait_until_imported(
        &self,
        id: u64,
        file: UploadFile,
        interval: Duration,
    ) -> Result<Annotation> {
        let annotation_ids = self
            .import_documents(id, std::slice::from_ref(&file), None, None)
            .await?;
        let annotation_id = annotation_ids
            .first()
            .copied()
            .ok_or_else(|| Error::decode_message("upload created no annotation"))?;
        self.client
            .annotations()
            .poll_until_imported(annotation_id, interval)
            .await
    }
}

impl<'a> Resources<'a, Document> {
    /// Original file bytes of a document
    pub async fn content(&self, id: u64) -> Result<Bytes> {
        self.client
            .request_bytes(RequestDescriptor::get(action_path(
                ResourceKind::Document,
                id,
                Action::Content,
            )))
            .await
    }

    pub async fn create_from_bytes(
        &self,
        file_name: &str,
        data: impl Into<Bytes>,
        metadata: Option<&Value>,
        parent: Option<&str>,
    ) -> Result<Document> {
        let mut parts = vec![FormPart::file("content", file_name, data)];
        if let Some(metadata) = metadata {
            parts.push(FormPart::json("metadata", metadata));
        }
        if let Some(parent) = parent {
            parts.push(FormPart::text("parent", parent));
        }
        let request =
            RequestDescriptor::post(resource_path(ResourceKind::Document, None)).with_multipart(parts);
        self.client.request_json(request).await
    }
}

impl<'a> Resources<'a, Organization> {
    pub async fn limits(&self, id: u64) -> Result<OrganizationLimit> {
        self.client
            .request_json(RequestDescriptor::get(action_path(
                ResourceKind::Organization,
                id,
                Action::Limits,
            )))
            .await
    }

    /// Organization of the authenticated user
    pub async fn own(&self) -> Result<Organization> {
        let user = self.client.current_user().await?;
        self.client
            .request_json(RequestDescriptor::url(Method::GET, user.organization))
            .await
    }
}

impl<'a> Resources<'a, Task> {
    /// Re-fetch every `interval` until `predicate` holds; no innate limit
    pub async fn poll<F>(&self, id: u64, mut predicate: F, interval: Duration) -> Result<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        loop {
            let task = self.get(id).await?;
            if predicate(&task) {
                return Ok(task);
            }
            debug!(task_id = id, status = ?task.status, "task not finished, polling again");
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn poll_until_succeeded(&self, id: u64, interval: Duration) -> Result<Task> {
        self.poll(id, Task::is_succeeded, interval).await
    }
}

impl<'a> Resources<'a, Engine> {
    /// Fields of one engine, or of all engines when `engine_id` is `None`
    pub fn fields(&self, engine_id: Option<u64>) -> BoxStream<'static, Result<EngineField>> {
        let query = match engine_id {
            Some(id) => ListQuery::new().filter("engine", id),
            None => ListQuery::new(),
        };
        self.client.fetch_all(&query)
    }

    /// Queues an engine is used by
    pub fn queues(&self, engine_id: u64) -> BoxStream<'static, Result<Queue>> {
        self.client
            .fetch_all(&ListQuery::new().filter("engine", engine_id))
    }
}

impl<'a> Resources<'a, Email> {
    /// Import a raw email into the inbox with address `recipient`
    ///
    /// Import runs asynchronously upstream; the returned URL points at the tracking task.
    pub async fn import_email(
        &self,
        raw_message: impl Into<Bytes>,
        recipient: &str,
        mime_type: Option<&str>,
    ) -> Result<String> {
        let mut parts = vec![
            FormPart::file("content", "email.eml", raw_message),
            FormPart::text("recipient", recipient),
        ];
        if let Some(mime_type) = mime_type {
            parts.push(FormPart::text("mime_type", mime_type));
        }
        let created: CreatedLink = self
            .client
            .request_json(RequestDescriptor::post(EMAIL_IMPORT_PATH).with_multipart(parts))
            .await?;
        Ok(created.url)
    }
}
