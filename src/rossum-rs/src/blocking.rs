//! Blocking façade over the asynchronous client
//!
//! Every method drives exactly one asynchronous call to completion on a
//! runtime owned by the client, so errors and results are the same as with
//! [`crate::Client`]. Nothing is spawned in the background; once a method
//! returns no work is left running. List methods return an iterator that
//! fetches the next page when the current one is used up.
//!
//! Inside an async runtime every method fails with [`Error::InvalidRequest`];
//! use [`crate::Client`] there.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use rossum_core::models::{
    Annotation, Connector, Document, DocumentRelation, Email, EmailTemplate, Engine, EngineField,
    Group, Hook, HookRunData, HookTemplate, Inbox, Organization, OrganizationGroup,
    OrganizationLimit, Queue, Relation, Rule, Schema, Task, Upload, User, Workspace,
};
use rossum_core::{ApiResource, ClientConfig, ExportFormat, Sideload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::client::Client as AsyncClient;
use crate::credentials::CredentialProvider;
use crate::error::{Error, Result};
use crate::request::{ListQuery, RequestDescriptor};
use crate::resources::{Resources as AsyncResources, UploadFile};
use crate::transport::{RawResponse, Transport};

pub struct Client {
    runtime: Runtime,
    inner: AsyncClient,
}

/// Blocking inside an async runtime would panic; report it as an error instead
fn ensure_outside_runtime() -> Result<()> {
    if Handle::try_current().is_ok() {
        return Err(Error::InvalidRequest(
            "blocking client used from within an async runtime; use rossum_rs::Client there"
                .to_string(),
        ));
    }
    Ok(())
}

fn current_thread_runtime() -> Result<Runtime> {
    ensure_outside_runtime()?;
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::InvalidRequest(format!("failed to start runtime: {}", e)))
}

impl Client {
    pub fn new(config: ClientConfig, credential: impl CredentialProvider + 'static) -> Result<Self> {
        Ok(Self {
            runtime: current_thread_runtime()?,
            inner: AsyncClient::new(config, credential)?,
        })
    }

    pub fn with_token(config: ClientConfig, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            runtime: current_thread_runtime()?,
            inner: AsyncClient::with_token(config, token)?,
        })
    }

    pub fn login(config: ClientConfig, username: &str, password: &str) -> Result<Self> {
        let runtime = current_thread_runtime()?;
        let inner = runtime.block_on(AsyncClient::login(config, username, password))?;
        Ok(Self { runtime, inner })
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            runtime: current_thread_runtime()?,
            inner: AsyncClient::with_transport(config, transport),
        })
    }

    fn block_on<T, F: Future<Output = Result<T>>>(&self, future: F) -> Result<T> {
        ensure_outside_runtime()?;
        self.runtime.block_on(future)
    }

    fn iter<T>(&self, stream: BoxStream<'static, Result<T>>) -> ListIter<'_, T> {
        ListIter {
            runtime: &self.runtime,
            stream,
        }
    }

    /// The asynchronous client this façade drives
    pub fn as_async(&self) -> &AsyncClient {
        &self.inner
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    pub fn token(&self) -> Option<&str> {
        self.inner.token()
    }

    pub fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        self.block_on(self.inner.execute(request))
    }

    pub fn request_json<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        self.block_on(self.inner.request_json(request))
    }

    pub fn request_bytes(&self, request: RequestDescriptor) -> Result<Bytes> {
        self.block_on(self.inner.request_bytes(request))
    }

    pub fn request_paginated<T>(&self, request: RequestDescriptor) -> ListIter<'_, T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.iter(self.inner.request_paginated(request))
    }

    pub fn fetch_one<T: ApiResource>(&self, id: u64) -> Result<T> {
        self.block_on(self.inner.fetch_one(id))
    }

    pub fn fetch_all<T: ApiResource>(&self, query: &ListQuery) -> ListIter<'_, T> {
        self.iter(self.inner.fetch_all(query))
    }

    pub fn create<T, P>(&self, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        self.block_on(self.inner.create(payload))
    }

    pub fn update<T, P>(&self, id: u64, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        self.block_on(self.inner.update(id, payload))
    }

    pub fn replace<T, P>(&self, id: u64, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        self.block_on(self.inner.replace(id, payload))
    }

    pub fn delete<T: ApiResource>(&self, id: u64) -> Result<()> {
        self.block_on(self.inner.delete::<T>(id))
    }

    pub fn current_user(&self) -> Result<User> {
        self.block_on(self.inner.current_user())
    }

    pub fn annotations(&self) -> Resources<'_, Annotation> {
        Resources::new(self)
    }

    pub fn connectors(&self) -> Resources<'_, Connector> {
        Resources::new(self)
    }

    pub fn documents(&self) -> Resources<'_, Document> {
        Resources::new(self)
    }

    pub fn document_relations(&self) -> Resources<'_, DocumentRelation> {
        Resources::new(self)
    }

    pub fn emails(&self) -> Resources<'_, Email> {
        Resources::new(self)
    }

    pub fn email_templates(&self) -> Resources<'_, EmailTemplate> {
        Resources::new(self)
    }

    pub fn engines(&self) -> Resources<'_, Engine> {
        Resources::new(self)
    }

    pub fn engine_fields(&self) -> Resources<'_, EngineField> {
        Resources::new(self)
    }

    pub fn groups(&self) -> Resources<'_, Group> {
        Resources::new(self)
    }

    pub fn hooks(&self) -> Resources<'_, Hook> {
        Resources::new(self)
    }

    pub fn hook_run_data(&self) -> Resources<'_, HookRunData> {
        Resources::new(self)
    }

    pub fn hook_templates(&self) -> Resources<'_, HookTemplate> {
        Resources::new(self)
    }

    pub fn inboxes(&self) -> Resources<'_, Inbox> {
        Resources::new(self)
    }

    pub fn organizations(&self) -> Resources<'_, Organization> {
        Resources::new(self)
    }

    pub fn organization_groups(&self) -> Resources<'_, OrganizationGroup> {
        Resources::new(self)
    }

    pub fn queues(&self) -> Resources<'_, Queue> {
        Resources::new(self)
    }

    pub fn relations(&self) -> Resources<'_, Relation> {
        Resources::new(self)
    }

    pub fn rules(&self) -> Resources<'_, Rule> {
        Resources::new(self)
    }

    pub fn schemas(&self) -> Resources<'_, Schema> {
        Resources::new(self)
    }

    pub fn tasks(&self) -> Resources<'_, Task> {
        Resources::new(self)
    }

    pub fn uploads(&self) -> Resources<'_, Upload> {
        Resources::new(self)
    }

    pub fn users(&self) -> Resources<'_, User> {
        Resources::new(self)
    }

    pub fn workspaces(&self) -> Resources<'_, Workspace> {
        Resources::new(self)
    }
}

/// Items of a paginated listing; each `next` may block on a page fetch
///
/// Dropping the iterator stops the traversal.
pub struct ListIter<'a, T> {
    runtime: &'a Runtime,
    stream: BoxStream<'static, Result<T>>,
}

impl<'a, T: Send + 'static> Iterator for ListIter<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = ensure_outside_runtime() {
            self.stream = stream::empty().boxed();
            return Some(Err(err));
        }
        self.runtime.block_on(self.stream.next())
    }
}

/// Blocking counterpart of [`crate::resources::Resources`]
pub struct Resources<'a, T> {
    client: &'a Client,
    _kind: PhantomData<fn() -> T>,
}

impl<'a, T: ApiResource> Resources<'a, T> {
    fn new(client: &'a Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn handle(&self) -> AsyncResources<'a, T> {
        AsyncResources::new(&self.client.inner)
    }

    pub fn get(&self, id: u64) -> Result<T> {
        self.client.block_on(self.handle().get(id))
    }

    pub fn list(&self, query: &ListQuery) -> ListIter<'a, T> {
        self.client.iter(self.handle().list(query))
    }

    pub fn list_all(&self, query: &ListQuery) -> Result<Vec<T>> {
        self.client.block_on(self.handle().list_all(query))
    }

    pub fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T> {
        self.client.block_on(self.handle().create(payload))
    }

    pub fn update<P: Serialize + ?Sized>(&self, id: u64, payload: &P) -> Result<T> {
        self.client.block_on(self.handle().update(id, payload))
    }

    pub fn replace<P: Serialize + ?Sized>(&self, id: u64, payload: &P) -> Result<T> {
        self.client.block_on(self.handle().replace(id, payload))
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.client.block_on(self.handle().delete(id))
    }
}

impl<'a> Resources<'a, Annotation> {
    pub fn get_with_sideloads(&self, id: u64, sideloads: &[Sideload]) -> Result<Annotation> {
        self.client
            .block_on(self.handle().get_with_sideloads(id, sideloads))
    }

    pub fn search(
        &self,
        query: Option<Value>,
        query_string: Option<Value>,
        list: &ListQuery,
    ) -> ListIter<'a, Annotation> {
        self.client
            .iter(self.handle().search(query, query_string, list))
    }

    pub fn start(&self, id: u64) -> Result<()> {
        self.client.block_on(self.handle().start(id))
    }

    pub fn confirm(&self, id: u64) -> Result<()> {
        self.client.block_on(self.handle().confirm(id))
    }

    pub fn cancel(&self, id: u64) -> Result<()> {
        self.client.block_on(self.handle().cancel(id))
    }

    pub fn bulk_update_content(&self, id: u64, operations: Vec<Value>) -> Result<Value> {
        self.client
            .block_on(self.handle().bulk_update_content(id, operations))
    }

    pub fn poll<F>(
        &self,
        id: u64,
        predicate: F,
        interval: Duration,
        sideloads: &[Sideload],
    ) -> Result<Annotation>
    where
        F: FnMut(&Annotation) -> bool,
    {
        self.client
            .block_on(self.handle().poll(id, predicate, interval, sideloads))
    }

    pub fn poll_until_imported(&self, id: u64, interval: Duration) -> Result<Annotation> {
        self.client
            .block_on(self.handle().poll_until_imported(id, interval))
    }
}

impl<'a> Resources<'a, Queue> {
    pub fn export_json(&self, id: u64, query: &ListQuery) -> ListIter<'a, Annotation> {
        self.client.iter(self.handle().export_json(id, query))
    }

    pub fn export(&self, id: u64, format: ExportFormat, query: &ListQuery) -> Result<Bytes> {
        self.client
            .block_on(self.handle().export(id, format, query))
    }

    pub fn upload_documents(
        &self,
        id: u64,
        files: &[UploadFile],
        values: Option<&Value>,
        metadata: Option<&Value>,
    ) -> Result<Vec<Task>> {
        self.client
            .block_on(self.handle().upload_documents(id, files, values, metadata))
    }

    pub fn import_documents(
        &self,
        id: u64,
        files: &[UploadFile],
        values: Option<&Value>,
        metadata: Option<&Value>,
    ) -> Result<Vec<u64>> {
        self.client
            .block_on(self.handle().import_documents(id, files, values, metadata))
    }

    pub fn upload_and_wait_until_imported(
        &self,
        id: u64,
        file: UploadFile,
        interval: Duration,
    ) -> Result<Annotation> {
        self.client
            .block_on(self.handle().upload_and_wait_until_imported(id, file, interval))
    }
}

impl<'a> Resources<'a, Document> {
    pub fn content(&self, id: u64) -> Result<Bytes> {
        self.client.block_on(self.handle().content(id))
    }

    pub fn create_from_bytes(
        &self,
        file_name: &str,
        data: impl Into<Bytes>,
        metadata: Option<&Value>,
        parent: Option<&str>,
    ) -> Result<Document> {
        self.client
            .block_on(self.handle().create_from_bytes(file_name, data, metadata, parent))
    }
}

impl<'a> Resources<'a, Organization> {
    pub fn limits(&self, id: u64) -> Result<OrganizationLimit> {
        self.client.block_on(self.handle().limits(id))
    }

    pub fn own(&self) -> Result<Organization> {
        self.client.block_on(self.handle().own())
    }
}

impl<'a> Resources<'a, Task> {
    pub fn poll<F>(&self, id: u64, predicate: F, interval: Duration) -> Result<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        self.client
            .block_on(self.handle().poll(id, predicate, interval))
    }

    pub fn poll_until_succeeded(&self, id: u64, interval: Duration) -> Result<Task> {
        self.client
            .block_on(self.handle().poll_until_succeeded(id, interval))
    }
}

impl<'a> Resources<'a, Engine> {
    pub fn fields(&self, engine_id: Option<u64>) -> ListIter<'a, EngineField> {
        self.client.iter(self.handle().fields(engine_id))
    }

    pub fn queues(&self, engine_id: u64) -> ListIter<'a, Queue> {
        self.client.iter(self.handle().queues(engine_id))
    }
}

impl<'a> Resources<'a, Email> {
    pub fn import_email(
        &self,
        raw_message: impl Into<Bytes>,
        recipient: &str,
        mime_type: Option<&str>,
    ) -> Result<String> {
        self.client
            .block_on(self.handle().import_email(raw_message, recipient, mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ScriptedTransport;
    use crate::error::ErrorKind;
    use rossum_core::RetryConfig;
    use serde_json::json;

    fn blocking_client(transport: Arc<ScriptedTransport>) -> Client {
        let config = ClientConfig::new("https://elis.rossum.ai/api/v1").with_retry(RetryConfig::disabled());
        Client::with_transport(config, transport).unwrap()
    }

    #[test]
    fn test_not_found_kind() {
        let transport = ScriptedTransport::new();
        transport.push_json(404, json!({"detail": "Not found."}));
        let client = blocking_client(transport);

        let err = client.queues().get(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_iterates_across_pages() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"items": [{"id": 1, "name": "a", "url": "u1", "schema": "s"}], "next": "c2"}),
        );
        transport.push_json(
            200,
            json!({"items": [{"id": 2, "name": "b", "url": "u2", "schema": "s"}], "next": null}),
        );
        let client = blocking_client(transport.clone());

        let ids: Vec<u64> = client
            .queues()
            .list(&ListQuery::new())
            .map(|q| q.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn test_abandoned_iterator_fetches_nothing_more() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"items": [{"id": 1, "name": "a", "url": "u1", "schema": "s"}], "next": "c2"}),
        );
        let client = blocking_client(transport.clone());

        let first = client.queues().list(&ListQuery::new()).next();
        assert_eq!(first.unwrap().unwrap().id, 1);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_construction_inside_runtime_is_rejected() {
        let config = ClientConfig::new("https://elis.rossum.ai/api/v1");
        let err = Client::with_token(config, "token").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_calls_inside_runtime_fail_instead_of_panicking() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"items": [], "next": null}));
        let client = blocking_client(transport.clone());
        let outer = Builder::new_current_thread().enable_all().build().unwrap();

        outer.block_on(async {
            let err = client.queues().get(1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);

            let mut listing = client.queues().list(&ListQuery::new());
            assert_eq!(
                listing.next().unwrap().unwrap_err().kind(),
                ErrorKind::InvalidRequest
            );
            assert!(listing.next().is_none());
        });

        assert!(transport.sent().is_empty());
    }
}
