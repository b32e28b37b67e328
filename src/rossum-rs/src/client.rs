use std::sync::Arc;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use rossum_core::models::{
    Annotation, Connector, Document, DocumentRelation, Email, EmailTemplate, Engine, EngineField,
    Group, Hook, HookRunData, HookTemplate, Inbox, Organization, OrganizationGroup, Queue,
    Relation, Rule, Schema, Task, Upload, User, Workspace,
};
use rossum_core::resources::{
    action_path, resource_path, Action, DeleteStyle, AUTH_LOGIN_PATH, AUTH_USER_PATH,
};
use rossum_core::{ApiResource, ClientConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{debug, debug_span, info, Instrument};
use uuid::Uuid;

use crate::credentials::{CredentialProvider, StaticToken};
use crate::error::{Error, Result};
use crate::normalize::{check_status, decode};
use crate::pagination::paginate;
use crate::request::{ListQuery, RequestDescriptor};
use crate::resources::Resources;
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, RawResponse, Transport};

/// Asynchronous Rossum API client
///
/// Cheap to clone; clones share the connection pool, the credential and the
/// in-flight limit. Every call owns its own request, cursor and retry state.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    credential: Option<Arc<dyn CredentialProvider>>,
    retry: RetryPolicy,
    in_flight: Semaphore,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("credential", &self.inner.credential)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    key: String,
}

impl Client {
    pub fn new(config: ClientConfig, credential: impl CredentialProvider + 'static) -> Result<Self> {
        let credential: Arc<dyn CredentialProvider> = Arc::new(credential);
        let transport = HttpTransport::new(&config, Some(credential.clone()))?;
        info!(base_url = %config.base_url, "Rossum client created");
        Ok(Self::build(config, Arc::new(transport), Some(credential)))
    }

    pub fn with_token(config: ClientConfig, token: impl Into<String>) -> Result<Self> {
        Self::new(config, StaticToken::new(token))
    }

    /// Exchange username and password for a token once, then build the client around it
    pub async fn login(config: ClientConfig, username: &str, password: &str) -> Result<Self> {
        let anonymous = Self::with_transport(config.clone(), Arc::new(HttpTransport::new(&config, None)?));
        let response: LoginResponse = anonymous
            .request_json(
                RequestDescriptor::post(AUTH_LOGIN_PATH)
                    .with_json(json!({"username": username, "password": password})),
            )
            .await?;
        info!(username, "authenticated with username and password");
        Self::with_token(config, response.key)
    }

    /// Client over a caller-supplied transport; the transport handles authentication
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::build(config, transport, None)
    }

    fn build(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        credential: Option<Arc<dyn CredentialProvider>>,
    ) -> Self {
        let retry = RetryPolicy::new(config.retry.clone());
        let in_flight = Semaphore::new(config.max_in_flight_requests.max(1));
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                credential,
                retry,
                in_flight,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Bearer token sent with every request
    pub fn token(&self) -> Option<&str> {
        self.inner.credential.as_deref().map(|c| c.bearer_token())
    }

    /// Send `request` through the retry policy; only 2xx responses come back
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let span = debug_span!(
            "rossum_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            target = %request.target(),
        );
        let inner = &self.inner;

        inner
            .retry
            .run(|attempt| async move {
                let _permit = inner
                    .in_flight
                    .acquire()
                    .await
                    .map_err(|_| Error::InvalidRequest("client is shut down".to_string()))?;
                debug!(attempt, "dispatching request");
                let response = inner.transport.send(request).await?;
                check_status(response)
            })
            .instrument(span)
            .await
    }

    pub async fn request_json<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let response = self.execute(&request).await?;
        decode(&response.body)
    }

    pub async fn request_bytes(&self, request: RequestDescriptor) -> Result<Bytes> {
        Ok(self.execute(&request).await?.body)
    }

    /// Stream the items of a paginated endpoint
    pub fn request_paginated<T>(&self, request: RequestDescriptor) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        paginate(self.clone(), request, Vec::new())
    }

    /// Apply `query` to `request` and stream the results, sideloads merged in
    pub fn list_with_query<T>(
        &self,
        request: RequestDescriptor,
        query: &ListQuery,
    ) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match query.apply(request) {
            Ok(request) => paginate(self.clone(), request, query.sideloads().to_vec()),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    pub async fn fetch_one<T: ApiResource>(&self, id: u64) -> Result<T> {
        let request = RequestDescriptor::get(resource_path(T::KIND, Some(id)))
            .with_query_pairs(T::retrieve_query().iter().copied());
        self.request_json(request).await
    }

    pub fn fetch_all<T: ApiResource>(&self, query: &ListQuery) -> BoxStream<'static, Result<T>> {
        self.list_with_query(RequestDescriptor::get(resource_path(T::KIND, None)), query)
    }

    /// POST a new object; the payload must serialize to a JSON object
    pub async fn create<T, P>(&self, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        let body = json_object(payload)?;
        self.request_json(RequestDescriptor::post(resource_path(T::KIND, None)).with_json(body))
            .await
    }

    /// PATCH: fields missing from the payload are left untouched
    pub async fn update<T, P>(&self, id: u64, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        let body = json_object(payload)?;
        self.request_json(RequestDescriptor::patch(resource_path(T::KIND, Some(id))).with_json(body))
            .await
    }

    /// PUT: the payload replaces the whole object
    pub async fn replace<T, P>(&self, id: u64, payload: &P) -> Result<T>
    where
        T: ApiResource,
        P: Serialize + ?Sized,
    {
        let body = json_object(payload)?;
        self.request_json(RequestDescriptor::put(resource_path(T::KIND, Some(id))).with_json(body))
            .await
    }

    pub async fn delete<T: ApiResource>(&self, id: u64) -> Result<()> {
        let request = match T::KIND.delete_style() {
            DeleteStyle::HttpDelete => RequestDescriptor::delete(resource_path(T::KIND, Some(id))),
            DeleteStyle::PostAction => {
                RequestDescriptor::post(action_path(T::KIND, id, Action::Delete))
            }
        };
        self.execute(&request).await?;
        Ok(())
    }

    /// The user the token belongs to
    pub async fn current_user(&self) -> Result<User> {
        self.request_json(RequestDescriptor::get(AUTH_USER_PATH)).await
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

    /// User roles
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

fn json_object<P: Serialize + ?Sized>(payload: &P) -> Result<Value> {
    match serde_json::to_value(payload) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(Error::InvalidRequest(format!(
            "payload must be a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(err) => Err(Error::InvalidRequest(format!(
            "payload cannot be serialized: {}",
            err
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
