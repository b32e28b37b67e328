use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Url};
use rossum_core::ClientConfig;
use tracing::debug;

use crate::credentials::CredentialProvider;
use crate::error::{Error, Result, TransportError};
use crate::request::{Body, PartContent, RequestDescriptor, Target};

/// Status line, headers and body of one HTTP exchange, uninterpreted
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues exactly one HTTP exchange per call
///
/// Implementations never retry and never interpret status codes; any status
/// received is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// [`Transport`] over a pooled `reqwest` client
pub struct HttpTransport {
    http: HttpClient,
    base_url: Url,
    credential: Option<Arc<dyn CredentialProvider>>,
}

impl HttpTransport {
    pub fn new(
        config: &ClientConfig,
        credential: Option<Arc<dyn CredentialProvider>>,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.normalized_base_url())
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let timeout = config.timeout().map_err(|e| {
            Error::InvalidRequest(format!("invalid timeout_secs {:?}: {}", config.timeout_secs, e))
        })?;

        let mut builder = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::from_reqwest)?;

        Ok(Self {
            http,
            base_url,
            credential,
        })
    }

    fn resolve(&self, target: &Target) -> std::result::Result<Url, TransportError> {
        match target {
            Target::Path(path) => self
                .base_url
                .join(path.trim_start_matches('/'))
                .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", path, e))),
            Target::Url(url) => {
                Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))
            }
        }
    }
}

fn multipart_form(
    parts: &[crate::request::FormPart],
) -> std::result::Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.content {
            PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
            PartContent::File {
                file_name,
                mime_type,
                data,
            } => {
                let mut file = Part::bytes(data.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime_type {
                    file = file.mime_str(mime).map_err(TransportError::from_reqwest)?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = self.resolve(request.target())?;
        let method = request.method().clone();

        let mut builder = self.http.request(method.clone(), url.clone());
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.bearer_token());
        }
        builder = match request.body() {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Multipart(parts)) => builder.multipart(multipart_form(parts)?),
            None => builder,
        };

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            TransportError::from_reqwest(err)
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        debug!(%method, %url, status, bytes = body.len(), "received HTTP response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
