//! HTTP seam. The rest of the crate only sees [`HttpTransport`]; [`ReqwestTransport`]
//! is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use shared::protocol::Method;

use crate::{
    config::ClientSettings,
    error::ClientError,
    types::{HttpResponse, ResolvedRequest},
};

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, ClientError>;
}

#[derive(Debug, Clone)]
struct BasicAuth {
    username: String,
    password: String,
}

pub struct ReqwestTransport {
    http: Client,
    auth: Option<BasicAuth>,
}

impl ReqwestTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert("OCS-APIRequest", HeaderValue::from_static("true"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|err| {
                ClientError::InvalidSettings(format!("failed to build http client: {err}"))
            })?;

        let auth = match (&settings.username, &settings.app_password) {
            (Some(username), Some(password)) => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        Ok(Self { http, auth })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = match request.method {
            Method::Get => self.http.get(request.url.clone()),
            Method::Post => self.http.post(request.url.clone()),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(%request, status, bytes = body.len(), "http exchange finished");
        Ok(HttpResponse { status, body })
    }
}
