//! HTTP access to the Preservica entity API.
//!
//! `RepositoryClient` is the seam the metadata sinks talk to. The real
//! implementation wraps one `ureq::Agent` built for the run; tests swap in
//! an in-memory client.
use crate::config::Credentials;
use base64::{engine::general_purpose, Engine as _};

/// Status and body of a completed request, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
#[error("{method} {url}: {message}")]
pub struct TransportError {
    pub method: &'static str,
    pub url: String,
    pub message: String,
}

/// Minimal verb set used by the updater. Paths are relative to `/api/`.
pub trait RepositoryClient {
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;
    fn put(&self, path: &str, body: &str) -> Result<HttpResponse, TransportError>;
    fn post(&self, path: &str, body: &str) -> Result<HttpResponse, TransportError>;
}

pub struct HttpRepository {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl HttpRepository {
    pub fn new(credentials: &Credentials) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url(&credentials.domain),
            authorization: basic_authorization(&credentials.username, &credentials.password),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn finish(
        method: &'static str,
        url: String,
        result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<HttpResponse, TransportError> {
        let fail = |url: String, err: ureq::Error| TransportError {
            method,
            url,
            message: err.to_string(),
        };
        let mut response = match result {
            Ok(response) => response,
            Err(err) => return Err(fail(url, err)),
        };
        let status = response.status().as_u16();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(err) => return Err(fail(url, err)),
        };
        tracing::debug!(method, url = %url, status, "repository response");
        Ok(HttpResponse { status, body })
    }
}

impl RepositoryClient for HttpRepository {
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        let result = self
            .agent
            .get(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/xml")
            .call();
        Self::finish("GET", url, result)
    }

    fn put(&self, path: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        let result = self
            .agent
            .put(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Content-Type", "application/xml")
            .send(body);
        Self::finish("PUT", url, result)
    }

    fn post(&self, path: &str, body: &str) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        let result = self
            .agent
            .post(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Content-Type", "application/xml")
            .send(body);
        Self::finish("POST", url, result)
    }
}

/// `https://{domain}` unless the domain already names a scheme.
pub fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

pub fn basic_authorization(username: &str, password: &str) -> String {
    let token = general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}
