//! `reqwest` blocking transport.

use super::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};
use std::time::Duration;

/// Production transport bound to one API base URL.
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::new(format!("failed to build http client: {err}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|err| TransportError::new(format!("{} {}: {}", request.method, url, err)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| TransportError::new(format!("failed to read response body: {err}")))?;
        Ok(ApiResponse { status, body })
    }
}
