//! The host half of the host-does-IO split: runs `todo-core` requests
//! against the configured backend with `reqwest`.

use reqwest::Method;
use todo_core::{HttpMethod, HttpRequest, HttpResponse, TodoClient};

use crate::config::BackendKind;

#[derive(Debug, Clone)]
pub struct Backend {
    client: TodoClient,
    http: reqwest::Client,
    kind: BackendKind,
}

impl Backend {
    pub fn new(url: &str, kind: BackendKind, http: reqwest::Client) -> Self {
        Self {
            client: TodoClient::new(url),
            http,
            kind,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn url(&self) -> &str {
        self.client.base_url()
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Sends `request` and returns whatever came back, whatever the status.
    #[tracing::instrument(skip_all, fields(method = request.method.as_str(), url = %request.path))]
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(method(request.method), &request.path)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;
        tracing::debug!(status, "backend answered");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Fetches the backend's readiness endpoint for its kind.
    pub async fn health(&self) -> Result<HttpResponse, reqwest::Error> {
        let path = format!("{}{}", self.url(), self.kind.health_path());
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        })
        .await
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
