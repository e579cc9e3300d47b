//! reqwest client for the todo backend.
//!
//! One round trip per call against `{base_url}/todos/` and
//! `{base_url}/todos/{id}`. Pure status and body handling in `check` and
//! `parse` for testability.

use async_trait::async_trait;
use board::doc::TodoId;
use serde::de::DeserializeOwned;

use super::TodoApi;
use super::types::{ApiError, NewTodo, TodoPatch, TodoRecord};
use crate::config::Config;

pub struct HttpTodoApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to load.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    fn collection_url(&self) -> String {
        collection_url(&self.base_url)
    }

    fn item_url(&self, id: TodoId) -> String {
        item_url(&self.base_url, id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        check(status, text)
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<TodoRecord>, ApiError> {
        let text = self.send(self.http.get(self.collection_url())).await?;
        parse(&text)
    }

    async fn create(&self, todo: &NewTodo) -> Result<TodoRecord, ApiError> {
        let text = self
            .send(self.http.post(self.collection_url()).json(todo))
            .await?;
        parse(&text)
    }

    async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<TodoRecord, ApiError> {
        let text = self.send(self.http.put(self.item_url(id)).json(patch)).await?;
        parse(&text)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        self.send(self.http.delete(self.item_url(id))).await?;
        Ok(())
    }
}

fn collection_url(base_url: &str) -> String {
    format!("{base_url}/todos/")
}

fn item_url(base_url: &str, id: TodoId) -> String {
    format!("{base_url}/todos/{id}")
}

/// Every non-2xx status is an error, body attached.
fn check(status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::Response { status, body })
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
