//! Adapter speaking the backend's conversation routes

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapter::PersistenceAdapter;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::models::{
    ConversationHandle, ConversationRecord, ConversationSummary, StateSnapshot, StepAppend,
};

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    initial: &'a Value,
}

#[derive(Deserialize)]
struct ListBody {
    #[serde(default)]
    items: Vec<ConversationSummary>,
}

pub struct HttpPersistenceAdapter {
    client: Client,
    config: AdapterConfig,
}

impl HttpPersistenceAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AdapterConfig::from_env())
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn conversation_url(&self, id: &str, tail: &str) -> String {
        self.config.url(&format!("/conversations/{}{}", id, tail))
    }

    async fn send(&self, request: RequestBuilder, id: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_ok(&self, request: RequestBuilder, id: &str) -> Result<()> {
        self.send(request, id).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for HttpPersistenceAdapter {
    async fn create(&self, title: Option<&str>, initial: &Value) -> Result<ConversationHandle> {
        let request = self
            .client
            .post(self.config.url("/conversations"))
            .json(&CreateBody { title, initial });
        let handle: ConversationHandle = self.send(request, "").await?.json().await?;
        tracing::debug!(conversation_id = %handle.id, "created remote conversation");
        Ok(handle)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let request = self.client.get(self.config.url("/conversations"));
        let body: ListBody = self.send(request, "").await?.json().await?;
        Ok(body.items)
    }

    async fn load(&self, id: &str) -> Result<ConversationRecord> {
        let request = self.client.get(self.conversation_url(id, ""));
        Ok(self.send(request, id).await?.json().await?)
    }

    async fn rename(&self, id: &str, title: &str) -> Result<()> {
        let request = self
            .client
            .patch(self.conversation_url(id, "/title"))
            .json(&json!({ "title": title }));
        self.send_ok(request, id).await
    }

    async fn append_step(&self, id: &str, step: &StepAppend) -> Result<()> {
        let request = self
            .client
            .post(self.conversation_url(id, "/appendStep"))
            .json(step);
        self.send_ok(request, id).await
    }

    async fn undo(&self, id: &str) -> Result<()> {
        let request = self.client.post(self.conversation_url(id, "/undo"));
        self.send_ok(request, id).await
    }

    async fn save_state(&self, id: &str, state: &StateSnapshot) -> Result<()> {
        let request = self
            .client
            .patch(self.conversation_url(id, "/state"))
            .json(state);
        self.send_ok(request, id).await
    }

    async fn reset(&self, id: &str) -> Result<()> {
        let request = self.client.post(self.conversation_url(id, "/reset"));
        self.send_ok(request, id).await
    }

    async fn health(&self) -> Result<()> {
        let request = self.client.get(self.config.url("/health"));
        self.send_ok(request, "").await
    }
}
