use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::BackendError;
use crate::state::{Message, TranscriptResponse};
use crate::thread::ThreadId;

/// Per-operation request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Thread list and history reads
    pub read: Duration,
    /// Sending a message; covers model inference on the backend
    pub send: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(5),
            send: Duration::from_secs(20),
        }
    }
}

/// The three operations the client needs from the chat backend.
///
/// Implementations report every failure; picking a policy for it is the
/// caller's job.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_threads(&self) -> Result<Vec<ThreadId>, BackendError>;

    async fn fetch_history(&self, thread: &ThreadId) -> Result<Vec<Message>, BackendError>;

    /// Returns the full updated transcript, including the message just sent
    async fn send_message(&self, thread: &ThreadId, text: &str) -> Result<Vec<Message>, BackendError>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    timeouts: Timeouts,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(url, e))?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::from_reqwest(url, e))
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn list_threads(&self) -> Result<Vec<ThreadId>, BackendError> {
        let url = format!("{}/chat/threads", self.base_url);
        debug!(%url, "listing threads");

        let request = self.client.get(&url).timeout(self.timeouts.read);
        self.fetch_json(&url, request).await
    }

    async fn fetch_history(&self, thread: &ThreadId) -> Result<Vec<Message>, BackendError> {
        let url = format!("{}/chat/history/{}", self.base_url, thread);
        debug!(%url, "fetching history");

        let request = self.client.get(&url).timeout(self.timeouts.read);
        let body: TranscriptResponse = self.fetch_json(&url, request).await?;
        Ok(body.message)
    }

    async fn send_message(&self, thread: &ThreadId, text: &str) -> Result<Vec<Message>, BackendError> {
        let url = format!("{}/chat/{}", self.base_url, thread);
        debug!(%url, chars = text.chars().count(), "sending message");

        let request = self
            .client
            .post(&url)
            .query(&[("message", text)])
            .timeout(self.timeouts.send);
        let body: TranscriptResponse = self.fetch_json(&url, request).await?;
        Ok(body.message)
    }
}
