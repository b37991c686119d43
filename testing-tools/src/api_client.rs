use anyhow::{Context, Result};
use log::*;
use relay::Message;
use reqwest::{Client, Response, StatusCode};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach the relay")?;

        if !response.status().is_success() {
            anyhow::bail!("Health check failed with status {}", response.status());
        }

        Ok(())
    }

    /// Publish a message; returns the status the relay answered with.
    pub async fn publish(&self, message: &Message) -> Result<StatusCode> {
        debug!("Publishing message from {}", message.from);

        let response = self
            .client
            .post(format!("{}/v1/bro", self.base_url))
            .json(message)
            .send()
            .await
            .context("Failed to publish message")?;

        Ok(response.status())
    }

    /// Open a poll stream. The response is returned as soon as the headers
    /// arrive, whatever its status.
    pub async fn open_poll(&self, session_id: &str) -> Result<Response> {
        debug!("Opening poll for session {session_id}");

        self.client
            .get(format!("{}/v1/poll/{}", self.base_url, session_id))
            .send()
            .await
            .context("Failed to open poll stream")
    }
}
