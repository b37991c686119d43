use anyhow::Result;
use futures_util::stream::StreamExt;
use log::*;
use relay::Message;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::api_client::ApiClient;

#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: Message,
    pub timestamp: Instant,
}

/// An open poll stream, read in the background into a channel.
pub struct Connection {
    pub session_id: String,
    pub label: String,
    delivery_rx: mpsc::UnboundedReceiver<Delivery>,
    handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(api_client: &ApiClient, session_id: &str, label: String) -> Result<Self> {
        let response = api_client.open_poll(session_id).await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::CONFLICT => {
                anyhow::bail!("Session id {} is already taken", session_id)
            }
            status => anyhow::bail!("Poll for {} failed with status {}", session_id, status),
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffered: Vec<u8> = Vec::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("Poll stream error for {}: {}", task_label, e);
                        break;
                    }
                };
                buffered.extend_from_slice(&chunk);

                // One JSON record per line; a record may span several chunks
                while let Some(end) = buffered.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffered.drain(..=end).collect();
                    match Message::from_slice(&line[..end]) {
                        Ok(message) => {
                            let delivery = Delivery {
                                message,
                                timestamp: Instant::now(),
                            };
                            if tx.send(delivery).is_err() {
                                debug!("Poll receiver dropped for {}", task_label);
                                return;
                            }
                        }
                        Err(e) => warn!("Unreadable record for {}: {}", task_label, e),
                    }
                }
            }

            debug!("Poll stream ended for {}", task_label);
        });

        Ok(Self {
            session_id: session_id.to_string(),
            label,
            delivery_rx: rx,
            handle,
        })
    }

    pub fn is_open(&self) -> bool {
        !self.handle.is_finished()
    }

    pub async fn wait_for_message(&mut self, timeout: Duration) -> Result<Delivery> {
        match tokio::time::timeout(timeout, self.delivery_rx.recv()).await {
            Ok(Some(delivery)) => Ok(delivery),
            Ok(None) => anyhow::bail!("Poll stream for {} closed", self.session_id),
            Err(_) => anyhow::bail!("Timeout waiting for a message on {}", self.session_id),
        }
    }

    /// Succeeds when nothing arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match tokio::time::timeout(window, self.delivery_rx.recv()).await {
            Ok(Some(delivery)) => anyhow::bail!(
                "{} unexpectedly received a message from {}",
                self.session_id,
                delivery.message.from
            ),
            Ok(None) => anyhow::bail!("Poll stream for {} closed", self.session_id),
            Err(_) => Ok(()),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
