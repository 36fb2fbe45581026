use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

use super::types::{DialogReply, FormAck, MessageRequest};
use crate::config::WidgetConfig;
use crate::kernel::modal::FormSubmission;

const MESSAGE_PATH: &str = "/dialogflow";
const FORM_PATH: &str = "/modal-submit";

/// Every way a backend call can fail. The controller treats them alike.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("submission rejected with status '{0}'")]
    Rejected(String),
}

/// The remote dialog service.
pub trait DialogBackend: Send + Sync + 'static {
    fn send_message(&self, request: MessageRequest) -> impl Future<Output = Result<DialogReply, NetworkError>> + Send;

    fn submit_form(&self, submission: FormSubmission) -> impl Future<Output = Result<FormAck, NetworkError>> + Send;
}

#[derive(Clone)]
pub struct HttpDialogClient {
    client: Client,
    base_url: String,
}

impl HttpDialogClient {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_default(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, NetworkError>
    where
        B: serde::Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NetworkError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| NetworkError::Malformed(e.to_string()))
    }
}

impl DialogBackend for HttpDialogClient {
    async fn send_message(&self, request: MessageRequest) -> Result<DialogReply, NetworkError> {
        let reply: DialogReply = self.post_json(MESSAGE_PATH, &request).await?;
        if reply.gpt_fallback {
            debug!("Backend answered via fallback classifier (intent '{}')", reply.intent);
        }
        Ok(reply)
    }

    async fn submit_form(&self, submission: FormSubmission) -> Result<FormAck, NetworkError> {
        let ack: FormAck = self.post_json(FORM_PATH, &submission).await?;
        if !ack.is_accepted() {
            return Err(NetworkError::Rejected(ack.status.unwrap_or_default()));
        }
        Ok(ack)
    }
}
