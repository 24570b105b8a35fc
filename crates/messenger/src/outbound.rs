use {
    async_trait::async_trait,
    lexbot_config::MessengerConfig,
    reqwest::header::CONTENT_TYPE,
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    tracing::{info, warn},
};

use crate::{
    error::{Error, Result},
    reply::ReplyPayload,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub id: String,
}

/// Send-API request body. Every reply shape is wrapped the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendEnvelope {
    pub recipient: Recipient,
    pub message: ReplyPayload,
}

impl SendEnvelope {
    pub fn new(recipient_id: impl Into<String>, message: ReplyPayload) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.into(),
            },
            message,
        }
    }
}

/// Raw answer from the send API, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub status: u16,
    pub body: String,
}

impl SendReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the platform's message-send endpoint.
#[async_trait]
pub trait SendApi: Send + Sync {
    async fn send(&self, envelope: &SendEnvelope) -> Result<SendReceipt>;
}

/// [`SendApi`] that POSTs JSON to the configured send-API URL with the page
/// access token as a query parameter.
pub struct GraphSendApi {
    http: reqwest::Client,
    url: reqwest::Url,
    access_token: Secret<String>,
}

impl GraphSendApi {
    pub fn new(http: reqwest::Client, config: &MessengerConfig) -> Result<Self> {
        let url = reqwest::Url::parse(&config.send_api_url)
            .map_err(|e| Error::external(format!("invalid send_api_url {}", config.send_api_url), e))?;
        Ok(Self {
            http,
            url,
            access_token: config.page_access_token.clone(),
        })
    }
}

#[async_trait]
impl SendApi for GraphSendApi {
    async fn send(&self, envelope: &SendEnvelope) -> Result<SendReceipt> {
        let resp = self
            .http
            .post(self.url.clone())
            .query(&[("access_token", self.access_token.expose_secret().as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(envelope)?)
            .send()
            .await
            .map_err(|e| Error::http("send API request", e))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::http("reading send API response", e))?;
        Ok(SendReceipt { status, body })
    }
}

/// What happened to one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(SendReceipt),
    /// The send API answered with a non-success status.
    Rejected(SendReceipt),
    /// No response was received.
    Failed(String),
}

/// Wraps replies in a [`SendEnvelope`] and hands them to a [`SendApi`].
///
/// Outcomes are logged and returned; nothing is retried and no error reaches
/// the inbound webhook caller.
pub struct Dispatcher<S> {
    api: S,
}

impl<S: SendApi> Dispatcher<S> {
    pub fn new(api: S) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &S {
        &self.api
    }

    pub async fn deliver(&self, recipient_id: &str, payload: ReplyPayload) -> DeliveryOutcome {
        let shape = payload.shape();
        let envelope = SendEnvelope::new(recipient_id, payload);
        match self.api.send(&envelope).await {
            Ok(receipt) if receipt.is_success() => {
                info!(
                    recipient_id,
                    shape,
                    status = receipt.status,
                    response = %receipt.body,
                    "reply sent"
                );
                DeliveryOutcome::Delivered(receipt)
            },
            Ok(receipt) => {
                warn!(
                    recipient_id,
                    shape,
                    status = receipt.status,
                    response = %receipt.body,
                    "send API rejected reply"
                );
                DeliveryOutcome::Rejected(receipt)
            },
            Err(e) => {
                warn!(recipient_id, shape, error = %e, "failed to send reply");
                DeliveryOutcome::Failed(e.to_string())
            },
        }
    }
}
