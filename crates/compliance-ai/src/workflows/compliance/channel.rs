use std::fmt;

use tokio::runtime::Runtime;
use tracing::info;

use super::message::OutboundMessage;

/// Transport seam for outbound reminders. Implementations are synchronous
/// from the caller's perspective; async clients wrap their own runtime.
pub trait SendChannel: fmt::Debug + Send + Sync {
    fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub provider_ref: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel transport failed: {0}")]
    Transport(String),
    #[error("channel runtime unavailable: {0}")]
    Runtime(String),
}

/// Fallback used when provider credentials are absent. The reminder is
/// logged and reported delivered so the pipeline keeps moving.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyChannel;

impl SendChannel for LogOnlyChannel {
    fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError> {
        info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "log-only reminder delivery"
        );
        Ok(DeliveryReceipt { provider_ref: None })
    }
}

/// Bridge to the messaging provider's webhook relay. Wraps the async HTTP
/// client behind a dedicated runtime so synchronous dispatch code can drive
/// it.
pub struct WebhookChannel {
    client: reqwest::Client,
    runtime: Runtime,
    endpoint: String,
}

impl WebhookChannel {
    pub fn new(endpoint: String, runtime: Runtime) -> Self {
        Self {
            client: reqwest::Client::new(),
            runtime,
            endpoint,
        }
    }

    /// Build the channel with its own runtime. `send` blocks on that runtime,
    /// so deliveries must run from a blocking context, never on an async
    /// worker thread.
    pub fn with_runtime(endpoint: String) -> Result<Self, ChannelError> {
        let runtime = Runtime::new().map_err(|err| ChannelError::Runtime(err.to_string()))?;
        Ok(Self::new(endpoint, runtime))
    }
}

impl fmt::Debug for WebhookChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookChannel")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SendChannel for WebhookChannel {
    fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError> {
        let payload = serde_json::json!({
            "to": message.recipient,
            "subject": message.subject,
            "body": message.body,
        });

        let response = self
            .runtime
            .block_on(self.client.post(&self.endpoint).json(&payload).send())
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Transport(format!(
                "relay returned {}",
                response.status()
            )));
        }

        let provider_ref = response
            .headers()
            .get("x-delivery-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Ok(DeliveryReceipt { provider_ref })
    }
}
