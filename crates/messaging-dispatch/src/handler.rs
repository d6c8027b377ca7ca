//! Collaborator seams of the dispatcher.
//!
//! Parsing raw platform events and talking to the platform APIs live outside
//! this crate; adapters only see them through these traits. Plain closures
//! implement all three, which keeps wiring and tests short.

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::message::{BotReply, InboundMessage, Platform};

/// Turns one raw webhook event into a message, or `None` for events the bot ignores.
pub trait MessageParser: Send + Sync {
    fn parse(&self, event: &Value) -> Option<InboundMessage>;
}

impl<F> MessageParser for F
where
    F: Fn(&Value) -> Option<InboundMessage> + Send + Sync,
{
    fn parse(&self, event: &Value) -> Option<InboundMessage> {
        self(event)
    }
}

pub trait BotHandler: Send + Sync + 'static {
    fn handle(
        &self,
        message: InboundMessage,
    ) -> impl Future<Output = anyhow::Result<BotReply>> + Send;
}

impl<F, Fut> BotHandler for F
where
    F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<BotReply>> + Send,
{
    fn handle(
        &self,
        message: InboundMessage,
    ) -> impl Future<Output = anyhow::Result<BotReply>> + Send {
        self(message)
    }
}

/// Sends one serialized payload to the platform. Retries, if any, belong here.
pub trait Responder: Send + Sync + 'static {
    fn deliver(&self, delivery: Delivery) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<F, Fut> Responder for F
where
    F: Fn(Delivery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    fn deliver(&self, delivery: Delivery) -> impl Future<Output = anyhow::Result<()>> + Send {
        self(delivery)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Facebook { access_token: String },
    Skype { app_id: String, private_key: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Facebook { .. } => f
                .debug_struct("Facebook")
                .field("access_token", &"***")
                .finish(),
            Credentials::Skype { app_id, .. } => f
                .debug_struct("Skype")
                .field("app_id", app_id)
                .field("private_key", &"***")
                .finish(),
        }
    }
}

/// One outbound payload with everything the responder needs to send it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub platform: Platform,
    pub recipient: String,
    pub payload: Value,
    pub credentials: Credentials,
    /// Skype conversation context id from the webhook request headers.
    pub context_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_secrets() {
        let shown = format!(
            "{:?}",
            Credentials::Skype {
                app_id: "app".into(),
                private_key: "very-secret".into(),
            }
        );
        assert!(shown.contains("app"));
        assert!(!shown.contains("very-secret"));
    }
}
