use adapter_config::{AdapterConfig, FacebookCredentials};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatch::{DispatchReport, Dispatcher, Route};
use crate::errors::DispatchError;
use crate::handler::{BotHandler, Credentials, MessageParser, Responder};
use crate::message::Platform;

/// Body returned to a verification request whose token does not match.
pub const VERIFY_REJECTED: &str = "Error";

/// Query string of the Messenger webhook verification handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

/// Messenger webhook adapter.
pub struct FacebookAdapter<P, H, R> {
    credentials: FacebookCredentials,
    parser: P,
    dispatcher: Dispatcher<H, R>,
}

impl<P: MessageParser, H: BotHandler, R: Responder> FacebookAdapter<P, H, R> {
    pub fn new(credentials: FacebookCredentials, parser: P, dispatcher: Dispatcher<H, R>) -> Self {
        Self {
            credentials,
            parser,
            dispatcher,
        }
    }

    pub fn from_config(
        config: &AdapterConfig,
        parser: P,
        bot: H,
        responder: R,
    ) -> Result<Self, DispatchError> {
        let credentials = config
            .facebook
            .clone()
            .ok_or(DispatchError::NotConfigured(Platform::Facebook))?;
        let dispatcher =
            Dispatcher::new(bot, responder).with_max_concurrency(config.runtime.max_concurrency);
        Ok(Self::new(credentials, parser, dispatcher))
    }

    /// Answers the subscription handshake: the challenge when the token
    /// matches, [`VERIFY_REJECTED`] otherwise.
    pub fn verify(&self, query: &VerifyQuery) -> String {
        let expected = self.credentials.verify_token.as_str();
        match query.verify_token.as_deref() {
            Some(token) if !expected.is_empty() && token == expected => {
                query.challenge.clone().unwrap_or_default()
            }
            _ => {
                warn!(platform = %Platform::Facebook, "webhook verification rejected");
                VERIFY_REJECTED.to_string()
            }
        }
    }

    pub async fn handle_webhook(&self, body: &Value) -> Result<DispatchReport, DispatchError> {
        let events = messaging_events(body)?;
        let mut messages = Vec::with_capacity(events.len());
        let mut skipped = 0;
        for event in &events {
            match self.parser.parse(event) {
                Some(message) => {
                    let route = Route {
                        credentials: Credentials::Facebook {
                            access_token: self.credentials.access_token.clone(),
                        },
                        context_id: None,
                    };
                    messages.push((message, route));
                }
                None => skipped += 1,
            }
        }
        debug!(
            platform = %Platform::Facebook,
            received = events.len(),
            skipped,
            "dispatching webhook events"
        );

        let report = self.dispatcher.dispatch(messages).await;
        Ok(DispatchReport {
            received: events.len(),
            skipped,
            ..report
        })
    }
}

/// Flattens `entry[*].messaging[*]` into one ordered list of events.
pub fn messaging_events(body: &Value) -> Result<Vec<&Value>, DispatchError> {
    let entries = body
        .get("entry")
        .and_then(Value::as_array)
        .ok_or(DispatchError::InvalidBody {
            platform: Platform::Facebook,
            reason: "missing entry array",
        })?;
    let mut events = Vec::new();
    for entry in entries {
        match entry.get("messaging") {
            Some(Value::Array(items)) => events.extend(items.iter()),
            Some(Value::Null) | None => {}
            Some(other) => events.push(other),
        }
    }
    Ok(events)
}
