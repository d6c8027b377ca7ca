use adapter_config::{AdapterConfig, SkypeCredentials};
use serde_json::Value;
use tracing::debug;

use crate::dispatch::{DispatchReport, Dispatcher, Route};
use crate::errors::DispatchError;
use crate::handler::{BotHandler, Credentials, MessageParser, Responder};
use crate::message::Platform;

/// Request header carrying the Skype conversation context.
pub const CONTEXT_ID_HEADER: &str = "contextid";

/// Skype bot webhook adapter.
pub struct SkypeAdapter<P, H, R> {
    credentials: SkypeCredentials,
    parser: P,
    dispatcher: Dispatcher<H, R>,
}

impl<P: MessageParser, H: BotHandler, R: Responder> SkypeAdapter<P, H, R> {
    pub fn new(credentials: SkypeCredentials, parser: P, dispatcher: Dispatcher<H, R>) -> Self {
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
            .skype
            .clone()
            .ok_or(DispatchError::NotConfigured(Platform::Skype))?;
        let dispatcher =
            Dispatcher::new(bot, responder).with_max_concurrency(config.runtime.max_concurrency);
        Ok(Self::new(credentials, parser, dispatcher))
    }

    /// Handles one webhook call. `context_id` is the value of the
    /// [`CONTEXT_ID_HEADER`] request header, passed on with every reply.
    pub async fn handle_webhook(
        &self,
        body: &Value,
        context_id: Option<&str>,
    ) -> Result<DispatchReport, DispatchError> {
        let activities = activities(body)?;
        let route = Route {
            credentials: Credentials::Skype {
                app_id: self.credentials.app_id.clone(),
                private_key: self.credentials.private_key.clone(),
            },
            context_id: context_id.map(str::to_string),
        };

        let mut messages = Vec::with_capacity(activities.len());
        for activity in &activities {
            if let Some(message) = self.parser.parse(activity) {
                messages.push((message, route.clone()));
            }
        }
        let skipped = activities.len() - messages.len();
        debug!(
            platform = %Platform::Skype,
            received = activities.len(),
            skipped,
            "dispatching webhook activities"
        );

        let report = self.dispatcher.dispatch(messages).await;
        Ok(DispatchReport {
            received: activities.len(),
            skipped,
            ..report
        })
    }
}

/// Splits a webhook body into activities. Arrays are flattened one level, a
/// lone object is one activity and an empty body carries none.
pub fn activities(body: &Value) -> Result<Vec<&Value>, DispatchError> {
    match body {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(nested) => out.extend(nested.iter()),
                    other => out.push(other),
                }
            }
            Ok(out)
        }
        // Some connectors post a lone activity instead of a one-element batch;
        // it is dispatched rather than dropped.
        Value::Object(_) => Ok(vec![body]),
        Value::Null => Ok(Vec::new()),
        _ => Err(DispatchError::InvalidBody {
            platform: Platform::Skype,
            reason: "expected an activity or a list of activities",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_arrays_are_flattened_once() {
        let body = json!([{"id": 1}, [{"id": 2}, {"id": 3}], {"id": 4}]);
        let ids: Vec<_> = activities(&body)
            .expect("activities")
            .iter()
            .map(|a| a["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn single_object_is_one_activity() {
        let body = json!({"id": 1});
        assert_eq!(activities(&body).expect("activities").len(), 1);
        assert!(activities(&Value::Null).expect("activities").is_empty());
    }

    #[test]
    fn scalar_body_is_invalid() {
        assert!(matches!(
            activities(&json!("hello")),
            Err(DispatchError::InvalidBody {
                platform: Platform::Skype,
                ..
            })
        ));
    }
}
