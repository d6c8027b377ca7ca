use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::handler::{BotHandler, Credentials, Delivery, Responder};
use crate::message::InboundMessage;

/// Where the replies to one message go.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub credentials: Credentials,
    pub context_id: Option<String>,
}

/// Outcome counters of one webhook call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Raw events found in the webhook body.
    pub received: usize,
    /// Events the parser turned down.
    pub skipped: usize,
    /// Messages whose every reply payload was delivered.
    pub delivered: usize,
    /// Messages that hit a bot or delivery failure.
    pub failed: usize,
}

impl DispatchReport {
    /// Body the webhook answers with, whatever happened to individual messages.
    pub const ACK: &'static str = "ok";
}

enum Outcome {
    Delivered,
    Failed,
}

/// Runs the bot for each message and forwards its replies to the responder.
pub struct Dispatcher<H, R> {
    bot: Arc<H>,
    responder: Arc<R>,
    limit: Option<Arc<Semaphore>>,
}

impl<H, R> Clone for Dispatcher<H, R> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            responder: Arc::clone(&self.responder),
            limit: self.limit.clone(),
        }
    }
}

impl<H: BotHandler, R: Responder> Dispatcher<H, R> {
    pub fn new(bot: H, responder: R) -> Self {
        Self {
            bot: Arc::new(bot),
            responder: Arc::new(responder),
            limit: None,
        }
    }

    /// Caps how many messages are in flight at once. `None` or `0` lifts the cap.
    pub fn with_max_concurrency(mut self, max: Option<u32>) -> Self {
        self.limit = max
            .filter(|max| *max > 0)
            .map(|max| Arc::new(Semaphore::new(max as usize)));
        self
    }

    /// Handles every message concurrently and waits for all of them.
    ///
    /// Failures are logged and counted; `received` and `skipped` are left for
    /// the platform adapter to fill in.
    pub async fn dispatch(&self, messages: Vec<(InboundMessage, Route)>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();

        for (message, route) in messages {
            let bot = Arc::clone(&self.bot);
            let responder = Arc::clone(&self.responder);
            let limit = self.limit.clone();
            tasks.spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return Outcome::Failed,
                    },
                    None => None,
                };
                handle_one(bot.as_ref(), responder.as_ref(), message, route).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Outcome::Delivered) => report.delivered += 1,
                Ok(Outcome::Failed) => report.failed += 1,
                Err(err) => {
                    error!("message task aborted: {err}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

async fn handle_one<H: BotHandler, R: Responder>(
    bot: &H,
    responder: &R,
    message: InboundMessage,
    route: Route,
) -> Outcome {
    let platform = message.platform;
    let recipient = message.sender.clone();
    debug!(%platform, sender = %recipient, "handling inbound message");

    let reply = match bot.handle(message).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(%platform, sender = %recipient, "bot handler failed: {err:#}");
            return Outcome::Failed;
        }
    };

    let payloads = reply.into_payloads();
    if payloads.is_empty() {
        debug!(%platform, sender = %recipient, "bot returned no reply");
    }
    for payload in payloads {
        let delivery = Delivery {
            platform,
            recipient: recipient.clone(),
            payload,
            credentials: route.credentials.clone(),
            context_id: route.context_id.clone(),
        };
        if let Err(err) = responder.deliver(delivery).await {
            error!(
                %platform,
                sender = %recipient,
                "reply delivery failed, dropping remaining replies: {err:#}"
            );
            return Outcome::Failed;
        }
    }
    Outcome::Delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{BotReply, Platform};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn route() -> Route {
        Route {
            credentials: Credentials::Facebook {
                access_token: "token".into(),
            },
            context_id: None,
        }
    }

    fn message(sender: &str, text: &str) -> (InboundMessage, Route) {
        (InboundMessage::new(Platform::Facebook, sender, text), route())
    }

    #[tokio::test]
    async fn failing_bot_does_not_stop_other_messages() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sent);
        let dispatcher = Dispatcher::new(
            |msg: InboundMessage| async move {
                if msg.text == "boom" {
                    anyhow::bail!("bot exploded");
                }
                anyhow::Ok(BotReply::Text(format!("echo {}", msg.text)))
            },
            move |delivery: Delivery| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().expect("lock").push(delivery.payload);
                    anyhow::Ok(())
                }
            },
        );

        let report = dispatcher
            .dispatch(vec![message("a", "hi"), message("b", "boom"), message("c", "yo")])
            .await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        let mut sent = sent.lock().expect("lock").clone();
        sent.sort_by_key(|v| v.to_string());
        assert_eq!(sent, vec![serde_json::json!("echo hi"), serde_json::json!("echo yo")]);
    }

    #[tokio::test]
    async fn delivery_failure_counts_as_failed() {
        let dispatcher = Dispatcher::new(
            |_msg: InboundMessage| async move { anyhow::Ok(BotReply::Text("hi".into())) },
            |_delivery: Delivery| async move { Err::<(), _>(anyhow::anyhow!("network down")) },
        );
        let report = dispatcher.dispatch(vec![message("a", "x")]).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_cap_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (current, max_seen) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let dispatcher = Dispatcher::new(
            move |_msg: InboundMessage| {
                let current = Arc::clone(&current);
                let max_seen = Arc::clone(&max_seen);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    anyhow::Ok(BotReply::Nothing)
                }
            },
            |_delivery: Delivery| async move { anyhow::Ok(()) },
        )
        .with_max_concurrency(Some(2));

        let batch = (0..6).map(|i| message(&format!("u{i}"), "x")).collect();
        let report = dispatcher.dispatch(batch).await;

        assert_eq!(report.delivered, 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
