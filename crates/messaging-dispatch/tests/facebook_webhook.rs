use std::future::{Ready, ready};
use std::sync::{Arc, Mutex};

use adapter_config::{AdapterConfig, FacebookCredentials};
use messaging_dispatch::{
    BotReply, Credentials, Delivery, DispatchError, DispatchReport, FacebookAdapter,
    InboundMessage, Platform, VerifyQuery,
};
use serde_json::{Value, json};

type Sent = Arc<Mutex<Vec<Delivery>>>;

fn config() -> AdapterConfig {
    AdapterConfig {
        facebook: Some(FacebookCredentials {
            verify_token: "verify-me".into(),
            access_token: "page-token".into(),
        }),
        ..AdapterConfig::default()
    }
}

fn parse(event: &Value) -> Option<InboundMessage> {
    let sender = event.pointer("/sender/id")?.as_str()?;
    let text = event.pointer("/message/text")?.as_str()?;
    Some(InboundMessage::new(Platform::Facebook, sender, text).with_original_request(event.clone()))
}

async fn echo(message: InboundMessage) -> anyhow::Result<BotReply> {
    if message.text == "fail" {
        anyhow::bail!("cannot answer {}", message.sender);
    }
    Ok(BotReply::Text(format!("you said {}", message.text)))
}

fn recorder(sent: Sent) -> impl Fn(Delivery) -> Ready<anyhow::Result<()>> + Send + Sync + 'static {
    move |delivery: Delivery| {
        sent.lock().expect("lock").push(delivery);
        ready(Ok(()))
    }
}

fn event(sender: &str, text: &str) -> Value {
    json!({"sender": {"id": sender}, "recipient": {"id": "page"}, "message": {"text": text}})
}

#[tokio::test]
async fn verification_echoes_challenge_for_matching_token() {
    let sent = Sent::default();
    let adapter = FacebookAdapter::from_config(&config(), parse, echo, recorder(sent.clone()))
        .expect("adapter");

    let ok = VerifyQuery {
        mode: Some("subscribe".into()),
        verify_token: Some("verify-me".into()),
        challenge: Some("1158201444".into()),
    };
    assert_eq!(adapter.verify(&ok), "1158201444");

    let wrong = VerifyQuery {
        verify_token: Some("guess".into()),
        ..ok.clone()
    };
    assert_eq!(adapter.verify(&wrong), "Error");
    assert_eq!(adapter.verify(&VerifyQuery::default()), "Error");
}

#[tokio::test]
async fn replies_go_to_each_sender_with_page_token() {
    let sent = Sent::default();
    let adapter = FacebookAdapter::from_config(&config(), parse, echo, recorder(sent.clone()))
        .expect("adapter");

    let body = json!({
        "object": "page",
        "entry": [
            {"id": "p", "messaging": [event("u1", "hello")]},
            {"id": "p", "messaging": [event("u2", "bye"), {"sender": {"id": "u3"}, "delivery": {}}]}
        ]
    });
    let report = adapter.handle_webhook(&body).await.expect("report");

    assert_eq!(
        report,
        DispatchReport {
            received: 3,
            skipped: 1,
            delivered: 2,
            failed: 0
        }
    );
    let mut sent = sent.lock().expect("lock").clone();
    sent.sort_by(|a, b| a.recipient.cmp(&b.recipient));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipient, "u1");
    assert_eq!(sent[0].payload, json!("you said hello"));
    assert_eq!(sent[1].recipient, "u2");
    assert_eq!(
        sent[1].credentials,
        Credentials::Facebook {
            access_token: "page-token".into()
        }
    );
    assert_eq!(sent[1].platform, Platform::Facebook);
    assert_eq!(sent[1].context_id, None);
}

#[tokio::test]
async fn bot_failure_is_isolated() {
    let sent = Sent::default();
    let adapter = FacebookAdapter::from_config(&config(), parse, echo, recorder(sent.clone()))
        .expect("adapter");

    let body = json!({
        "entry": [{"messaging": [event("u1", "fail"), event("u2", "ok")]}]
    });
    let report = adapter.handle_webhook(&body).await.expect("report");

    assert_eq!(report.failed, 1);
    assert_eq!(report.delivered, 1);
    let sent = sent.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "u2");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let sent = Sent::default();
    let adapter = FacebookAdapter::from_config(&config(), parse, echo, recorder(sent.clone()))
        .expect("adapter");
    let err = adapter.handle_webhook(&json!({"entries": []})).await.unwrap_err();
    assert!(matches!(err, DispatchError::InvalidBody { .. }));
    assert_eq!(DispatchReport::ACK, "ok");
}

#[test]
fn missing_credentials_are_reported() {
    let sent = Sent::default();
    let result =
        FacebookAdapter::from_config(&AdapterConfig::default(), parse, echo, recorder(sent));
    assert!(matches!(
        result,
        Err(DispatchError::NotConfigured(Platform::Facebook))
    ));
}
