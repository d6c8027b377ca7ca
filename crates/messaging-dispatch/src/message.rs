use std::fmt;

use messaging_templates::{Carousel, OutboundTemplate, Photo, SkypeTemplate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Skype,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Skype => "skype",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-neutral message handed to the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub platform: Platform,
    /// Platform id of the sender; replies are addressed to it.
    pub sender: String,
    pub text: String,
    /// The raw event the message was parsed from.
    #[serde(default)]
    pub original_request: Value,
}

impl InboundMessage {
    pub fn new(platform: Platform, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            platform,
            sender: sender.into(),
            text: text.into(),
            original_request: Value::Null,
        }
    }

    pub fn with_original_request(mut self, original_request: Value) -> Self {
        self.original_request = original_request;
        self
    }
}

/// What a bot answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum BotReply {
    Text(String),
    Template(SkypeTemplate),
    /// Already formatted platform payload, passed through untouched.
    Payload(Value),
    /// Several replies, delivered in order.
    Batch(Vec<BotReply>),
    Nothing,
}

impl BotReply {
    /// Serializes the reply into the payloads handed to the responder, one per
    /// outbound message, in order. Templates are frozen through `get()`.
    pub fn into_payloads(self) -> Vec<Value> {
        let mut payloads = Vec::new();
        self.collect_payloads(&mut payloads);
        payloads
    }

    fn collect_payloads(self, out: &mut Vec<Value>) {
        match self {
            BotReply::Text(text) => out.push(Value::String(text)),
            BotReply::Template(template) => out.push(template.get()),
            BotReply::Payload(value) => out.push(value),
            BotReply::Batch(replies) => {
                for reply in replies {
                    reply.collect_payloads(out);
                }
            }
            BotReply::Nothing => {}
        }
    }
}

impl From<String> for BotReply {
    fn from(text: String) -> Self {
        BotReply::Text(text)
    }
}

impl From<&str> for BotReply {
    fn from(text: &str) -> Self {
        BotReply::Text(text.to_string())
    }
}

impl From<SkypeTemplate> for BotReply {
    fn from(template: SkypeTemplate) -> Self {
        BotReply::Template(template)
    }
}

impl From<Photo> for BotReply {
    fn from(photo: Photo) -> Self {
        BotReply::Template(photo.into())
    }
}

impl From<Carousel> for BotReply {
    fn from(carousel: Carousel) -> Self {
        BotReply::Template(carousel.into())
    }
}

impl From<&mut Carousel> for BotReply {
    fn from(carousel: &mut Carousel) -> Self {
        BotReply::Template(carousel.into())
    }
}

impl From<Value> for BotReply {
    fn from(value: Value) -> Self {
        BotReply::Payload(value)
    }
}

impl From<Vec<BotReply>> for BotReply {
    fn from(replies: Vec<BotReply>) -> Self {
        BotReply::Batch(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_flattens_in_order() {
        let photo = Photo::new("cat.png").expect("photo");
        let reply = BotReply::Batch(vec![
            "hello".into(),
            BotReply::Nothing,
            BotReply::Batch(vec![photo.clone().into(), json!({"raw": true}).into()]),
        ]);
        assert_eq!(
            reply.into_payloads(),
            vec![json!("hello"), photo.get(), json!({"raw": true})]
        );
    }

    #[test]
    fn carousel_reply_is_serialized_through_get() {
        let mut carousel = Carousel::new("s", "t");
        carousel.add_hero("T", "S", "X", ["i"]).expect("hero");
        let expected = carousel.get();
        let payloads = BotReply::from(&mut carousel).into_payloads();
        assert_eq!(payloads, vec![expected]);
    }

    #[test]
    fn nothing_has_no_payloads() {
        assert!(BotReply::Nothing.into_payloads().is_empty());
    }

    #[test]
    fn platform_names() {
        assert_eq!(Platform::Facebook.to_string(), "facebook");
        assert_eq!(
            serde_json::to_value(Platform::Skype).expect("serialize"),
            json!("skype")
        );
    }
}
