use serde_json::{Value, json};

use crate::errors::TemplateError;
use crate::template::OutboundTemplate;

pub const PHOTO_MESSAGE_TYPE: &str = "message/image";

/// Single-image Skype message. The content may be a URL or a base64 data string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    content_url: String,
}

impl Photo {
    pub fn new(content_url: impl Into<String>) -> Result<Self, TemplateError> {
        let content_url = content_url.into();
        if content_url.is_empty() {
            return Err(TemplateError::PhotoRequired);
        }
        Ok(Self { content_url })
    }

    pub fn content_url(&self) -> &str {
        &self.content_url
    }

    pub fn get(&self) -> Value {
        json!({
            "type": PHOTO_MESSAGE_TYPE,
            "attachments": [{"contentUrl": self.content_url}]
        })
    }
}

impl OutboundTemplate for Photo {
    fn get(&self) -> Value {
        Photo::get(self)
    }
}
