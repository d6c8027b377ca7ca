use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::TemplateError;

pub const HERO_CONTENT_TYPE: &str = "application/vnd.microsoft.card.hero";
pub const THUMBNAIL_CONTENT_TYPE: &str = "application/vnd.microsoft.card.thumbnail";
pub const RECEIPT_CONTENT_TYPE: &str = "application/vnd.microsoft.card.receipt";

/// One card of a carousel, serialized as the `{contentType, content}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType", content = "content")]
pub enum CardAttachment {
    #[serde(rename = "application/vnd.microsoft.card.hero")]
    Hero(CardContent),
    #[serde(rename = "application/vnd.microsoft.card.thumbnail")]
    Thumbnail(CardContent),
    #[serde(rename = "application/vnd.microsoft.card.receipt")]
    Receipt(ReceiptContent),
}

impl CardAttachment {
    pub fn content_type(&self) -> &'static str {
        match self {
            CardAttachment::Hero(_) => HERO_CONTENT_TYPE,
            CardAttachment::Thumbnail(_) => THUMBNAIL_CONTENT_TYPE,
            CardAttachment::Receipt(_) => RECEIPT_CONTENT_TYPE,
        }
    }

    pub fn buttons(&self) -> &[CardButton] {
        match self {
            CardAttachment::Hero(content) | CardAttachment::Thumbnail(content) => &content.buttons,
            CardAttachment::Receipt(content) => &content.buttons,
        }
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut Vec<CardButton> {
        match self {
            CardAttachment::Hero(content) | CardAttachment::Thumbnail(content) => {
                &mut content.buttons
            }
            CardAttachment::Receipt(content) => &mut content.buttons,
        }
    }
}

/// Content shared by hero and thumbnail cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    pub images: Vec<CardImage>,
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

impl CardImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonKind {
    #[serde(rename = "imBack")]
    ImBack,
}

/// Quick-reply button; tapping it posts `value` back to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardButton {
    #[serde(rename = "type")]
    pub kind: ButtonKind,
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptContent {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    pub total: String,
    pub tax: String,
    pub vat: String,
    pub items: Vec<ReceiptItem>,
    pub facts: Vec<ReceiptFact>,
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    pub price: String,
    pub quantity: String,
    pub image: ReceiptImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptFact {
    pub key: String,
    pub value: String,
}

/// Images argument of a hero or thumbnail card.
///
/// A missing (`null`) value means no images. Anything else that is not an
/// ordered sequence ends up as [`ImageInput::Scalar`] and is rejected when the
/// card is added.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    Sequence(Vec<String>),
    Scalar(Value),
}

impl ImageInput {
    pub fn is_sequence(&self) -> bool {
        matches!(self, ImageInput::Sequence(_))
    }

    pub(crate) fn into_images(
        self,
        template: &'static str,
    ) -> Result<Vec<CardImage>, TemplateError> {
        match self {
            ImageInput::Sequence(urls) => Ok(urls.into_iter().map(CardImage::new).collect()),
            ImageInput::Scalar(_) => Err(TemplateError::ImagesNotArray { template }),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for ImageInput {
    fn from(urls: Vec<S>) -> Self {
        ImageInput::Sequence(urls.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ImageInput {
    fn from(urls: [S; N]) -> Self {
        ImageInput::Sequence(urls.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String> + Clone> From<&[S]> for ImageInput {
    fn from(urls: &[S]) -> Self {
        ImageInput::Sequence(urls.iter().cloned().map(Into::into).collect())
    }
}

impl From<&str> for ImageInput {
    fn from(value: &str) -> Self {
        ImageInput::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for ImageInput {
    fn from(value: String) -> Self {
        ImageInput::Scalar(Value::String(value))
    }
}

impl From<Value> for ImageInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(entries) => ImageInput::Sequence(
                entries
                    .into_iter()
                    .map(|entry| match entry {
                        Value::String(url) => url,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Null => ImageInput::Sequence(Vec::new()),
            other => ImageInput::Scalar(other),
        }
    }
}

impl From<&Value> for ImageInput {
    fn from(value: &Value) -> Self {
        ImageInput::from(value.clone())
    }
}
