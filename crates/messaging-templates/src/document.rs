//! Declarative form of a template, for bots and tools that describe replies as JSON.
//!
//! ```json
//! {
//!   "kind": "carousel",
//!   "summary": "Menu",
//!   "text": "Pick one",
//!   "cards": [
//!     { "op": "hero", "title": "Pizza", "images": ["https://example.invalid/p.png"] },
//!     { "op": "button", "title": "Order", "value": "order pizza" }
//!   ]
//! }
//! ```
//!
//! Steps are replayed through [`Carousel`] in order, so the document is held to
//! exactly the same checks as code using the builder directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::carousel::Carousel;
use crate::errors::TemplateError;
use crate::photo::Photo;
use crate::template::SkypeTemplate;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid template document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Template(#[from] TemplateError),
    #[error("card step {index} rejected: {source}")]
    Step {
        index: usize,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateDocument {
    Photo {
        #[serde(default)]
        url: String,
    },
    Carousel {
        #[serde(default)]
        summary: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        cards: Vec<CardStep>,
    },
}

/// One builder call of a carousel document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CardStep {
    Hero {
        #[serde(default)]
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        images: Value,
    },
    Thumbnail {
        #[serde(default)]
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        images: Value,
    },
    Receipt {
        #[serde(default)]
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        total: String,
        #[serde(default)]
        tax: String,
        #[serde(default)]
        vat: String,
    },
    Button {
        #[serde(default)]
        title: String,
        #[serde(default)]
        value: String,
    },
    Item {
        #[serde(default)]
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        price: String,
        #[serde(default)]
        quantity: String,
        #[serde(default)]
        image: String,
    },
    Fact {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
    },
}

impl CardStep {
    fn apply(&self, carousel: &mut Carousel) -> Result<(), TemplateError> {
        let applied = match self {
            CardStep::Hero {
                title,
                subtitle,
                text,
                images,
            } => carousel.add_hero(title.as_str(), subtitle.as_str(), text.as_str(), images),
            CardStep::Thumbnail {
                title,
                subtitle,
                text,
                images,
            } => carousel.add_thumbnail(title.as_str(), subtitle.as_str(), text.as_str(), images),
            CardStep::Receipt {
                title,
                subtitle,
                text,
                total,
                tax,
                vat,
            } => carousel.add_receipt(
                title.as_str(),
                subtitle.as_str(),
                text.as_str(),
                total.as_str(),
                tax.as_str(),
                vat.as_str(),
            ),
            CardStep::Button { title, value } => {
                carousel.add_button(title.as_str(), value.as_str())
            }
            CardStep::Item {
                title,
                subtitle,
                text,
                price,
                quantity,
                image,
            } => carousel.add_item(
                title.as_str(),
                subtitle.as_str(),
                text.as_str(),
                price.as_str(),
                quantity.as_str(),
                image.as_str(),
            ),
            CardStep::Fact { key, value } => carousel.add_fact(key.as_str(), value.as_str()),
        };
        applied.map(|_| ())
    }
}

impl TemplateDocument {
    pub fn from_json_str(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn build(&self) -> Result<SkypeTemplate, DocumentError> {
        match self {
            TemplateDocument::Photo { url } => Ok(Photo::new(url.as_str())?.into()),
            TemplateDocument::Carousel {
                summary,
                text,
                cards,
            } => {
                let mut carousel = Carousel::new(summary.as_str(), text.as_str());
                for (index, step) in cards.iter().enumerate() {
                    step.apply(&mut carousel)
                        .map_err(|source| DocumentError::Step { index, source })?;
                }
                Ok(carousel.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::OutboundTemplate;
    use serde_json::json;

    #[test]
    fn photo_document_builds_photo() {
        let doc =
            TemplateDocument::from_value(json!({"kind": "photo", "url": "abc"})).expect("doc");
        let template = doc.build().expect("build");
        assert_eq!(template.get()["attachments"][0]["contentUrl"], json!("abc"));
    }

    #[test]
    fn photo_document_without_url_is_rejected() {
        let doc = TemplateDocument::from_value(json!({"kind": "photo"})).expect("doc");
        let err = doc.build().unwrap_err();
        assert_eq!(err.to_string(), "Photo is required for the Skype Photo template");
    }

    #[test]
    fn scalar_images_report_step_index() {
        let doc = TemplateDocument::from_value(json!({
            "kind": "carousel",
            "summary": "s",
            "text": "t",
            "cards": [
                {"op": "receipt", "title": "r"},
                {"op": "hero", "title": "h", "images": "image"}
            ]
        }))
        .expect("doc");
        match doc.build().unwrap_err() {
            DocumentError::Step { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, TemplateError::ImagesNotArray { template: "Hero" });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_images_build_an_empty_list() {
        let doc = TemplateDocument::from_value(json!({
            "kind": "carousel",
            "cards": [{"op": "thumbnail", "title": "h"}]
        }))
        .expect("doc");
        let message = doc.build().expect("build").get();
        assert_eq!(message["attachments"][0]["content"]["images"], json!([]));
    }

    #[test]
    fn bare_hero_then_bare_button_fails_on_title() {
        let doc = TemplateDocument::from_value(json!({
            "kind": "carousel",
            "cards": [{"op": "hero"}, {"op": "button"}]
        }))
        .expect("doc");
        match doc.build().unwrap_err() {
            DocumentError::Step { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, TemplateError::ButtonTitle);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = TemplateDocument::from_json_str(r#"{"kind":"video"}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}
