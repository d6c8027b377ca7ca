use serde_json::{Value, json};

use crate::card::{
    ButtonKind, CardAttachment, CardButton, CardContent, ImageInput, ReceiptContent, ReceiptFact,
    ReceiptImage, ReceiptItem,
};
use crate::errors::TemplateError;
use crate::template::OutboundTemplate;

pub const CAROUSEL_MESSAGE_TYPE: &str = "message/card.carousel";
pub const CAROUSEL_LAYOUT: &str = "carousel";

/// Accumulates cards for a Skype carousel message.
///
/// Every `add_*` call returns the same builder so calls can be chained with
/// `?`. A rejected call leaves the cards added so far untouched. Buttons,
/// items and facts always go to the most recently added card.
///
/// ```
/// use messaging_templates::Carousel;
///
/// let mut carousel = Carousel::new("Menu", "Pick one");
/// carousel
///     .add_hero("Pizza", "Margherita", "Fresh basil", ["https://example.invalid/p.png"])?
///     .add_button("Order", "order pizza")?;
/// assert_eq!(carousel.get()["attachments"][0]["content"]["buttons"][0]["value"], "order pizza");
/// # Ok::<(), messaging_templates::TemplateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    summary: String,
    text: String,
    attachments: Vec<CardAttachment>,
}

impl Carousel {
    pub fn new(summary: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachments(&self) -> &[CardAttachment] {
        &self.attachments
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn add_hero(
        &mut self,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        text: impl Into<String>,
        images: impl Into<ImageInput>,
    ) -> Result<&mut Self, TemplateError> {
        let content = card_content(title, subtitle, text, images.into(), "Hero")?;
        self.attachments.push(CardAttachment::Hero(content));
        Ok(self)
    }

    pub fn add_thumbnail(
        &mut self,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        text: impl Into<String>,
        images: impl Into<ImageInput>,
    ) -> Result<&mut Self, TemplateError> {
        let content = card_content(title, subtitle, text, images.into(), "Thumbnail")?;
        self.attachments.push(CardAttachment::Thumbnail(content));
        Ok(self)
    }

    pub fn add_receipt(
        &mut self,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        text: impl Into<String>,
        total: impl Into<String>,
        tax: impl Into<String>,
        vat: impl Into<String>,
    ) -> Result<&mut Self, TemplateError> {
        self.attachments.push(CardAttachment::Receipt(ReceiptContent {
            title: title.into(),
            subtitle: subtitle.into(),
            text: text.into(),
            total: total.into(),
            tax: tax.into(),
            vat: vat.into(),
            items: Vec::new(),
            facts: Vec::new(),
            buttons: Vec::new(),
        }));
        Ok(self)
    }

    pub fn add_button(
        &mut self,
        title: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, TemplateError> {
        let title = title.into();
        if title.is_empty() {
            return Err(TemplateError::ButtonTitle);
        }
        let value = value.into();
        if value.is_empty() {
            return Err(TemplateError::ButtonValue);
        }
        self.current_mut("addButton")?
            .buttons_mut()
            .push(CardButton {
                kind: ButtonKind::ImBack,
                title,
                value,
            });
        Ok(self)
    }

    pub fn add_item(
        &mut self,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        text: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
        image: impl Into<String>,
    ) -> Result<&mut Self, TemplateError> {
        self.current_receipt_mut("addItem")?.items.push(ReceiptItem {
            title: title.into(),
            subtitle: subtitle.into(),
            text: text.into(),
            price: price.into(),
            quantity: quantity.into(),
            image: ReceiptImage { url: image.into() },
        });
        Ok(self)
    }

    pub fn add_fact(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, TemplateError> {
        self.current_receipt_mut("addFact")?.facts.push(ReceiptFact {
            key: key.into(),
            value: value.into(),
        });
        Ok(self)
    }

    /// Projects the builder into the carousel wire message without consuming it.
    pub fn get(&self) -> Value {
        json!({
            "type": CAROUSEL_MESSAGE_TYPE,
            "attachmentLayout": CAROUSEL_LAYOUT,
            "summary": self.summary,
            "text": self.text,
            "attachments": self.attachments,
        })
    }

    fn current_mut(&mut self, method: &'static str) -> Result<&mut CardAttachment, TemplateError> {
        self.attachments
            .last_mut()
            .ok_or(TemplateError::NoAttachment { method })
    }

    fn current_receipt_mut(
        &mut self,
        method: &'static str,
    ) -> Result<&mut ReceiptContent, TemplateError> {
        match self.current_mut(method)? {
            CardAttachment::Receipt(content) => Ok(content),
            _ => Err(TemplateError::ReceiptRequired { method }),
        }
    }
}

impl OutboundTemplate for Carousel {
    fn get(&self) -> Value {
        Carousel::get(self)
    }
}

fn card_content(
    title: impl Into<String>,
    subtitle: impl Into<String>,
    text: impl Into<String>,
    images: ImageInput,
    template: &'static str,
) -> Result<CardContent, TemplateError> {
    // Images are checked first so a rejected card leaves no trace.
    let images = images.into_images(template)?;
    Ok(CardContent {
        title: title.into(),
        subtitle: subtitle.into(),
        text: text.into(),
        images,
        buttons: Vec::new(),
    })
}
