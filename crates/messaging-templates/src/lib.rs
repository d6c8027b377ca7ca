//! Outbound message templates for the Skype channel.
//!
//! Bots reply with either a [`Photo`] or a [`Carousel`] of hero, thumbnail and
//! receipt cards. Builders validate their arguments as they are called and
//! freeze into the Skype attachment-message JSON through
//! [`OutboundTemplate::get`].

pub mod card;
pub mod carousel;
pub mod document;
pub mod errors;
pub mod photo;
pub mod template;

pub use card::{
    CardAttachment, CardButton, CardContent, CardImage, ImageInput, ReceiptContent, ReceiptFact,
    ReceiptImage, ReceiptItem,
};
pub use carousel::Carousel;
pub use document::{CardStep, DocumentError, TemplateDocument};
pub use errors::TemplateError;
pub use photo::Photo;
pub use template::{OutboundTemplate, SkypeTemplate};
