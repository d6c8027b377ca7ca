use serde_json::Value;

use crate::carousel::Carousel;
use crate::photo::Photo;

/// A finished builder that can be frozen into its wire JSON.
pub trait OutboundTemplate {
    /// Returns the wire message. Calling it repeatedly yields equal values.
    fn get(&self) -> Value;
}

/// Any Skype template a bot may hand back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkypeTemplate {
    Photo(Photo),
    Carousel(Carousel),
}

impl OutboundTemplate for SkypeTemplate {
    fn get(&self) -> Value {
        match self {
            SkypeTemplate::Photo(photo) => photo.get(),
            SkypeTemplate::Carousel(carousel) => carousel.get(),
        }
    }
}

impl From<Photo> for SkypeTemplate {
    fn from(photo: Photo) -> Self {
        SkypeTemplate::Photo(photo)
    }
}

impl From<Carousel> for SkypeTemplate {
    fn from(carousel: Carousel) -> Self {
        SkypeTemplate::Carousel(carousel)
    }
}

impl From<&mut Carousel> for SkypeTemplate {
    fn from(carousel: &mut Carousel) -> Self {
        SkypeTemplate::Carousel(carousel.clone())
    }
}
