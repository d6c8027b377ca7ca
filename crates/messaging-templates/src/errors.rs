use thiserror::Error;

/// Validation failure raised by a template builder call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Photo is required for the Skype Photo template")]
    PhotoRequired,
    #[error("Images should be sent as array for the Skype {template} template")]
    ImagesNotArray { template: &'static str },
    #[error("Title needs to be a string for Skype addButton method")]
    ButtonTitle,
    #[error("Value needs to be a string for Skype addButton method")]
    ButtonValue,
    #[error("{method} requires an attachment; add a card first")]
    NoAttachment { method: &'static str },
    #[error("{method} can only be used on a Skype Receipt card")]
    ReceiptRequired { method: &'static str },
}
