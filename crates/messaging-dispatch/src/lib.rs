//! Webhook dispatch for chat bots.
//!
//! A platform adapter takes a raw webhook body, splits it into single events,
//! lets a [`MessageParser`] normalize each one into an [`InboundMessage`], runs
//! the bot and hands every reply payload to a [`Responder`]. Messages are
//! handled independently: one failing bot call or delivery is logged and
//! counted, never propagated to the webhook caller or to sibling messages.

pub mod dispatch;
pub mod errors;
pub mod facebook;
pub mod handler;
pub mod message;
pub mod skype;

pub use dispatch::{DispatchReport, Dispatcher, Route};
pub use errors::DispatchError;
pub use facebook::{FacebookAdapter, VerifyQuery};
pub use handler::{BotHandler, Credentials, Delivery, MessageParser, Responder};
pub use message::{BotReply, InboundMessage, Platform};
pub use skype::SkypeAdapter;
