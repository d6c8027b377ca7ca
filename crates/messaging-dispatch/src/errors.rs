use thiserror::Error;

use crate::message::Platform;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid {platform} webhook body: {reason}")]
    InvalidBody {
        platform: Platform,
        reason: &'static str,
    },
    #[error("{0} credentials are not configured")]
    NotConfigured(Platform),
}
