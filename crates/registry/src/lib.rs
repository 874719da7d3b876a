pub use crate::handler::RegistryHandler;
use std::fmt::{Display, Formatter};
use store::StoreError;

mod handler;

/// Errors terminating the handling of a single event.
///
/// These are plain result values; whether a failed invocation is redelivered
/// is the concern of the invoking event source, not of this handler.
#[derive(Debug)]
pub enum HandlerError {
    // The event was not a THING_EVENT
    UnsupportedEventType(String),
    // The payload could not be read as a thing event
    BadEvent(String),
    // Reading or writing the registry table failed
    Store(StoreError),
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        HandlerError::Store(err)
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::UnsupportedEventType(event_type) => {
                write!(f, "Invalid event type {}", event_type)
            }
            HandlerError::BadEvent(reason) => write!(f, "Malformed thing event: {}", reason),
            HandlerError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HandlerError {}
