use std::any::Any;

use thiserror::Error;

/// A handler invocation that did not complete normally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerFault {
    /// The handler body returned an error.
    #[error("{0}")]
    Failed(String),
    /// The handler body panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerFault {
    pub(crate) fn from_error(error: &anyhow::Error) -> Self {
        HandlerFault::Failed(format!("{error:#}"))
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HandlerFault::Panicked(message)
    }
}
