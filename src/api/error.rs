// Dispatch fault type
// Every variant ends up in the same 500 envelope, only the text differs

use std::any::Any;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchFault {
    /// A handler reported a failure
    ///
    /// The built-in handlers cannot fail, custom route tables can.
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("{0}")]
    Handler(String),
    /// A handler panicked
    #[error("handler panicked: {0}")]
    Panic(String),
    /// The response could not be encoded as JSON
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DispatchFault {
    /// Build a fault from a `catch_unwind` payload
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panic(message)
    }

    /// Text for the `error` field, never empty
    pub fn description(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            "unknown error".to_string()
        } else {
            text
        }
    }
}
