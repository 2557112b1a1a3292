//! Single-read feedback messages carried across one redirect.
//!
//! [`FlashChannel`] is the push/drain primitive; the HTTP adapter stores the
//! queue in the cookie session, while [`FlashQueue`] keeps it in memory for
//! services exercised outside a request.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ports::define_port_error;

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// Confirmation of something that worked.
    Info,
    /// Something the user has to fix or retry.
    Error,
}

/// A message queued for exactly one subsequent render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }
}

define_port_error! {
    /// Errors raised by flash channel adapters.
    pub enum FlashError {
        /// The backing store could not read or write the queue.
        Storage { message: String } => "flash storage failed: {message}",
    }
}

/// Per-session (or per anonymous visitor) message queue.
///
/// Messages are delivered at most once: `drain_all` returns every pending
/// message and leaves the queue empty.
pub trait FlashChannel {
    /// Append a message to the queue.
    fn push(&self, message: FlashMessage) -> Result<(), FlashError>;

    /// Remove and return all pending messages in push order.
    fn drain_all(&self) -> Result<Vec<FlashMessage>, FlashError>;
}

/// In-memory [`FlashChannel`].
#[derive(Debug, Default)]
pub struct FlashQueue {
    messages: Mutex<Vec<FlashMessage>>,
}

impl FlashQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlashChannel for FlashQueue {
    fn push(&self, message: FlashMessage) -> Result<(), FlashError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }

    fn drain_all(&self) -> Result<Vec<FlashMessage>, FlashError> {
        let mut messages = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(std::mem::take(&mut *messages))
    }
}
