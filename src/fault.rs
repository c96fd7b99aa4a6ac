//! # Contained fault record.
//!
//! A [`Fault`] is what containment captures when a unit of work panics: the
//! original panic payload plus a backtrace taken at the containment site.
//! Handlers receive it by reference; afterwards it is either dropped or, when
//! re-raise is enabled, its payload is resumed with
//! [`std::panic::resume_unwind`].

use std::{any::Any, backtrace::Backtrace, fmt};

/// Placeholder used when the panic payload is neither `&str` nor `String`.
const OPAQUE_PAYLOAD: &str = "non-string panic payload";

/// A panic captured by containment.
pub struct Fault {
    payload: Box<dyn Any + Send>,
    backtrace: Backtrace,
}

impl Fault {
    /// Wraps a panic payload, capturing a backtrace of the current thread.
    ///
    /// The backtrace is forced regardless of `RUST_BACKTRACE`.
    pub fn new(payload: Box<dyn Any + Send>) -> Self {
        Self {
            payload,
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Returns the panic message if the payload is a string.
    pub fn message(&self) -> Option<&str> {
        payload_str(self.payload.as_ref())
    }

    /// Returns the raw panic payload.
    pub fn payload(&self) -> &(dyn Any + Send) {
        self.payload.as_ref()
    }

    /// Backtrace captured when the fault was contained.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Consumes the fault, returning the original payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or(OPAQUE_PAYLOAD))
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("message", &self.to_string())
            .finish_non_exhaustive()
    }
}

/// Renders a panic payload for logs.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload_str(payload).unwrap_or(OPAQUE_PAYLOAD).to_string()
}

fn payload_str(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Some(*s)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_str_payload() {
        let fault = Fault::new(Box::new("index out of bounds"));
        assert_eq!(fault.message(), Some("index out of bounds"));
        assert_eq!(fault.to_string(), "index out of bounds");
    }

    #[test]
    fn test_string_payload() {
        let fault = Fault::new(Box::new(format!("attempt {}", 3)));
        assert_eq!(fault.message(), Some("attempt 3"));
    }

    #[test]
    fn test_opaque_payload() {
        let fault = Fault::new(Box::new(42_u64));
        assert_eq!(fault.message(), None);
        assert_eq!(fault.to_string(), OPAQUE_PAYLOAD);
        assert_eq!(fault.payload().downcast_ref::<u64>(), Some(&42));
    }

    #[test]
    fn test_into_payload_keeps_original() {
        let fault = Fault::new(Box::new(String::from("boom")));
        let payload = fault.into_payload();
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }
}
