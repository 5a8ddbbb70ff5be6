//! Single-slot memory of the last prompt sent upstream.

use std::sync::{Arc, Mutex, PoisonError};

/// Suppresses answering the same prompt twice in a row.
///
/// The filter remembers exactly one prompt for the whole process, not per
/// user or channel. Clones share the same slot. The read-modify-write in
/// [`DuplicateFilter::should_suppress`] runs under a mutex, so concurrent
/// handlers see a consistent "last prompt".
#[derive(Clone, Debug, Default)]
pub struct DuplicateFilter {
    last: Arc<Mutex<Option<String>>>,
}

impl DuplicateFilter {
    /// Create a filter with nothing recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` iff `prompt` equals the previously recorded prompt.
    ///
    /// Every call records `prompt` as the new "last seen" value, whatever the outcome.
    pub fn should_suppress(&self, prompt: &str) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        let repeat = last.as_deref() == Some(prompt);
        *last = Some(prompt.to_string());

        repeat
    }

    /// Forget the recorded prompt.
    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// Tests.
