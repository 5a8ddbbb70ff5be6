//! Fixed reply text used by the relay.

/// Reply posted when the completion API answers with an empty `choices` list.
///
/// "Sorry, I can't help right now."
pub const FALLBACK_REPLY: &str = "すみません、現在お手伝いできません。";
