//! Classification of inbound Slack Events API envelopes.

use serde::Deserialize;
use tracing::{debug, info, instrument};

/// The outer Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership handshake.
    UrlVerification { challenge: String },
    /// A subscribed event.
    EventCallback { event: InnerEvent },
    #[serde(other)]
    Other,
}

/// The event carried by an `event_callback` envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    AppMention(ChatMessage),
    Message(ChatMessage),
    #[serde(other)]
    Other,
}

/// The fields the relay reads from a mention or message event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel_type: Option<String>,
}

/// What the relay should do with an inbound envelope.
#[derive(Debug, PartialEq, Eq)]
pub enum ClassifiedEvent {
    Handshake { challenge: String },
    Mention(ChatMessage),
    DirectMessage(ChatMessage),
    Ignored,
}

/// The inbound body was not a valid envelope.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse event envelope: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Channel type Slack uses for one-to-one conversations.
const DIRECT_MESSAGE_CHANNEL_TYPE: &str = "im";

/// Classify a raw envelope, ignoring anything authored by `bot_user_id`.
#[instrument(skip_all)]
pub fn classify(body: &[u8], bot_user_id: &str) -> Result<ClassifiedEvent, ParseError> {
    let envelope: EventEnvelope = serde_json::from_slice(body)?;

    let classified = match envelope {
        EventEnvelope::UrlVerification { challenge } => ClassifiedEvent::Handshake { challenge },
        EventEnvelope::EventCallback { event } => match event {
            InnerEvent::AppMention(message) if message.user != bot_user_id => {
                info!("AppMention event received");
                ClassifiedEvent::Mention(message)
            }
            InnerEvent::Message(message) if message.user != bot_user_id && message.channel_type.as_deref() == Some(DIRECT_MESSAGE_CHANNEL_TYPE) => {
                info!("Message event received");
                ClassifiedEvent::DirectMessage(message)
            }
            other => {
                debug!("Ignoring inner event: {other:?}");
                ClassifiedEvent::Ignored
            }
        },
        EventEnvelope::Other => {
            debug!("Ignoring envelope of unknown type");
            ClassifiedEvent::Ignored
        }
    };

    Ok(classified)
}

/// Derive the prompt from message text.
///
/// A leading `<@BOT>` marker for the bot's own ID is removed along with the
/// surrounding whitespace. Any other text is returned unmodified.
pub fn derive_prompt(text: &str, bot_user_id: &str) -> String {
    let marker = format!("<@{bot_user_id}>");

    match text.strip_prefix(&marker) {
        Some(rest) => rest.trim().to_string(),
        None => text.to_string(),
    }
}

// Tests.
