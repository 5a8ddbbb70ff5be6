//! The relay: one inbound webhook in, at most one reply posted back.

use anyhow::Context;
use axum::http::StatusCode;
use tracing::{Instrument, debug, error, info, info_span, instrument};

use crate::{
    base::types::Void,
    interaction::event::{ChatMessage, ClassifiedEvent, classify, derive_prompt},
    service::{chat::ChatClient, llm::LlmClient},
};

/// Transport-neutral answer to an inbound webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: StatusCode,
    pub body: String,
}

impl WebhookReply {
    /// 200 with no body.
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            body: String::new(),
        }
    }

    /// 200 echoing a handshake challenge.
    pub fn challenge(challenge: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: challenge,
        }
    }

    /// 500 for an envelope that could not be parsed.
    pub fn parse_failure() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }
}

/// Relays qualifying Slack messages to the LLM and posts the reply.
///
/// Both transports (the HTTP server and the one-shot invocation) call into
/// [`Relay::handle_webhook`].
#[derive(Clone)]
pub struct Relay {
    llm: LlmClient,
    chat: ChatClient,
}

impl Relay {
    pub fn new(llm: LlmClient, chat: ChatClient) -> Self {
        Self { llm, chat }
    }

    /// Handle one raw webhook body.
    ///
    /// Only a malformed envelope produces a non-200 reply; completion and
    /// posting failures are logged and the call still answers 200.
    #[instrument(skip_all)]
    pub async fn handle_webhook(&self, body: &[u8]) -> WebhookReply {
        debug!("Event raw data: {}", String::from_utf8_lossy(body));

        let event = match classify(body, self.chat.bot_user_id()) {
            Ok(event) => event,
            Err(err) => {
                error!("Error parsing event: {}", err);
                return WebhookReply::parse_failure();
            }
        };

        match event {
            ClassifiedEvent::Handshake { challenge } => {
                info!("Answering URL verification handshake");
                WebhookReply::challenge(challenge)
            }
            ClassifiedEvent::Mention(message) | ClassifiedEvent::DirectMessage(message) => {
                self.relay_message(&message).await;
                WebhookReply::ok()
            }
            ClassifiedEvent::Ignored => WebhookReply::ok(),
        }
    }

    /// Relay a single message, logging any failure.
    pub async fn relay_message(&self, message: &ChatMessage) {
        let span = info_span!("relay_message", channel = %message.channel, user = %message.user);

        // Process the message.
        let result = self.relay_message_internal(message).instrument(span).await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while relaying: {:#}", err);
        }
    }

    async fn relay_message_internal(&self, message: &ChatMessage) -> Void {
        let bot_user_id = self.chat.bot_user_id();

        if message.user == bot_user_id {
            debug!("Skipping message authored by the bot itself.");
            return Ok(());
        }

        let prompt = derive_prompt(&message.text, bot_user_id);
        if prompt.trim().is_empty() {
            debug!("Skipping message with an empty prompt.");
            return Ok(());
        }

        info!("Prompt received: {}", prompt);

        let reply = self.llm.complete(&prompt).await.context("Error getting response from the completion API")?;
        if reply.is_empty() {
            info!("No reply produced.");
            return Ok(());
        }

        info!("Response from the completion API: {}", reply);

        self.chat.send_message(&message.channel, &reply).await.context("Error posting message to Slack")?;

        Ok(())
    }
}
