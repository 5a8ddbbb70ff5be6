//! Event handling and user interactions for relay-bot.
//!
//! This module provides functionality for handling inbound Slack events:
//! - Classifying Events API envelopes (handshakes, @-mentions, direct messages)
//! - Relaying qualifying messages to the LLM and posting the reply

pub mod event;
pub mod relay;
