//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the relay-bot:
//! - Chat services (e.g., Slack)
//! - LLM services (e.g., OpenAI)
//! - The duplicate-prompt filter shared by the LLM client
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod dedup;
pub mod llm;
