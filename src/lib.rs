//! Library root for `relay-bot`.
//!
//! Relay-bot lets people talk to an LLM from inside Slack:
//! - @-mention the bot in a channel, or send it a direct message
//! - The message text is sent to the OpenAI chat-completions API
//! - The reply is posted back to the same channel
//!
//! The relay is implemented once and bound to two transports: a standalone
//! HTTP server and a one-shot, serverless-style invocation.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod transport;

use base::{config::Config, types::Void};
use runtime::Mode;
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the relay-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM and chat clients
/// - Serves webhooks (or handles a single invocation)
pub async fn start(config: Config, mode: Mode) -> Void {
    info!("Starting relay-bot ...");

    // Start the crypto provider; a provider installed earlier is fine too.
    let _ = crypto::ring::default_provider().install_default();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start(mode).await?;

    Ok(())
}
