//! Runtime services and shared state for the relay-bot.

use tracing::instrument;

use crate::{
    base::{config::Config, types::Res, types::Void},
    interaction::relay::Relay,
    service::{chat::ChatClient, dedup::DuplicateFilter, llm::LlmClient},
    transport,
};

/// How the process receives webhook calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Long-running HTTP server.
    #[default]
    Serve,
    /// Handle a single gateway request from stdin and exit.
    Invoke,
}

/// Runtime service context that can be shared across the application.
///
/// This struct holds the LLM client, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Resolves the bot identity once; it is reused for the life of the process.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client with a fresh duplicate filter.
        let llm = LlmClient::openai(&config, DuplicateFilter::new());

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, llm, chat })
    }

    /// The relay over this runtime's clients.
    pub fn relay(&self) -> Relay {
        Relay::new(self.llm.clone(), self.chat.clone())
    }

    /// Run the standalone HTTP server.
    pub async fn serve(&self) -> Void {
        transport::http::serve(self.config.listen_addr()?, self.relay()).await
    }

    /// Handle one gateway request from stdin, writing the response to stdout.
    pub async fn invoke(&self) -> Void {
        transport::invoke::run(&self.relay(), tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run in the given mode.
    pub async fn start(&self, mode: Mode) -> Void {
        match mode {
            Mode::Serve => self.serve().await,
            Mode::Invoke => self.invoke().await,
        }
    }
}
