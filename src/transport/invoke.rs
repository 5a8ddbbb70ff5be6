//! One-shot, serverless-style binding.
//!
//! Reads a single gateway request (`{"body": "<raw envelope>"}`) from an
//! input stream, runs it through the relay, and writes the gateway response
//! (`{"statusCode": 200, "body": "..."}`) to an output stream.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::instrument;

use crate::{
    base::types::Void,
    interaction::relay::{Relay, WebhookReply},
};

/// The subset of a gateway proxy request the relay reads.
#[derive(Debug, Default, Deserialize)]
pub struct GatewayRequest {
    #[serde(default)]
    pub body: String,
}

/// A gateway proxy response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub body: String,
}

impl From<WebhookReply> for GatewayResponse {
    fn from(reply: WebhookReply) -> Self {
        Self {
            status_code: reply.status.as_u16(),
            body: reply.body,
        }
    }
}

/// Handle one gateway request.
pub async fn handle(relay: &Relay, request: GatewayRequest) -> GatewayResponse {
    relay.handle_webhook(request.body.as_bytes()).await.into()
}

/// Read one request from `input`, handle it, and write the response to `output`.
#[instrument(skip_all)]
pub async fn run<R, W>(relay: &Relay, mut input: R, mut output: W) -> Void
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut raw = Vec::new();
    input.read_to_end(&mut raw).await?;

    let request: GatewayRequest = serde_json::from_slice(&raw)?;
    let response = handle(relay, request).await;

    output.write_all(&serde_json::to_vec(&response)?).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;

    Ok(())
}
