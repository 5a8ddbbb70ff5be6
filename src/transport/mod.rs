//! Transport bindings over the relay.
//!
//! - `http`: long-running axum server (`/test`, `/events`)
//! - `invoke`: one request per process, gateway-style JSON on stdin/stdout

pub mod http;
pub mod invoke;
