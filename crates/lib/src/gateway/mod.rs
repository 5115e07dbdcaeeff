//! Webhook HTTP server.

mod server;

pub use server::{run_gateway, GatewayState};
