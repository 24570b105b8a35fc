//! Gateway: HTTP boundary of the bot.
//!
//! Lifecycle:
//! 1. Load config and build the bot (fetcher + send API)
//! 2. Bind the listener
//! 3. Serve the webhook, push and health routes until Ctrl-C
//!
//! All messaging logic lives in `lexbot-messenger`; handlers here only decode
//! request bodies and map outcomes to status codes.

pub mod server;
pub mod state;

pub use {
    server::{build_app, start_gateway},
    state::GatewayState,
};
