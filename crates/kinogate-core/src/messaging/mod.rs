//! Messenger abstractions: inbound updates, outbound port, callback actions.

pub mod actions;
pub mod port;
pub mod types;
