//! Kobo: a wallet client for transfers, top-ups, and escrow.
//!
//! The [`api`] module wraps the remote service; [`core`] holds session
//! state, flows, and durable device credentials; [`cli`] is the terminal
//! front end.

pub mod api;
pub mod cli;
pub mod core;

#[cfg(test)]
pub mod test_support;
