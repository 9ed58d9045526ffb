//! Typed wrappers around the remote kobo API.
//!
//! Every operation here is a thin request/response pair: serialize a JSON
//! body, unwrap the response envelope, map the payload into a typed record.
//! Balance mutation, PIN verification, and escrow transitions all happen
//! server-side; nothing in this module second-guesses the server.

pub mod auth;
pub mod banks;
pub mod client;
pub mod escrow;
pub mod topup;
pub mod types;
pub mod wallet;

pub use client::{ApiClient, ApiError, Envelope};
pub use escrow::{
    ActionSet, CreateEscrowRequest, Escrow, EscrowAction, EscrowParty, EscrowRole, EscrowStatus,
    EscrowTransaction, available_actions,
};
pub use types::{LoginSession, UserProfile, format_naira};
