//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use chrono::{TimeZone, Utc};

use crate::api::{Escrow, EscrowParty, EscrowStatus};
use crate::api::types::UserProfile;

pub fn sample_profile(id: i64, username: &str) -> UserProfile {
    UserProfile {
        id,
        full_name: format!("User {id}"),
        username: username.to_string(),
        email: None,
        phone: None,
    }
}

pub fn sample_party(id: i64, username: &str) -> EscrowParty {
    EscrowParty {
        id,
        full_name: format!("User {id}"),
        username: username.to_string(),
    }
}

/// An escrow between user 1 (buyer) and user 2 (seller) in the given status.
pub fn sample_escrow(status: EscrowStatus) -> Escrow {
    Escrow {
        escrow_ref: "ESC-7F2K".to_string(),
        amount: 5_000_000,
        status,
        payer: sample_party(1, "buyer"),
        payee: sample_party(2, "seller"),
        description: "Used laptop".to_string(),
        expires_at: Some(Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap()),
        transactions: vec![],
    }
}
