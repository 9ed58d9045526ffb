//! # Application State
//!
//! Session state for the signed-in user. This module contains domain state
//! only - no CLI-specific types, no I/O.
//!
//! ```text
//! App
//! ├── user: Option<UserProfile>       // signed-in profile
//! ├── balance: Option<WalletBalance>  // last fetched balance
//! └── escrows: Vec<Escrow>            // escrow store, keyed by escrow_ref
//! ```
//!
//! The escrow store is a plain list because exactly one flow mutates it at a
//! time; whichever response lands last wins. Identity is `escrow_ref`, so
//! `update_escrow` replaces in place and `set_escrows` swaps the whole list
//! after a refresh.

use log::debug;

use crate::api::types::UserProfile;
use crate::api::wallet::WalletBalance;
use crate::api::Escrow;

#[derive(Default)]
pub struct App {
    pub user: Option<UserProfile>,
    pub balance: Option<WalletBalance>,
    pub escrows: Vec<Escrow>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signed-in user's id, or None before login.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Appends a newly created escrow to the store.
    pub fn add_escrow(&mut self, escrow: Escrow) {
        self.escrows.push(escrow);
    }

    /// Replaces the record with the matching `escrow_ref`, leaving every
    /// other record untouched. Returns false (and changes nothing) when no
    /// record matches.
    pub fn update_escrow(&mut self, escrow_ref: &str, escrow: Escrow) -> bool {
        match self.escrows.iter_mut().find(|e| e.escrow_ref == escrow_ref) {
            Some(slot) => {
                *slot = escrow;
                true
            }
            None => {
                debug!("update for unknown escrow {escrow_ref} ignored");
                false
            }
        }
    }

    /// Wholesale replacement after a list refresh.
    pub fn set_escrows(&mut self, escrows: Vec<Escrow>) {
        self.escrows = escrows;
    }

    pub fn escrow_by_ref(&self, escrow_ref: &str) -> Option<&Escrow> {
        self.escrows.iter().find(|e| e.escrow_ref == escrow_ref)
    }
}
