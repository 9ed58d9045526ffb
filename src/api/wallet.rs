//! Wallet balance, transfers, and transaction history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

/// Current wallet balance. Amounts are kobo.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WalletBalance {
    pub available: i64,
    pub ledger: i64,
    pub currency: String,
}

/// The virtual bank account that funds this wallet when paid into.
#[derive(Deserialize, Debug, Clone)]
pub struct DedicatedAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

/// Minimal identity preview shown before a wallet-to-wallet transfer.
#[derive(Deserialize, Debug, Clone)]
pub struct RecipientPreview {
    pub id: i64,
    pub full_name: String,
    pub username: String,
}

#[derive(Serialize, Debug)]
pub struct TransferRequest<'a> {
    pub username: &'a str,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<&'a str>,
    pub pin: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransferReceipt {
    pub reference: String,
    pub amount: i64,
    pub recipient: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Credit,
    Debit,
}

/// One row of the wallet statement.
#[derive(Deserialize, Debug, Clone)]
pub struct WalletTransaction {
    pub id: i64,
    pub direction: TxDirection,
    pub amount: i64,
    #[serde(default)]
    pub narration: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl ApiClient {
    pub async fn balance(&self) -> Result<WalletBalance, ApiError> {
        self.get_json("/wallet/balance").await
    }

    pub async fn dedicated_account(&self) -> Result<DedicatedAccount, ApiError> {
        self.get_json("/wallet/dedicated-account").await
    }

    /// Looks up another wallet user by username, for confirming the
    /// recipient before a transfer.
    pub async fn lookup_user(&self, username: &str) -> Result<RecipientPreview, ApiError> {
        self.get_json_query("/users/lookup", &[("username", username)])
            .await
    }

    /// Sends money to another wallet. The server debits, credits, and
    /// verifies the PIN; a rejected PIN comes back as `ApiError::Rejected`.
    pub async fn transfer(&self, req: &TransferRequest<'_>) -> Result<TransferReceipt, ApiError> {
        self.post_json("/wallet/transfer", req).await
    }

    /// The most recent transactions, newest first.
    pub async fn transactions(&self, limit: u32) -> Result<Vec<WalletTransaction>, ApiError> {
        let limit = limit.to_string();
        self.get_json_query("/wallet/transactions", &[("limit", limit.as_str())])
            .await
    }
}
