//! Bank directory, account resolution, and withdrawals to bank accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

#[derive(Deserialize, Debug, Clone)]
pub struct Bank {
    pub name: String,
    pub code: String,
}

/// The account holder's registered name, resolved before a withdrawal so
/// the user can confirm they typed the right account number.
#[derive(Deserialize, Debug, Clone)]
pub struct ResolvedAccount {
    pub account_name: String,
}

#[derive(Serialize, Debug)]
pub struct WithdrawRequest<'a> {
    pub bank_code: &'a str,
    pub account_number: &'a str,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<&'a str>,
    pub pin: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WithdrawReceipt {
    pub reference: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl ApiClient {
    /// The full list of supported banks, for the bank picker.
    pub async fn banks(&self) -> Result<Vec<Bank>, ApiError> {
        self.get_json("/banks").await
    }

    pub async fn resolve_account(
        &self,
        bank_code: &str,
        account_number: &str,
    ) -> Result<ResolvedAccount, ApiError> {
        self.get_json_query(
            "/banks/resolve",
            &[("bank_code", bank_code), ("account_number", account_number)],
        )
        .await
    }

    /// Moves wallet money out to a bank account. Debit and PIN verification
    /// are server-side.
    pub async fn withdraw(&self, req: &WithdrawRequest<'_>) -> Result<WithdrawReceipt, ApiError> {
        self.post_json("/wallet/withdraw", req).await
    }
}
