//! # Flows
//!
//! One function per user-visible action. Each flow calls the API, applies
//! the result to `App`, and reports the outcome through the `Notifier`.
//!
//! The toast contract: a flow pushes at most one toast per call. Failed
//! actions toast exactly one error (the server's message when it sent one);
//! successful purchases and transitions toast exactly one confirmation;
//! successful refreshes stay silent. Nothing below this layer toasts.

use log::info;

use crate::api::auth::BiometricEnrollment;
use crate::api::banks::{WithdrawReceipt, WithdrawRequest};
use crate::api::topup::{AirtimeRequest, DataRequest, TopupReceipt, TvRequest};
use crate::api::types::format_naira;
use crate::api::wallet::{TransferReceipt, TransferRequest};
use crate::api::{ApiClient, ApiError, CreateEscrowRequest, Escrow};
use crate::core::config::ResolvedConfig;
use crate::core::keystore::Keystore;
use crate::core::notify::Notifier;
use crate::core::state::App;

/// The escrow transitions a user can request, with whatever extra input
/// each one needs.
#[derive(Debug, Clone, PartialEq)]
pub enum EscrowOp {
    Fund { pin: String },
    Deliver,
    Release { pin: String },
    Refund,
    Cancel,
    Dispute { reason: String },
}

impl EscrowOp {
    /// Past-tense verb for the confirmation toast.
    pub fn past_tense(&self) -> &'static str {
        match self {
            EscrowOp::Fund { .. } => "funded",
            EscrowOp::Deliver => "marked delivered",
            EscrowOp::Release { .. } => "released",
            EscrowOp::Refund => "refunded",
            EscrowOp::Cancel => "cancelled",
            EscrowOp::Dispute { .. } => "disputed",
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Signs in with whatever credentials are available: username/password from
/// config when present, otherwise the keystore's biometric token. On success
/// the client is authorized and the profile lands in `App`.
///
/// Does not toast; the caller owns reporting so a failed sign-in surfaces
/// exactly once however many flows were queued behind it.
pub async fn sign_in(
    client: &mut ApiClient,
    app: &mut App,
    keystore: &mut Keystore,
    config: &ResolvedConfig,
) -> Result<(), ApiError> {
    let session = match (&config.username, &config.password) {
        (Some(username), Some(password)) => client.login(username, password).await?,
        _ => match (&keystore.biometric_token, keystore.last_user_id) {
            (Some(token), Some(user_id)) => client.login_biometric(user_id, token).await?,
            _ => {
                return Err(ApiError::Config(
                    "No credentials found. Set KOBO_USERNAME/KOBO_PASSWORD or enroll biometrics."
                        .to_string(),
                ));
            }
        },
    };

    info!("signed in as {}", session.user.username);
    keystore.remember_user(session.user.id);
    client.authorize(session.token);
    app.user = Some(session.user);
    Ok(())
}

/// Enrolls this device for biometric login and stores the minted token.
pub async fn enroll_biometric_flow(
    client: &ApiClient,
    keystore: &mut Keystore,
    notifier: &mut Notifier,
) -> bool {
    match client.enroll_biometric().await {
        Ok(BiometricEnrollment { biometric_token }) => {
            keystore.set_biometric_token(biometric_token);
            notifier.success("Biometric login enabled on this device");
            true
        }
        Err(e) => {
            notifier.error(e.user_message());
            false
        }
    }
}

// ============================================================================
// Wallet
// ============================================================================

pub async fn refresh_balance(client: &ApiClient, app: &mut App, notifier: &mut Notifier) -> bool {
    match client.balance().await {
        Ok(balance) => {
            app.balance = Some(balance);
            true
        }
        Err(e) => {
            notifier.error(e.user_message());
            false
        }
    }
}

pub async fn transfer_flow(
    client: &ApiClient,
    notifier: &mut Notifier,
    req: &TransferRequest<'_>,
) -> Option<TransferReceipt> {
    match client.transfer(req).await {
        Ok(receipt) => {
            notifier.success(format!(
                "Sent {} to {}",
                format_naira(receipt.amount),
                receipt.recipient
            ));
            Some(receipt)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

pub async fn withdraw_flow(
    client: &ApiClient,
    notifier: &mut Notifier,
    req: &WithdrawRequest<'_>,
) -> Option<WithdrawReceipt> {
    match client.withdraw(req).await {
        Ok(receipt) => {
            notifier.success(format!("Withdrawal of {} sent", format_naira(receipt.amount)));
            Some(receipt)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

// ============================================================================
// Top-ups
// ============================================================================

pub async fn airtime_flow(
    client: &ApiClient,
    notifier: &mut Notifier,
    req: &AirtimeRequest<'_>,
) -> Option<TopupReceipt> {
    match client.buy_airtime(req).await {
        Ok(receipt) => {
            notifier.success(format!(
                "{} airtime sent to {}",
                format_naira(receipt.amount),
                req.phone
            ));
            Some(receipt)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

pub async fn data_flow(
    client: &ApiClient,
    notifier: &mut Notifier,
    req: &DataRequest<'_>,
) -> Option<TopupReceipt> {
    match client.buy_data(req).await {
        Ok(receipt) => {
            notifier.success(format!("Data bundle sent to {}", req.phone));
            Some(receipt)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

pub async fn tv_flow(
    client: &ApiClient,
    notifier: &mut Notifier,
    req: &TvRequest<'_>,
) -> Option<TopupReceipt> {
    match client.buy_tv(req).await {
        Ok(receipt) => {
            notifier.success(format!(
                "{} subscription renewed for card {}",
                req.provider.as_str(),
                req.smartcard
            ));
            Some(receipt)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

// ============================================================================
// Escrow
// ============================================================================

/// Refreshes the escrow store from the server. Silent on success.
pub async fn refresh_escrows(client: &ApiClient, app: &mut App, notifier: &mut Notifier) -> bool {
    match client.escrows().await {
        Ok(escrows) => {
            app.set_escrows(escrows);
            true
        }
        Err(e) => {
            notifier.error(e.user_message());
            false
        }
    }
}

pub async fn create_escrow_flow(
    client: &ApiClient,
    app: &mut App,
    notifier: &mut Notifier,
    req: &CreateEscrowRequest<'_>,
) -> Option<Escrow> {
    match client.create_escrow(req).await {
        Ok(escrow) => {
            notifier.success(format!("Escrow {} created", escrow.escrow_ref));
            app.add_escrow(escrow.clone());
            Some(escrow)
        }
        Err(e) => {
            notifier.error(e.user_message());
            None
        }
    }
}

/// Requests one escrow transition and folds the server's authoritative
/// record back into the store. A record the store has never seen (stale
/// list, direct ref) is added rather than dropped.
pub async fn escrow_op_flow(
    client: &ApiClient,
    app: &mut App,
    notifier: &mut Notifier,
    escrow_ref: &str,
    op: EscrowOp,
) -> bool {
    let result = match &op {
        EscrowOp::Fund { pin } => client.fund_escrow(escrow_ref, pin).await,
        EscrowOp::Deliver => client.mark_delivered(escrow_ref).await,
        EscrowOp::Release { pin } => client.release_escrow(escrow_ref, pin).await,
        EscrowOp::Refund => client.refund_escrow(escrow_ref).await,
        EscrowOp::Cancel => client.cancel_escrow(escrow_ref).await,
        EscrowOp::Dispute { reason } => client.dispute_escrow(escrow_ref, reason).await,
    };

    match result {
        Ok(updated) => {
            notifier.success(format!("Escrow {escrow_ref} {}", op.past_tense()));
            if !app.update_escrow(escrow_ref, updated.clone()) {
                app.add_escrow(updated);
            }
            true
        }
        Err(e) => {
            notifier.error(e.user_message());
            false
        }
    }
}
