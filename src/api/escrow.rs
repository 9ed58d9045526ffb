//! Escrow records, the status/role action table, and transition wrappers.
//!
//! The server owns the escrow state machine; this module mirrors just enough
//! of it to gate which buttons a user sees. The full table:
//!
//! ```text
//!              | Buyer                      | Seller
//!  ------------+----------------------------+---------------------------
//!   pending    | Fund                       | (Awaiting Buyer Payment)
//!   funded     | Dispute                    | Deliver, Refund, Dispute
//!              | (Awaiting Seller Delivery) |
//!   delivered  | Release, Dispute           | Dispute
//!              |                            | (Awaiting Buyer Fund Release)
//!   terminal   | -                          | -
//! ```
//!
//! Observers (neither party) and terminal statuses get no actions and no
//! prompt. Every transition request goes to the server, which revalidates;
//! the table here only decides what to offer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{ApiClient, ApiError};

// ============================================================================
// Status, role, action
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EscrowStatus {
    Pending,
    Funded,
    Delivered,
    Released,
    Refunded,
    Disputed,
    Cancelled,
}

impl EscrowStatus {
    /// Terminal statuses admit no further transitions from the client.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EscrowStatus::Released
                | EscrowStatus::Refunded
                | EscrowStatus::Disputed
                | EscrowStatus::Cancelled
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            EscrowStatus::Pending => "Pending",
            EscrowStatus::Funded => "Funded",
            EscrowStatus::Delivered => "Delivered",
            EscrowStatus::Released => "Released",
            EscrowStatus::Refunded => "Refunded",
            EscrowStatus::Disputed => "Disputed",
            EscrowStatus::Cancelled => "Cancelled",
        }
    }
}

/// How the signed-in user relates to one escrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowRole {
    Buyer,
    Seller,
    /// Neither party. Nothing is offered.
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowAction {
    Fund,
    Deliver,
    Release,
    Refund,
    Dispute,
}

impl EscrowAction {
    pub fn label(&self) -> &'static str {
        match self {
            EscrowAction::Fund => "Fund Escrow",
            EscrowAction::Deliver => "Deliver",
            EscrowAction::Release => "Release Funds",
            EscrowAction::Refund => "Refund",
            EscrowAction::Dispute => "Dispute",
        }
    }
}

/// What one (status, role) cell of the table offers: zero or more actions,
/// and at most one waiting prompt shown when the other party must move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSet {
    pub actions: &'static [EscrowAction],
    pub prompt: Option<&'static str>,
}

impl ActionSet {
    const EMPTY: ActionSet = ActionSet {
        actions: &[],
        prompt: None,
    };

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// The action table. Total over every (status, role) pair; unlisted cells
/// are empty.
pub fn available_actions(status: EscrowStatus, role: EscrowRole) -> ActionSet {
    use EscrowAction::*;
    use EscrowRole::*;
    use EscrowStatus::*;

    match (status, role) {
        (Pending, Buyer) => ActionSet {
            actions: &[Fund],
            prompt: None,
        },
        (Pending, Seller) => ActionSet {
            actions: &[],
            prompt: Some("Awaiting Buyer Payment"),
        },
        (Funded, Buyer) => ActionSet {
            actions: &[Dispute],
            prompt: Some("Awaiting Seller Delivery"),
        },
        (Funded, Seller) => ActionSet {
            actions: &[Deliver, Refund, Dispute],
            prompt: None,
        },
        (Delivered, Buyer) => ActionSet {
            actions: &[Release, Dispute],
            prompt: None,
        },
        (Delivered, Seller) => ActionSet {
            actions: &[Dispute],
            prompt: Some("Awaiting Buyer Fund Release"),
        },
        // Terminal statuses and observers.
        _ => ActionSet::EMPTY,
    }
}

// ============================================================================
// Records
// ============================================================================

/// One side of an escrow agreement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EscrowParty {
    pub id: i64,
    pub full_name: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EscrowActor {
    pub id: i64,
    pub full_name: String,
}

/// One row of an escrow's audit timeline, e.g. "funded" by the buyer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EscrowTransaction {
    pub id: i64,
    pub escrow_id: i64,
    pub action: String,
    pub actor: EscrowActor,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// A full escrow record as the server reports it. `escrow_ref` is the
/// stable public identifier; amounts are kobo.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Escrow {
    pub escrow_ref: String,
    pub amount: i64,
    pub status: EscrowStatus,
    /// The buyer: funds the escrow, releases on delivery.
    pub payer: EscrowParty,
    /// The seller: delivers, may refund.
    pub payee: EscrowParty,
    pub description: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transactions: Vec<EscrowTransaction>,
}

impl Escrow {
    /// The given user's role in this escrow.
    pub fn role_of(&self, user_id: i64) -> EscrowRole {
        if self.payer.id == user_id {
            EscrowRole::Buyer
        } else if self.payee.id == user_id {
            EscrowRole::Seller
        } else {
            EscrowRole::Observer
        }
    }

    /// Table lookup for the given user against this record's status.
    pub fn actions_for(&self, user_id: i64) -> ActionSet {
        available_actions(self.status, self.role_of(user_id))
    }
}

#[derive(Serialize, Debug)]
pub struct CreateEscrowRequest<'a> {
    pub payee_username: &'a str,
    pub amount: i64,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Wrappers
// ============================================================================

impl ApiClient {
    /// Every escrow the signed-in user is party to.
    pub async fn escrows(&self) -> Result<Vec<Escrow>, ApiError> {
        self.get_json("/escrows").await
    }

    /// One escrow by its public reference, with its transaction timeline.
    pub async fn escrow(&self, escrow_ref: &str) -> Result<Escrow, ApiError> {
        self.get_json(&format!("/escrows/{escrow_ref}")).await
    }

    /// Opens a new escrow with the caller as buyer. Starts `pending`.
    pub async fn create_escrow(&self, req: &CreateEscrowRequest<'_>) -> Result<Escrow, ApiError> {
        self.post_json("/escrows", req).await
    }

    /// Buyer moves wallet money into the escrow. `pending` to `funded`.
    pub async fn fund_escrow(&self, escrow_ref: &str, pin: &str) -> Result<Escrow, ApiError> {
        self.post_json(&format!("/escrows/{escrow_ref}/fund"), &json!({ "pin": pin }))
            .await
    }

    /// Seller marks the goods or service delivered. `funded` to `delivered`.
    pub async fn mark_delivered(&self, escrow_ref: &str) -> Result<Escrow, ApiError> {
        self.post_json(&format!("/escrows/{escrow_ref}/deliver"), &json!({}))
            .await
    }

    /// Buyer releases the held funds to the seller. `delivered` to `released`.
    pub async fn release_escrow(&self, escrow_ref: &str, pin: &str) -> Result<Escrow, ApiError> {
        self.post_json(
            &format!("/escrows/{escrow_ref}/release"),
            &json!({ "pin": pin }),
        )
        .await
    }

    /// Seller returns the held funds to the buyer. `funded` to `refunded`.
    pub async fn refund_escrow(&self, escrow_ref: &str) -> Result<Escrow, ApiError> {
        self.post_json(&format!("/escrows/{escrow_ref}/refund"), &json!({}))
            .await
    }

    /// Buyer withdraws an escrow nobody has funded. `pending` to `cancelled`.
    pub async fn cancel_escrow(&self, escrow_ref: &str) -> Result<Escrow, ApiError> {
        self.post_json(&format!("/escrows/{escrow_ref}/cancel"), &json!({}))
            .await
    }

    /// Either party freezes the escrow for arbitration. Terminal for the
    /// client; support takes over from here.
    pub async fn dispute_escrow(&self, escrow_ref: &str, reason: &str) -> Result<Escrow, ApiError> {
        self.post_json(
            &format!("/escrows/{escrow_ref}/dispute"),
            &json!({ "reason": reason }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EscrowAction::*;
    use EscrowRole::*;
    use EscrowStatus::*;

    /// Macro to pin every cell of the action table.
    /// $name:ident is the test function name (name it after the cell)
    /// $status:expr / $role:expr select the cell
    /// $actions:expr / $prompt:expr are the expected contents
    macro_rules! test_action_table {
        ( $($name:ident: ($status:expr, $role:expr) => ($actions:expr, $prompt:expr),)+ ) => {
            $(
                #[test]
                fn $name() {
                    let set = available_actions($status, $role);
                    let expected: &[EscrowAction] = $actions;
                    assert_eq!(set.actions, expected);
                    assert_eq!(set.prompt, $prompt);
                }
            )+
        };
    }

    test_action_table! {
        test_action_table_pending_buyer: (Pending, Buyer) => (&[Fund], None),
        test_action_table_pending_seller: (Pending, Seller) => (&[], Some("Awaiting Buyer Payment")),
        test_action_table_funded_buyer: (Funded, Buyer) => (&[Dispute], Some("Awaiting Seller Delivery")),
        test_action_table_funded_seller: (Funded, Seller) => (&[Deliver, Refund, Dispute], None),
        test_action_table_delivered_buyer: (Delivered, Buyer) => (&[Release, Dispute], None),
        test_action_table_delivered_seller: (Delivered, Seller) => (&[Dispute], Some("Awaiting Buyer Fund Release")),
        test_action_table_released_buyer: (Released, Buyer) => (&[], None),
        test_action_table_released_seller: (Released, Seller) => (&[], None),
        test_action_table_refunded_buyer: (Refunded, Buyer) => (&[], None),
        test_action_table_refunded_seller: (Refunded, Seller) => (&[], None),
        test_action_table_disputed_buyer: (Disputed, Buyer) => (&[], None),
        test_action_table_disputed_seller: (Disputed, Seller) => (&[], None),
        test_action_table_cancelled_buyer: (Cancelled, Buyer) => (&[], None),
        test_action_table_cancelled_seller: (Cancelled, Seller) => (&[], None),
    }

    #[test]
    fn test_observer_gets_nothing_in_every_status() {
        for status in [
            Pending, Funded, Delivered, Released, Refunded, Disputed, Cancelled,
        ] {
            let set = available_actions(status, Observer);
            assert!(set.is_empty(), "observer offered actions in {status:?}");
            assert_eq!(set.prompt, None, "observer prompted in {status:?}");
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!Pending.is_terminal());
        assert!(!Funded.is_terminal());
        assert!(!Delivered.is_terminal());
        assert!(Released.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(Disputed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_terminal_statuses_offer_no_actions() {
        for status in [Released, Refunded, Disputed, Cancelled] {
            for role in [Buyer, Seller, Observer] {
                let set = available_actions(status, role);
                assert!(set.is_empty());
                assert_eq!(set.prompt, None);
            }
        }
    }

    fn party(id: i64, username: &str) -> EscrowParty {
        EscrowParty {
            id,
            full_name: format!("User {id}"),
            username: username.to_string(),
        }
    }

    fn sample_escrow(status: EscrowStatus) -> Escrow {
        Escrow {
            escrow_ref: "ESC-7F2K".to_string(),
            amount: 5_000_000,
            status,
            payer: party(1, "buyer"),
            payee: party(2, "seller"),
            description: "Used laptop".to_string(),
            expires_at: None,
            transactions: vec![],
        }
    }

    #[test]
    fn test_role_of() {
        let escrow = sample_escrow(Pending);
        assert_eq!(escrow.role_of(1), Buyer);
        assert_eq!(escrow.role_of(2), Seller);
        assert_eq!(escrow.role_of(99), Observer);
    }

    #[test]
    fn test_actions_for_routes_through_role() {
        let escrow = sample_escrow(Funded);
        assert_eq!(escrow.actions_for(2).actions, &[Deliver, Refund, Dispute]);
        assert_eq!(escrow.actions_for(1).actions, &[Dispute]);
        assert!(escrow.actions_for(99).is_empty());
    }

    /// Contract test: status names travel lowercase on the wire.
    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Pending).unwrap(), r#""pending""#);
        assert_eq!(serde_json::to_string(&Delivered).unwrap(), r#""delivered""#);
        let parsed: EscrowStatus = serde_json::from_str(r#""refunded""#).unwrap();
        assert_eq!(parsed, Refunded);
    }

    #[test]
    fn test_escrow_deserialization_without_timeline() {
        // List responses omit `transactions`; the field must default.
        let json = r#"{
            "escrow_ref": "ESC-9B1T",
            "amount": 250000,
            "status": "funded",
            "payer": {"id": 1, "full_name": "Ada Obi", "username": "ada"},
            "payee": {"id": 2, "full_name": "Bayo Ade", "username": "bayo"},
            "description": "Phone repair"
        }"#;
        let escrow: Escrow = serde_json::from_str(json).unwrap();
        assert_eq!(escrow.status, Funded);
        assert_eq!(escrow.expires_at, None);
        assert!(escrow.transactions.is_empty());
    }

    #[test]
    fn test_create_request_serialization() {
        let req = CreateEscrowRequest {
            payee_username: "bayo",
            amount: 250_000,
            description: "Phone repair",
            expires_at: None,
        };
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(
            serialized,
            r#"{"payee_username":"bayo","amount":250000,"description":"Phone repair"}"#
        );
    }
}
