use kobo::api::wallet::TransferRequest;
use kobo::api::{ApiClient, CreateEscrowRequest, Escrow, EscrowStatus};
use kobo::core::actions::{self, EscrowOp};
use kobo::core::config::ResolvedConfig;
use kobo::core::keystore::Keystore;
use kobo::core::notify::{Notifier, ToastKind};
use kobo::core::state::App;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn success(data: serde_json::Value) -> serde_json::Value {
    json!({ "status": "success", "message": null, "data": data })
}

fn error_envelope(message: &str) -> serde_json::Value {
    json!({ "status": "error", "message": message, "data": null })
}

fn test_client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), "dev-test", 5)
}

fn escrow_json(escrow_ref: &str, status: &str) -> serde_json::Value {
    json!({
        "escrow_ref": escrow_ref,
        "amount": 5_000_000,
        "status": status,
        "payer": {"id": 41, "full_name": "Ada Obi", "username": "ada"},
        "payee": {"id": 52, "full_name": "Bayo Ade", "username": "bayo"},
        "description": "Used laptop"
    })
}

fn escrow_record(escrow_ref: &str, status: &str) -> Escrow {
    serde_json::from_value(escrow_json(escrow_ref, status)).unwrap()
}

fn test_config(server: &MockServer, username: Option<&str>, password: Option<&str>) -> ResolvedConfig {
    ResolvedConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        username: username.map(str::to_string),
        password: password.map(str::to_string),
    }
}

fn empty_keystore() -> Keystore {
    Keystore {
        device_id: "dev-test".to_string(),
        biometric_token: None,
        last_user_id: None,
    }
}

fn session_json() -> serde_json::Value {
    json!({
        "token": "tok_test",
        "user": {"id": 41, "full_name": "Ada Obi", "username": "ada"}
    })
}

// ============================================================================
// Sign-in paths
// ============================================================================

#[tokio::test]
async fn test_sign_in_with_password_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(session_json())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = test_client(&mock_server);
    let mut app = App::new();
    let mut keystore = empty_keystore();
    let config = test_config(&mock_server, Some("ada"), Some("hunter2"));

    actions::sign_in(&mut client, &mut app, &mut keystore, &config)
        .await
        .unwrap();

    assert!(client.is_authorized());
    assert_eq!(app.user_id(), Some(41));
    assert_eq!(keystore.last_user_id, Some(41));
}

#[tokio::test]
async fn test_sign_in_biometric_when_no_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login/biometric"))
        .and(body_json(json!({
            "user_id": 41,
            "biometric_token": "bio_xyz",
            "device_id": "dev-test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(session_json())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = test_client(&mock_server);
    let mut app = App::new();
    let mut keystore = Keystore {
        device_id: "dev-test".to_string(),
        biometric_token: Some("bio_xyz".to_string()),
        last_user_id: Some(41),
    };
    let config = test_config(&mock_server, None, None);

    actions::sign_in(&mut client, &mut app, &mut keystore, &config)
        .await
        .unwrap();

    assert!(client.is_authorized());
    assert_eq!(app.user_id(), Some(41));
}

#[tokio::test]
async fn test_enroll_biometric_stores_minted_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/biometric/enroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "biometric_token": "bio_minted"
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut keystore = empty_keystore();
    let mut notifier = Notifier::new();

    let ok = actions::enroll_biometric_flow(&client, &mut keystore, &mut notifier).await;

    assert!(ok);
    assert_eq!(keystore.biometric_token.as_deref(), Some("bio_minted"));
    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
}

// ============================================================================
// Escrow store semantics
// ============================================================================

#[tokio::test]
async fn test_create_escrow_adds_record_and_toasts_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/escrows"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success(escrow_json("ESC-NEW", "pending"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    let mut notifier = Notifier::new();
    let req = CreateEscrowRequest {
        payee_username: "bayo",
        amount: 5_000_000,
        description: "Used laptop",
        expires_at: None,
    };

    let created = actions::create_escrow_flow(&client, &mut app, &mut notifier, &req).await;

    assert!(created.is_some());
    assert_eq!(app.escrows.len(), 1);
    assert_eq!(app.escrows[0].escrow_ref, "ESC-NEW");
    assert_eq!(app.escrows[0].status, EscrowStatus::Pending);

    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
}

#[tokio::test]
async fn test_create_escrow_failure_leaves_store_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/escrows"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(error_envelope("Payee not found")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    app.add_escrow(escrow_record("ESC-OLD", "funded"));
    let mut notifier = Notifier::new();
    let req = CreateEscrowRequest {
        payee_username: "nobody",
        amount: 5_000_000,
        description: "Used laptop",
        expires_at: None,
    };

    let created = actions::create_escrow_flow(&client, &mut app, &mut notifier, &req).await;

    assert!(created.is_none());
    assert_eq!(app.escrows.len(), 1);
    assert_eq!(app.escrows[0].escrow_ref, "ESC-OLD");

    // Exactly one error toast, carrying the server's message.
    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, "Payee not found");
}

#[tokio::test]
async fn test_fund_escrow_replaces_only_the_matching_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/escrows/ESC-A/fund"))
        .and(body_json(json!({ "pin": "1234" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success(escrow_json("ESC-A", "funded"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    app.add_escrow(escrow_record("ESC-A", "pending"));
    app.add_escrow(escrow_record("ESC-B", "pending"));
    let mut notifier = Notifier::new();

    let ok = actions::escrow_op_flow(
        &client,
        &mut app,
        &mut notifier,
        "ESC-A",
        EscrowOp::Fund {
            pin: "1234".to_string(),
        },
    )
    .await;

    assert!(ok);
    assert_eq!(app.escrows.len(), 2);
    assert_eq!(
        app.escrow_by_ref("ESC-A").unwrap().status,
        EscrowStatus::Funded
    );
    assert_eq!(
        app.escrow_by_ref("ESC-B").unwrap().status,
        EscrowStatus::Pending
    );

    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Escrow ESC-A funded");
}

#[tokio::test]
async fn test_escrow_op_on_unseen_ref_fills_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/escrows/ESC-X/deliver"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success(escrow_json("ESC-X", "delivered"))),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    let mut notifier = Notifier::new();

    let ok =
        actions::escrow_op_flow(&client, &mut app, &mut notifier, "ESC-X", EscrowOp::Deliver).await;

    assert!(ok);
    assert_eq!(app.escrows.len(), 1);
    assert_eq!(
        app.escrow_by_ref("ESC-X").unwrap().status,
        EscrowStatus::Delivered
    );
}

#[tokio::test]
async fn test_failed_op_toasts_once_and_keeps_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/escrows/ESC-A/release"))
        .respond_with(ResponseTemplate::new(200).set_body_json(error_envelope("Incorrect PIN")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    app.add_escrow(escrow_record("ESC-A", "delivered"));
    let mut notifier = Notifier::new();

    let ok = actions::escrow_op_flow(
        &client,
        &mut app,
        &mut notifier,
        "ESC-A",
        EscrowOp::Release {
            pin: "0000".to_string(),
        },
    )
    .await;

    assert!(!ok);
    assert_eq!(
        app.escrow_by_ref("ESC-A").unwrap().status,
        EscrowStatus::Delivered
    );

    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, "Incorrect PIN");
}

#[tokio::test]
async fn test_refresh_escrows_replaces_wholesale() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/escrows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([
            escrow_json("ESC-C", "released")
        ]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    app.add_escrow(escrow_record("ESC-A", "pending"));
    app.add_escrow(escrow_record("ESC-B", "funded"));
    let mut notifier = Notifier::new();

    let ok = actions::refresh_escrows(&client, &mut app, &mut notifier).await;

    assert!(ok);
    assert_eq!(app.escrows.len(), 1);
    assert_eq!(app.escrows[0].escrow_ref, "ESC-C");
    // Refreshes are silent on success.
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_refresh_failure_keeps_store_and_toasts_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/escrows"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    app.add_escrow(escrow_record("ESC-A", "pending"));
    let mut notifier = Notifier::new();

    let ok = actions::refresh_escrows(&client, &mut app, &mut notifier).await;

    assert!(!ok);
    assert_eq!(app.escrows.len(), 1);
    assert_eq!(notifier.len(), 1);
}

// ============================================================================
// Money flows
// ============================================================================

#[tokio::test]
async fn test_failed_transfer_toasts_exactly_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wallet/transfer"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(error_envelope("Insufficient balance")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut notifier = Notifier::new();
    let req = TransferRequest {
        username: "bayo",
        amount: 900_000_000,
        narration: None,
        pin: "1234",
    };

    let receipt = actions::transfer_flow(&client, &mut notifier, &req).await;

    assert!(receipt.is_none());
    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, "Insufficient balance");
}

#[tokio::test]
async fn test_successful_transfer_toasts_amount_and_recipient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wallet/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "reference": "TRX-812",
            "amount": 250_050,
            "recipient": "Bayo Ade",
            "created_at": "2026-08-25T10:00:00Z"
        }))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut notifier = Notifier::new();
    let req = TransferRequest {
        username: "bayo",
        amount: 250_050,
        narration: None,
        pin: "1234",
    };

    let receipt = actions::transfer_flow(&client, &mut notifier, &req).await;

    assert!(receipt.is_some());
    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].message, "Sent ₦2,500.50 to Bayo Ade");
}

#[tokio::test]
async fn test_refresh_balance_lands_in_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "available": 1_250_000,
            "ledger": 1_300_000,
            "currency": "NGN"
        }))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut app = App::new();
    let mut notifier = Notifier::new();

    let ok = actions::refresh_balance(&client, &mut app, &mut notifier).await;

    assert!(ok);
    let balance = app.balance.unwrap();
    assert_eq!(balance.available, 1_250_000);
    assert_eq!(balance.ledger, 1_300_000);
    assert!(notifier.is_empty());
}
