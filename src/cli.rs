//! # Command-Line Interface
//!
//! Flat command dispatcher over the flows in `core::actions`. Each
//! invocation signs in fresh (session tokens are never persisted), runs one
//! command, prints its output, then drains the toast queue: successes to
//! stdout, errors to stderr. The process exit code reflects whether any
//! error toast was queued.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::warn;

use crate::api::banks::WithdrawRequest;
use crate::api::topup::{AirtimeRequest, DataRequest, Network, TvProvider, TvRequest};
use crate::api::types::format_naira;
use crate::api::wallet::{TransferRequest, TxDirection};
use crate::api::{ApiClient, CreateEscrowRequest, Escrow};
use crate::core::actions::{self, EscrowOp};
use crate::core::config;
use crate::core::keystore;
use crate::core::notify::{Notifier, ToastKind};
use crate::core::state::App;

#[derive(Parser, Debug)]
#[command(name = "kobo", version, about = "Wallet, top-ups, and escrow from the terminal")]
pub struct Cli {
    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and show the profile
    Login {
        /// Enroll this device for biometric login after signing in
        #[arg(long)]
        enroll_biometric: bool,
    },
    /// Forget biometric credentials on this device
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Show the wallet balance
    Balance,
    /// Show the dedicated funding account
    Account,
    /// List recent wallet transactions
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Look up another wallet user by username
    Lookup {
        username: String,
    },
    /// Send money to another wallet user
    Transfer {
        /// Recipient's username
        #[arg(long)]
        to: String,
        /// Amount in naira, e.g. 2500 or 2500.50
        #[arg(long, value_parser = parse_amount)]
        amount: i64,
        #[arg(long)]
        narration: Option<String>,
        #[arg(long)]
        pin: String,
    },
    /// Buy airtime
    Airtime {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        network: Network,
        #[arg(long, value_parser = parse_amount)]
        amount: i64,
        #[arg(long)]
        pin: String,
    },
    /// Mobile data plans and purchases
    #[command(subcommand)]
    Data(DataCommand),
    /// TV subscription packages and purchases
    #[command(subcommand)]
    Tv(TvCommand),
    /// List supported banks
    Banks,
    /// Resolve a bank account number to its owner
    Resolve {
        #[arg(long)]
        bank_code: String,
        #[arg(long)]
        account: String,
    },
    /// Withdraw wallet money to a bank account
    Withdraw {
        #[arg(long)]
        bank_code: String,
        #[arg(long)]
        account: String,
        #[arg(long, value_parser = parse_amount)]
        amount: i64,
        #[arg(long)]
        narration: Option<String>,
        #[arg(long)]
        pin: String,
    },
    /// Escrow agreements
    #[command(subcommand)]
    Escrow(EscrowCommand),
}

#[derive(Subcommand, Debug)]
pub enum DataCommand {
    /// List data plans for a network
    Plans {
        #[arg(long)]
        network: Network,
    },
    /// Buy a data bundle
    Buy {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        network: Network,
        /// Plan id from `kobo data plans`
        #[arg(long)]
        plan: String,
        #[arg(long)]
        pin: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TvCommand {
    /// List bouquets for a provider
    Packages {
        #[arg(long)]
        provider: TvProvider,
    },
    /// Show who a smartcard belongs to
    Validate {
        #[arg(long)]
        provider: TvProvider,
        #[arg(long)]
        smartcard: String,
    },
    /// Pay for a subscription
    Buy {
        #[arg(long)]
        provider: TvProvider,
        #[arg(long)]
        smartcard: String,
        /// Package code from `kobo tv packages`
        #[arg(long)]
        package: String,
        #[arg(long)]
        pin: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum EscrowCommand {
    /// List your escrows
    List,
    /// Show one escrow with its timeline and available actions
    Show { escrow_ref: String },
    /// Open a new escrow as buyer
    Create {
        /// Seller's username
        #[arg(long)]
        payee: String,
        #[arg(long, value_parser = parse_amount)]
        amount: i64,
        #[arg(long)]
        description: String,
        /// RFC 3339 expiry, e.g. 2026-09-30T12:00:00Z
        #[arg(long, value_parser = parse_expiry)]
        expires: Option<DateTime<Utc>>,
    },
    /// Pay into a pending escrow (buyer)
    Fund {
        escrow_ref: String,
        #[arg(long)]
        pin: String,
    },
    /// Mark a funded escrow delivered (seller)
    Deliver { escrow_ref: String },
    /// Release held funds to the seller (buyer)
    Release {
        escrow_ref: String,
        #[arg(long)]
        pin: String,
    },
    /// Return held funds to the buyer (seller)
    Refund { escrow_ref: String },
    /// Withdraw an unfunded escrow (buyer)
    Cancel { escrow_ref: String },
    /// Freeze the escrow for arbitration
    Dispute {
        escrow_ref: String,
        #[arg(long)]
        reason: String,
    },
}

// ============================================================================
// Argument parsers
// ============================================================================

/// Parses a naira amount ("2500", "2,500.50", "₦99.99") into kobo.
pub fn parse_amount(raw: &str) -> Result<i64, String> {
    let cleaned = raw.trim().replace(',', "");
    let cleaned = cleaned.strip_prefix('\u{20a6}').unwrap_or(&cleaned);
    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err("amount is empty".to_string());
    }
    if frac.len() > 2 {
        return Err(format!("'{raw}' has more than two decimal places"));
    }
    let naira: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| format!("'{raw}' is not a valid amount"))?
    };
    if naira < 0 {
        return Err("amount must be positive".to_string());
    }
    let kobo_part: i64 = if frac.is_empty() {
        0
    } else {
        // Right-pad so ".5" means 50 kobo, not 5.
        format!("{frac:0<2}")
            .parse()
            .map_err(|_| format!("'{raw}' is not a valid amount"))?
    };
    naira
        .checked_mul(100)
        .and_then(|k| k.checked_add(kobo_part))
        .ok_or_else(|| format!("'{raw}' is too large"))
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("'{raw}' is not an RFC 3339 timestamp: {e}"))
}

// ============================================================================
// Dispatch
// ============================================================================

/// Runs one command to completion. Returns false when any error toast was
/// queued, so main can exit nonzero.
pub async fn run(cli: Cli) -> bool {
    let mut notifier = Notifier::new();

    let config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ {e}");
            return false;
        }
    };
    let resolved = config::resolve(&config, cli.base_url.as_deref());

    let mut keystore = match keystore::load_or_init() {
        Ok(k) => k,
        Err(e) => {
            eprintln!("✗ failed to open keystore: {e}");
            return false;
        }
    };

    let mut client = ApiClient::new(
        resolved.base_url.clone(),
        keystore.device_id.clone(),
        resolved.timeout_secs,
    );
    let mut app = App::new();

    // Everything except logout talks to the API as a signed-in user.
    let needs_auth = !matches!(cli.command, Command::Logout);
    if needs_auth
        && let Err(e) = actions::sign_in(&mut client, &mut app, &mut keystore, &resolved).await
    {
        notifier.error(e.user_message());
        return flush(&mut notifier);
    }

    dispatch(cli.command, &client, &mut app, &mut keystore, &mut notifier).await;

    if let Err(e) = keystore::save(&keystore) {
        warn!("failed to save keystore: {e}");
    }

    flush(&mut notifier)
}

async fn dispatch(
    command: Command,
    client: &ApiClient,
    app: &mut App,
    keystore: &mut keystore::Keystore,
    notifier: &mut Notifier,
) {
    match command {
        Command::Login { enroll_biometric } => {
            if let Some(user) = &app.user {
                println!("Signed in as {} (@{})", user.full_name, user.username);
            }
            if enroll_biometric {
                actions::enroll_biometric_flow(client, keystore, notifier).await;
            }
        }
        Command::Logout => {
            keystore.clear_credentials();
            notifier.info("Signed out. Biometric credentials cleared.");
        }
        Command::Whoami => {
            if let Some(user) = &app.user {
                println!("{} (@{})", user.full_name, user.username);
                if let Some(email) = &user.email {
                    println!("email: {email}");
                }
                if let Some(phone) = &user.phone {
                    println!("phone: {phone}");
                }
            }
        }
        Command::Balance => {
            if actions::refresh_balance(client, app, notifier).await
                && let Some(balance) = &app.balance
            {
                println!("Available: {}", format_naira(balance.available));
                println!("Ledger:    {}", format_naira(balance.ledger));
            }
        }
        Command::Account => match client.dedicated_account().await {
            Ok(acct) => {
                println!("{}", acct.bank_name);
                println!("{}", acct.account_number);
                println!("{}", acct.account_name);
            }
            Err(e) => notifier.error(e.user_message()),
        },
        Command::History { limit } => match client.transactions(limit).await {
            Ok(txs) => {
                for tx in txs {
                    let sign = match tx.direction {
                        TxDirection::Credit => "+",
                        TxDirection::Debit => "-",
                    };
                    println!(
                        "{}  {}{:<14} {:<12} {}",
                        tx.created_at.format("%Y-%m-%d %H:%M"),
                        sign,
                        format_naira(tx.amount),
                        tx.reference,
                        tx.narration.as_deref().unwrap_or("")
                    );
                }
            }
            Err(e) => notifier.error(e.user_message()),
        },
        Command::Lookup { username } => match client.lookup_user(&username).await {
            Ok(preview) => println!("{} (@{})", preview.full_name, preview.username),
            Err(e) => notifier.error(e.user_message()),
        },
        Command::Transfer {
            to,
            amount,
            narration,
            pin,
        } => {
            let req = TransferRequest {
                username: &to,
                amount,
                narration: narration.as_deref(),
                pin: &pin,
            };
            if let Some(receipt) = actions::transfer_flow(client, notifier, &req).await {
                println!("reference: {}", receipt.reference);
            }
        }
        Command::Airtime {
            phone,
            network,
            amount,
            pin,
        } => {
            let req = AirtimeRequest {
                phone: &phone,
                network,
                amount,
                pin: &pin,
            };
            if let Some(receipt) = actions::airtime_flow(client, notifier, &req).await {
                println!("reference: {}", receipt.reference);
            }
        }
        Command::Data(data) => dispatch_data(data, client, notifier).await,
        Command::Tv(tv) => dispatch_tv(tv, client, notifier).await,
        Command::Banks => match client.banks().await {
            Ok(banks) => {
                for bank in banks {
                    println!("{:<6} {}", bank.code, bank.name);
                }
            }
            Err(e) => notifier.error(e.user_message()),
        },
        Command::Resolve { bank_code, account } => {
            match client.resolve_account(&bank_code, &account).await {
                Ok(resolved) => println!("{}", resolved.account_name),
                Err(e) => notifier.error(e.user_message()),
            }
        }
        Command::Withdraw {
            bank_code,
            account,
            amount,
            narration,
            pin,
        } => {
            let req = WithdrawRequest {
                bank_code: &bank_code,
                account_number: &account,
                amount,
                narration: narration.as_deref(),
                pin: &pin,
            };
            if let Some(receipt) = actions::withdraw_flow(client, notifier, &req).await {
                println!("reference: {}", receipt.reference);
            }
        }
        Command::Escrow(escrow) => dispatch_escrow(escrow, client, app, notifier).await,
    }
}

async fn dispatch_data(command: DataCommand, client: &ApiClient, notifier: &mut Notifier) {
    match command {
        DataCommand::Plans { network } => match client.data_plans(network).await {
            Ok(plans) => {
                for plan in plans {
                    println!(
                        "{:<14} {:<12} {:<10} {}",
                        plan.id,
                        format_naira(plan.amount),
                        plan.validity,
                        plan.name
                    );
                }
            }
            Err(e) => notifier.error(e.user_message()),
        },
        DataCommand::Buy {
            phone,
            network,
            plan,
            pin,
        } => {
            let req = DataRequest {
                phone: &phone,
                network,
                plan_id: &plan,
                pin: &pin,
            };
            if let Some(receipt) = actions::data_flow(client, notifier, &req).await {
                println!("reference: {}", receipt.reference);
            }
        }
    }
}

async fn dispatch_tv(command: TvCommand, client: &ApiClient, notifier: &mut Notifier) {
    match command {
        TvCommand::Packages { provider } => match client.tv_packages(provider).await {
            Ok(packages) => {
                for package in packages {
                    println!(
                        "{:<16} {:<12} {}",
                        package.code,
                        format_naira(package.amount),
                        package.name
                    );
                }
            }
            Err(e) => notifier.error(e.user_message()),
        },
        TvCommand::Validate {
            provider,
            smartcard,
        } => match client.validate_smartcard(provider, &smartcard).await {
            Ok(owner) => println!("{}", owner.customer_name),
            Err(e) => notifier.error(e.user_message()),
        },
        TvCommand::Buy {
            provider,
            smartcard,
            package,
            pin,
        } => {
            let req = TvRequest {
                provider,
                smartcard: &smartcard,
                package_code: &package,
                pin: &pin,
            };
            if let Some(receipt) = actions::tv_flow(client, notifier, &req).await {
                println!("reference: {}", receipt.reference);
            }
        }
    }
}

async fn dispatch_escrow(
    command: EscrowCommand,
    client: &ApiClient,
    app: &mut App,
    notifier: &mut Notifier,
) {
    match command {
        EscrowCommand::List => {
            if actions::refresh_escrows(client, app, notifier).await {
                for escrow in &app.escrows {
                    println!(
                        "{:<12} {:<10} {:<14} @{} -> @{}  {}",
                        escrow.escrow_ref,
                        escrow.status.label(),
                        format_naira(escrow.amount),
                        escrow.payer.username,
                        escrow.payee.username,
                        escrow.description
                    );
                }
            }
        }
        EscrowCommand::Show { escrow_ref } => match client.escrow(&escrow_ref).await {
            Ok(escrow) => {
                print_escrow(&escrow, app.user_id());
                if !app.update_escrow(&escrow_ref, escrow.clone()) {
                    app.add_escrow(escrow);
                }
            }
            Err(e) => notifier.error(e.user_message()),
        },
        EscrowCommand::Create {
            payee,
            amount,
            description,
            expires,
        } => {
            let req = CreateEscrowRequest {
                payee_username: &payee,
                amount,
                description: &description,
                expires_at: expires,
            };
            actions::create_escrow_flow(client, app, notifier, &req).await;
        }
        EscrowCommand::Fund { escrow_ref, pin } => {
            actions::escrow_op_flow(client, app, notifier, &escrow_ref, EscrowOp::Fund { pin })
                .await;
        }
        EscrowCommand::Deliver { escrow_ref } => {
            actions::escrow_op_flow(client, app, notifier, &escrow_ref, EscrowOp::Deliver).await;
        }
        EscrowCommand::Release { escrow_ref, pin } => {
            actions::escrow_op_flow(client, app, notifier, &escrow_ref, EscrowOp::Release { pin })
                .await;
        }
        EscrowCommand::Refund { escrow_ref } => {
            actions::escrow_op_flow(client, app, notifier, &escrow_ref, EscrowOp::Refund).await;
        }
        EscrowCommand::Cancel { escrow_ref } => {
            actions::escrow_op_flow(client, app, notifier, &escrow_ref, EscrowOp::Cancel).await;
        }
        EscrowCommand::Dispute { escrow_ref, reason } => {
            actions::escrow_op_flow(
                client,
                app,
                notifier,
                &escrow_ref,
                EscrowOp::Dispute { reason },
            )
            .await;
        }
    }
}

/// Prints one escrow in full: header, parties, timeline, then whatever the
/// action table offers the signed-in user.
fn print_escrow(escrow: &Escrow, user_id: Option<i64>) {
    println!("{}  {}", escrow.escrow_ref, escrow.status.label());
    println!("amount:      {}", format_naira(escrow.amount));
    println!(
        "buyer:       {} (@{})",
        escrow.payer.full_name, escrow.payer.username
    );
    println!(
        "seller:      {} (@{})",
        escrow.payee.full_name, escrow.payee.username
    );
    println!("description: {}", escrow.description);
    if let Some(expires) = escrow.expires_at {
        println!("expires:     {}", expires.format("%Y-%m-%d %H:%M UTC"));
    }

    if !escrow.transactions.is_empty() {
        println!("timeline:");
        for tx in &escrow.transactions {
            println!(
                "  {}  {:<10} {:<14} by {}",
                tx.created_at.format("%Y-%m-%d %H:%M"),
                tx.action,
                format_naira(tx.amount),
                tx.actor.full_name
            );
        }
    }

    if let Some(user_id) = user_id {
        let set = escrow.actions_for(user_id);
        if let Some(prompt) = set.prompt {
            println!("waiting:     {prompt}");
        }
        if !set.actions.is_empty() {
            let labels: Vec<&str> = set.actions.iter().map(|a| a.label()).collect();
            println!("actions:     {}", labels.join(", "));
        }
    }
}

/// Prints queued toasts. Returns false when any of them was an error.
fn flush(notifier: &mut Notifier) -> bool {
    let mut clean = true;
    for toast in notifier.drain() {
        match toast.kind {
            ToastKind::Success => println!("✓ {}", toast.message),
            ToastKind::Info => println!("· {}", toast.message),
            ToastKind::Error => {
                eprintln!("✗ {}", toast.message);
                clean = false;
            }
        }
    }
    clean
}
