//! # Core Application Logic
//!
//! Everything between the wire and the screen. It knows nothing about any
//! specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Flows (API + state)  │
//!                    │  • Toasts (outcomes)    │
//!                    │  • Keystore (device)    │
//!                    │  • Config (settings)    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │   Mobile   │      │    Web     │
//!     │  Adapter   │      │  Adapter   │      │  (future)  │
//!     │  (clap)    │      │  (future)  │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all session state in one place
//! - [`actions`]: Flows that call the API, update state, and toast outcomes
//! - [`notify`]: The toast queue
//! - [`keystore`]: Durable device identity and biometric credentials
//! - [`config`]: Settings file, environment overrides, defaults

pub mod actions;
pub mod config;
pub mod keystore;
pub mod notify;
pub mod state;
