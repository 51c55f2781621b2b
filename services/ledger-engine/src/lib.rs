//! Wallet Ledger Engine
//!
//! Custodial multi-currency wallet ledger: each wallet holds one balance
//! per supported currency, and four financial operations — deposit,
//! withdrawal, conversion, transfer — mutate those balances under fee and
//! authorization rules, leaving an append-only audit trail.
//!
//! # Modules
//! - `config`: Engine configuration with environment overrides
//! - `directory`: Wallet and currency registry, wallet provisioning
//! - `auth`: Secret-digest authorization guard
//! - `fee`: Percentage fee schedule with fixed-point rounding
//! - `rates`: Exchange-rate provider seam (Coinbase-backed and fixed-table)
//! - `store`: Atomic balance store (check-and-mutate, paired mutations)
//! - `recorder`: Append-only audit recorder
//! - `engine`: Transaction orchestrator composing the above

pub mod auth;
pub mod config;
pub mod directory;
pub mod engine;
pub mod fee;
pub mod rates;
pub mod recorder;
pub mod store;

pub use config::EngineConfig;
pub use engine::LedgerEngine;
