//! bank_ledger Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod audit;
pub mod channel;
pub mod domain;
pub mod service;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{Account, Amount, AmountError, ChangeLog, LedgerError, Transaction, TransactionType};
