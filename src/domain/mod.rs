//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod error;

pub use account::{Account, ChangeLog, Transaction, TransactionType};
pub use amount::{Amount, AmountError};
pub use error::LedgerError;
