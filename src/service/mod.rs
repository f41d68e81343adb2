//! Ledger Service module
//!
//! The mutation core: validates commands, applies them atomically against
//! the ledger store, and publishes the audit trail after commit.

mod commands;
mod ledger;

pub use commands::{CreateAccountCommand, DepositCommand, WithdrawCommand};
pub use ledger::LedgerService;
