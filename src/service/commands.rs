//! Command definitions
//!
//! Commands represent intentions to change the ledger. Amounts travel as
//! text and are validated inside the service.

use serde::{Deserialize, Serialize};

/// Command to deposit into an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCommand {
    pub account_number: String,
    /// Amount as string for precise decimal
    pub amount: String,
}

impl DepositCommand {
    pub fn new(account_number: String, amount: String) -> Self {
        Self {
            account_number,
            amount,
        }
    }
}

/// Command to withdraw from an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub account_number: String,
    /// Amount as string for precise decimal
    pub amount: String,
}

impl WithdrawCommand {
    pub fn new(account_number: String, amount: String) -> Self {
        Self {
            account_number,
            amount,
        }
    }
}

/// Command to create a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub account_number: String,
    pub name: String,
    /// Optional opening balance text; blank means zero
    pub initial_balance: Option<String>,
}

impl CreateAccountCommand {
    pub fn new(account_number: String, name: String) -> Self {
        Self {
            account_number,
            name,
            initial_balance: None,
        }
    }

    pub fn with_initial_balance(mut self, initial_balance: String) -> Self {
        self.initial_balance = Some(initial_balance);
        self
    }
}
