//! API Routes
//!
//! HTTP endpoint definitions. Mutation parameters arrive as query
//! parameters; responses and errors are JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Account;
use crate::error::AppError;
use crate::service::{CreateAccountCommand, DepositCommand, LedgerService, WithdrawCommand};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct MutationParams {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountParams {
    pub account_number: String,
    pub name: String,
    #[serde(default)]
    pub balance: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_number: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account_number: String,
    pub name: String,
    pub balance: Decimal,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            name: account.name,
            balance: account.balance,
            version: account.version,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Arc<LedgerService>> {
    Router::new()
        .route("/accounts/:account_number/deposit", post(deposit))
        .route("/accounts/:account_number/withdraw", post(withdraw))
        .route("/accounts/create", post(create_account))
}

/// Deposit into an account
async fn deposit(
    State(service): State<Arc<LedgerService>>,
    Path(account_number): Path<String>,
    Query(params): Query<MutationParams>,
) -> Result<Json<BalanceResponse>, AppError> {
    tracing::info!(%account_number, amount = %params.amount, "deposit request");

    let balance = service
        .deposit(DepositCommand::new(account_number.clone(), params.amount))
        .await?;

    tracing::info!(%account_number, %balance, "deposit successful");

    Ok(Json(BalanceResponse {
        account_number,
        balance,
    }))
}

/// Withdraw from an account
async fn withdraw(
    State(service): State<Arc<LedgerService>>,
    Path(account_number): Path<String>,
    Query(params): Query<MutationParams>,
) -> Result<Json<BalanceResponse>, AppError> {
    tracing::info!(%account_number, amount = %params.amount, "withdrawal request");

    let balance = service
        .withdraw(WithdrawCommand::new(account_number.clone(), params.amount))
        .await?;

    tracing::info!(%account_number, %balance, "withdrawal successful");

    Ok(Json(BalanceResponse {
        account_number,
        balance,
    }))
}

/// Create a new account
async fn create_account(
    State(service): State<Arc<LedgerService>>,
    Query(params): Query<CreateAccountParams>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let command = CreateAccountCommand {
        account_number: params.account_number,
        name: params.name,
        initial_balance: params.balance,
    };

    let account = service.create_account(command).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}
