//! AMM error taxonomy
//!
//! Every failure is a local validation failure returned synchronously to the
//! caller. Nothing in this crate retries.

use thiserror::Error;
use types::{Address, ValidationError};

pub type AmmResult<T> = Result<T, AmmError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Insufficient initial liquidity: sqrt(amount0 * amount1) = {root} must exceed {minimum}")]
    InsufficientInitialLiquidity { root: u128, minimum: u128 },

    #[error("Deposit would mint zero liquidity shares")]
    ZeroLiquidityMinted,

    #[error("Burn of {shares} shares returns zero of at least one token")]
    InsufficientBurnedAmount { shares: u128 },

    #[error("Insufficient output amount: got {amount_out}, need at least {min_amount_out}")]
    InsufficientOutputAmount {
        amount_out: u128,
        min_amount_out: u128,
    },

    #[error("Insufficient input amount: swap input must be positive")]
    InsufficientInputAmount,

    #[error("Insufficient liquidity: reserves ({reserve_in}, {reserve_out})")]
    InsufficientLiquidity { reserve_in: u128, reserve_out: u128 },

    #[error("Pool already exists for pair {token0}/{token1}")]
    PairExists { token0: Address, token1: Address },

    #[error("Identical tokens: {token}")]
    IdenticalTokens { token: Address },

    #[error("No pool for pair {token_a}/{token_b}")]
    PoolNotFound { token_a: Address, token_b: Address },

    #[error("Token {token} is not part of pool {pool_id}")]
    UnknownToken { token: Address, pool_id: u64 },

    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("Deadline expired: now {now} > deadline {deadline}")]
    DeadlineExpired { now: u64, deadline: u64 },

    #[error("Slippage exceeded: quoted {amount_out}, minimum {min_amount_out}")]
    SlippageExceeded {
        amount_out: u128,
        min_amount_out: u128,
    },

    #[error("Insufficient A amount: {amount} below minimum {min}")]
    InsufficientAAmount { amount: u128, min: u128 },

    #[error("Insufficient B amount: {amount} below minimum {min}")]
    InsufficientBAmount { amount: u128, min: u128 },

    #[error("Insufficient shares: {account} holds {balance}, requested {requested}")]
    InsufficientShares {
        account: Address,
        balance: u128,
        requested: u128,
    },

    #[error("No route found from {token_in} to {token_out}")]
    NoRouteFound { token_in: Address, token_out: Address },

    #[error("Constant product decreased in pool {pool_id}")]
    InvariantViolated { pool_id: u64 },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },
}

impl From<ValidationError> for AmmError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IdenticalTokens { token } => AmmError::IdenticalTokens { token },
            other => AmmError::InvalidPath {
                reason: other.to_string(),
            },
        }
    }
}
