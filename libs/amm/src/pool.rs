//! Constant product pool for one token pair
//!
//! A `Pool` owns its reserves, LP-share supply and per-provider share
//! balances behind a single `parking_lot::Mutex`. Every mint, burn and swap
//! takes that lock for the whole call, so operations on one pool serialize
//! while different pools proceed independently.
//!
//! Callers that need several operations to see one consistent state (the
//! router's multi-hop execution, add-liquidity's ratio check followed by the
//! mint) take the lock once through [`Pool::lock`] and work on the returned
//! [`LockedPool`].

use crate::error::{AmmError, AmmResult};
use crate::pool_traits::AmmPool;
use crate::v2_math::{V2Math, MINIMUM_LIQUIDITY};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use types::{Address, PairKey};

/// Sequential pool identifier assigned by the registry (creation order)
pub type PoolId = u64;

/// Activity counters, the in-process counterpart of the indexer's pair entity
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Mints + burns + swaps
    pub tx_count: u64,
    pub swap_count: u64,
    pub volume0_in: u128,
    pub volume1_in: u128,
    pub volume0_out: u128,
    pub volume1_out: u128,
}

/// Detached copy of a pool's public state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: PoolId,
    pub token0: Address,
    pub token1: Address,
    pub fee_bps: u32,
    pub reserve0: u128,
    pub reserve1: u128,
    pub total_shares: u128,
    pub stats: PoolStats,
}

impl AmmPool for PoolSnapshot {
    fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    fn pair(&self) -> PairKey {
        PairKey {
            token0: self.token0,
            token1: self.token1,
        }
    }

    fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn reserves(&self) -> (u128, u128) {
        (self.reserve0, self.reserve1)
    }
}

/// A provider's stake in one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pool_id: PoolId,
    pub token0: Address,
    pub token1: Address,
    pub shares: u128,
    /// Fraction of total supply, in percent
    pub share_percent: Decimal,
    /// Redeemable token0 at current reserves
    pub amount0: u128,
    /// Redeemable token1 at current reserves
    pub amount1: u128,
}

#[derive(Debug, Default)]
struct PoolState {
    reserve0: u128,
    reserve1: u128,
    total_shares: u128,
    balances: HashMap<Address, u128>,
    stats: PoolStats,
}

#[derive(Debug)]
pub struct Pool {
    id: PoolId,
    pair: PairKey,
    fee_bps: u32,
    state: Mutex<PoolState>,
}

impl Pool {
    pub(crate) fn new(id: PoolId, pair: PairKey, fee_bps: u32) -> Self {
        Self {
            id,
            pair,
            fee_bps,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn pair(&self) -> PairKey {
        self.pair
    }

    pub fn token0(&self) -> Address {
        self.pair.token0
    }

    pub fn token1(&self) -> Address {
        self.pair.token1
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Take the pool's exclusive lock
    pub fn lock(&self) -> LockedPool<'_> {
        LockedPool {
            pool: self,
            state: self.state.lock(),
        }
    }

    pub fn mint(&self, amount0: u128, amount1: u128, recipient: Address) -> AmmResult<u128> {
        self.lock().mint(amount0, amount1, recipient)
    }

    pub fn burn(
        &self,
        provider: Address,
        shares: u128,
        recipient: Address,
    ) -> AmmResult<(u128, u128)> {
        self.lock().burn(provider, shares, recipient)
    }

    pub fn swap(
        &self,
        amount_in: u128,
        token_in: Address,
        min_amount_out: u128,
        recipient: Address,
    ) -> AmmResult<u128> {
        self.lock()
            .swap(amount_in, token_in, min_amount_out, recipient)
    }

    pub fn reserves(&self) -> (u128, u128) {
        let state = self.state.lock();
        (state.reserve0, state.reserve1)
    }

    pub fn total_shares(&self) -> u128 {
        self.state.lock().total_shares
    }

    pub fn balance_of(&self, account: Address) -> u128 {
        self.lock().balance_of(account)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        self.lock().snapshot()
    }

    /// The account's position, or `None` when it holds no shares
    pub fn position(&self, account: Address) -> AmmResult<Option<Position>> {
        self.lock().position(account)
    }
}

/// Exclusive access to one pool's state for the lifetime of the guard
pub struct LockedPool<'a> {
    pool: &'a Pool,
    state: MutexGuard<'a, PoolState>,
}

impl AmmPool for LockedPool<'_> {
    fn pool_id(&self) -> PoolId {
        self.pool.id
    }

    fn pair(&self) -> PairKey {
        self.pool.pair
    }

    fn fee_bps(&self) -> u32 {
        self.pool.fee_bps
    }

    fn reserves(&self) -> (u128, u128) {
        (self.state.reserve0, self.state.reserve1)
    }
}

impl LockedPool<'_> {
    pub fn total_shares(&self) -> u128 {
        self.state.total_shares
    }

    pub fn balance_of(&self, account: Address) -> u128 {
        self.state.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: self.pool.id,
            token0: self.pool.pair.token0,
            token1: self.pool.pair.token1,
            fee_bps: self.pool.fee_bps,
            reserve0: self.state.reserve0,
            reserve1: self.state.reserve1,
            total_shares: self.state.total_shares,
            stats: self.state.stats.clone(),
        }
    }

    pub fn position(&self, account: Address) -> AmmResult<Option<Position>> {
        let shares = self.balance_of(account);
        if shares == 0 {
            return Ok(None);
        }
        let (amount0, amount1) = V2Math::redeemable_amounts(
            shares,
            self.state.reserve0,
            self.state.reserve1,
            self.state.total_shares,
        )?;
        Ok(Some(Position {
            pool_id: self.pool.id,
            token0: self.pool.pair.token0,
            token1: self.pool.pair.token1,
            shares,
            share_percent: V2Math::share_percent(shares, self.state.total_shares),
            amount0,
            amount1,
        }))
    }

    /// Deposit `amount0`/`amount1` and credit LP shares to `recipient`
    ///
    /// The first deposit mints `floor(sqrt(amount0 * amount1))` shares, of
    /// which `MINIMUM_LIQUIDITY` go to the zero address and can never be
    /// redeemed. Later deposits mint in proportion to the smaller relative
    /// contribution.
    pub fn mint(&mut self, amount0: u128, amount1: u128, recipient: Address) -> AmmResult<u128> {
        let first = self.state.total_shares == 0;
        let shares = if first {
            V2Math::initial_shares(amount0, amount1)?
        } else {
            V2Math::proportional_shares(
                amount0,
                amount1,
                self.state.reserve0,
                self.state.reserve1,
                self.state.total_shares,
            )?
        };
        if shares == 0 {
            return Err(AmmError::ZeroLiquidityMinted);
        }

        let locked = if first { MINIMUM_LIQUIDITY } else { 0 };
        let total_shares = self
            .state
            .total_shares
            .checked_add(locked)
            .and_then(|t| t.checked_add(shares))
            .ok_or(AmmError::Overflow {
                context: "total shares",
            })?;
        let reserve0 = self
            .state
            .reserve0
            .checked_add(amount0)
            .ok_or(AmmError::Overflow { context: "reserve0" })?;
        let reserve1 = self
            .state
            .reserve1
            .checked_add(amount1)
            .ok_or(AmmError::Overflow { context: "reserve1" })?;

        let state = &mut *self.state;
        state.reserve0 = reserve0;
        state.reserve1 = reserve1;
        state.total_shares = total_shares;
        if first {
            *state.balances.entry(Address::ZERO).or_default() += MINIMUM_LIQUIDITY;
        }
        *state.balances.entry(recipient).or_default() += shares;
        state.stats.tx_count += 1;

        debug!(
            pool_id = self.pool.id,
            amount0,
            amount1,
            shares,
            recipient = %recipient,
            "Minted liquidity"
        );
        Ok(shares)
    }

    /// Token amounts `provider` would receive for burning `shares`, without
    /// changing state
    pub fn preview_burn(&self, provider: Address, shares: u128) -> AmmResult<(u128, u128)> {
        // the minimum-liquidity lock held by the zero address is never redeemable
        let balance = if provider.is_zero() {
            0
        } else {
            self.balance_of(provider)
        };
        if shares > balance {
            return Err(AmmError::InsufficientShares {
                account: provider,
                balance,
                requested: shares,
            });
        }

        let (amount0, amount1) = V2Math::redeemable_amounts(
            shares,
            self.state.reserve0,
            self.state.reserve1,
            self.state.total_shares,
        )?;
        if amount0 == 0 || amount1 == 0 {
            return Err(AmmError::InsufficientBurnedAmount { shares });
        }
        Ok((amount0, amount1))
    }

    /// Burn `shares` held by `provider`, releasing the proportional reserves
    /// to `recipient`
    pub fn burn(
        &mut self,
        provider: Address,
        shares: u128,
        recipient: Address,
    ) -> AmmResult<(u128, u128)> {
        let (amount0, amount1) = self.preview_burn(provider, shares)?;

        let state = &mut *self.state;
        if let Some(balance) = state.balances.get_mut(&provider) {
            *balance -= shares;
            if *balance == 0 {
                state.balances.remove(&provider);
            }
        }
        state.total_shares -= shares;
        state.reserve0 -= amount0;
        state.reserve1 -= amount1;
        state.stats.tx_count += 1;

        debug!(
            pool_id = self.pool.id,
            shares,
            amount0,
            amount1,
            provider = %provider,
            recipient = %recipient,
            "Burned liquidity"
        );
        Ok((amount0, amount1))
    }

    /// Sell `amount_in` of `token_in` for the other token
    ///
    /// Fails with `InsufficientOutputAmount` when the fee-adjusted output is
    /// below `min_amount_out`. The constant product never decreases.
    pub fn swap(
        &mut self,
        amount_in: u128,
        token_in: Address,
        min_amount_out: u128,
        recipient: Address,
    ) -> AmmResult<u128> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in)?;
        let amount_out = V2Math::calculate_output_amount(
            amount_in,
            reserve_in,
            reserve_out,
            self.pool.fee_bps,
        )?;
        if amount_out < min_amount_out {
            return Err(AmmError::InsufficientOutputAmount {
                amount_out,
                min_amount_out,
            });
        }

        let new_reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(AmmError::Overflow {
                context: "reserve_in",
            })?;
        // output is always strictly below reserve_out
        let new_reserve_out = reserve_out - amount_out;
        if V2Math::product(new_reserve_in, new_reserve_out)
            < V2Math::product(reserve_in, reserve_out)
        {
            return Err(AmmError::InvariantViolated {
                pool_id: self.pool.id,
            });
        }

        let zero_for_one = self.pool.pair.is_token0(token_in);
        let state = &mut *self.state;
        let stats = &mut state.stats;
        if zero_for_one {
            state.reserve0 = new_reserve_in;
            state.reserve1 = new_reserve_out;
            stats.volume0_in = stats.volume0_in.saturating_add(amount_in);
            stats.volume1_out = stats.volume1_out.saturating_add(amount_out);
        } else {
            state.reserve1 = new_reserve_in;
            state.reserve0 = new_reserve_out;
            stats.volume1_in = stats.volume1_in.saturating_add(amount_in);
            stats.volume0_out = stats.volume0_out.saturating_add(amount_out);
        }
        stats.tx_count += 1;
        stats.swap_count += 1;

        debug!(
            pool_id = self.pool.id,
            token_in = %token_in,
            amount_in,
            amount_out,
            recipient = %recipient,
            "Swapped"
        );
        Ok(amount_out)
    }
}
