//! Router: multi-hop quotes, swap execution and liquidity management
//!
//! The router owns no pool state. It resolves pools through the shared
//! [`PairRegistry`] and checks deadlines against an injected [`Clock`].
//!
//! Quotes lock one pool at a time and may be stale by the time they are
//! used. Execution locks every pool on the path up front, in ascending pool
//! id order, then quotes and applies all hops under those locks, so a
//! multi-hop swap either fully applies or leaves every pool untouched.

use crate::clock::{Clock, SystemClock};
use crate::error::{AmmError, AmmResult};
use crate::pool::{LockedPool, Pool, PoolId};
use crate::pool_traits::AmmPool;
use crate::registry::PairRegistry;
use crate::v2_math::V2Math;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use types::{Address, SwapPath};

/// Result of an executed swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub path: SwapPath,
    /// One amount per path token; `amounts[0]` is the input
    pub amounts: Vec<u128>,
    pub amount_out: u128,
    pub recipient: Address,
}

/// Result of a liquidity deposit, amounts in the caller's token order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityReceipt {
    pub pool_id: PoolId,
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares: u128,
}

/// Result of a liquidity withdrawal, amounts in the caller's token order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalReceipt {
    pub pool_id: PoolId,
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares_burned: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: u128,
    pub amount_b_desired: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    pub recipient: Address,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub shares: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    /// Account whose shares are burned
    pub provider: Address,
    pub recipient: Address,
    pub deadline: u64,
}

pub struct Router {
    registry: Arc<PairRegistry>,
    clock: Arc<dyn Clock>,
}

impl Router {
    pub fn new(registry: Arc<PairRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub fn with_system_clock(registry: Arc<PairRegistry>) -> Self {
        Self::new(registry, Arc::new(SystemClock))
    }

    pub fn registry(&self) -> &Arc<PairRegistry> {
        &self.registry
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Deadline `secs` seconds after the router's current time
    pub fn deadline_from_now(&self, secs: u64) -> u64 {
        self.now().saturating_add(secs)
    }

    /// Amount of B equivalent to `amount_a` at reserves `(reserve_a, reserve_b)`
    pub fn quote(amount_a: u128, reserve_a: u128, reserve_b: u128) -> AmmResult<u128> {
        V2Math::quote(amount_a, reserve_a, reserve_b)
    }

    /// Minimum acceptable output for a slippage tolerance in basis points
    pub fn min_amount_with_slippage(amount: u128, slippage_bps: u32) -> u128 {
        V2Math::apply_slippage(amount, slippage_bps)
    }

    /// Quote the output of every hop along `path`
    ///
    /// Returns one amount per path token, starting with `amount_in`.
    pub fn get_amounts_out(&self, amount_in: u128, path: &SwapPath) -> AmmResult<Vec<u128>> {
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);

        let mut amount = amount_in;
        for (token_in, token_out) in path.hops() {
            let pool = self.pool_for_hop(token_in, token_out)?;
            amount = pool.lock().get_amount_out(token_in, amount)?;
            amounts.push(amount);
        }
        Ok(amounts)
    }

    /// Quote the input needed at each hop to receive `amount_out` at the end
    /// of `path`
    pub fn get_amounts_in(&self, amount_out: u128, path: &SwapPath) -> AmmResult<Vec<u128>> {
        let tokens = path.tokens();
        let mut amounts = vec![0u128; tokens.len()];
        amounts[tokens.len() - 1] = amount_out;

        for hop in (0..path.hop_count()).rev() {
            let pool = self.pool_for_hop(tokens[hop], tokens[hop + 1])?;
            amounts[hop] = pool.lock().get_amount_in(tokens[hop], amounts[hop + 1])?;
        }
        Ok(amounts)
    }

    /// Swap `amount_in` of the path's first token for its last token
    ///
    /// Fails with `DeadlineExpired` when the clock is past `deadline` and
    /// with `SlippageExceeded` when the final output is below
    /// `min_amount_out`. On any failure no pool is modified.
    pub fn execute_swap(
        &self,
        amount_in: u128,
        path: &SwapPath,
        min_amount_out: u128,
        recipient: Address,
        deadline: u64,
    ) -> AmmResult<SwapReceipt> {
        self.ensure_deadline(deadline)?;

        let pools = self.pools_on_path(path)?;
        let mut guards = lock_in_id_order(&pools);
        let tokens = path.tokens();

        // Quote under the same locks the swaps will run under
        let mut amounts = Vec::with_capacity(tokens.len());
        amounts.push(amount_in);
        let mut amount = amount_in;
        for (hop, guard) in guards.iter().enumerate() {
            let (reserve_in, _) = guard.oriented_reserves(tokens[hop])?;
            reserve_in.checked_add(amount).ok_or(AmmError::Overflow {
                context: "reserve_in",
            })?;
            amount = guard.get_amount_out(tokens[hop], amount)?;
            amounts.push(amount);
        }

        if amount < min_amount_out {
            warn!(
                path = %path,
                amount_in,
                amount_out = amount,
                min_amount_out,
                "Swap rejected: slippage exceeded"
            );
            return Err(AmmError::SlippageExceeded {
                amount_out: amount,
                min_amount_out,
            });
        }

        // Every hop was priced against the state it now runs on, so each
        // swap returns exactly its quoted amount
        for (hop, guard) in guards.iter_mut().enumerate() {
            guard.swap(amounts[hop], tokens[hop], amounts[hop + 1], recipient)?;
        }
        drop(guards);

        info!(
            path = %path,
            amount_in,
            amount_out = amount,
            recipient = %recipient,
            "Executed swap"
        );
        Ok(SwapReceipt {
            path: path.clone(),
            amounts,
            amount_out: amount,
            recipient,
        })
    }

    /// Deposit into the pair's pool at its current ratio, creating the pool
    /// when it does not exist yet
    pub fn add_liquidity(&self, params: &AddLiquidityParams) -> AmmResult<LiquidityReceipt> {
        self.ensure_deadline(params.deadline)?;

        let pool = match self.registry.get_pool(params.token_a, params.token_b) {
            Some(pool) => pool,
            None => {
                // reject an undersized first deposit before the pair is created
                if params.token_a != params.token_b {
                    V2Math::initial_shares(params.amount_a_desired, params.amount_b_desired)?;
                }
                self.registry
                    .get_or_create_pool(params.token_a, params.token_b)?
            }
        };

        let mut locked = pool.lock();
        let (reserve_a, reserve_b) = locked.oriented_reserves(params.token_a)?;
        let (amount_a, amount_b) = optimal_amounts(params, reserve_a, reserve_b)?;
        let (amount0, amount1) = if pool.pair().is_token0(params.token_a) {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let shares = locked.mint(amount0, amount1, params.recipient)?;
        drop(locked);

        info!(
            pool_id = pool.id(),
            amount_a,
            amount_b,
            shares,
            recipient = %params.recipient,
            "Added liquidity"
        );
        Ok(LiquidityReceipt {
            pool_id: pool.id(),
            token_a: params.token_a,
            token_b: params.token_b,
            amount_a,
            amount_b,
            shares,
        })
    }

    /// Burn `params.shares` of the provider's position
    ///
    /// Minimums are checked before the burn is committed; a failed removal
    /// leaves the pool untouched.
    pub fn remove_liquidity(&self, params: &RemoveLiquidityParams) -> AmmResult<RemovalReceipt> {
        self.remove_with(params, |_| params.shares)
    }

    /// Burn `percent_bps` (out of 10000) of the provider's current balance;
    /// `params.shares` is ignored
    pub fn remove_liquidity_percent(
        &self,
        params: &RemoveLiquidityParams,
        percent_bps: u32,
    ) -> AmmResult<RemovalReceipt> {
        self.remove_with(params, |balance| {
            V2Math::portion_bps(balance, u128::from(percent_bps))
        })
    }

    fn remove_with(
        &self,
        params: &RemoveLiquidityParams,
        shares_for_balance: impl FnOnce(u128) -> u128,
    ) -> AmmResult<RemovalReceipt> {
        self.ensure_deadline(params.deadline)?;

        let pool = self.pool_for_hop(params.token_a, params.token_b)?;
        let mut locked = pool.lock();
        let shares = shares_for_balance(locked.balance_of(params.provider));

        let (amount0, amount1) = locked.preview_burn(params.provider, shares)?;
        let (amount_a, amount_b) = if pool.pair().is_token0(params.token_a) {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < params.amount_a_min {
            return Err(AmmError::InsufficientAAmount {
                amount: amount_a,
                min: params.amount_a_min,
            });
        }
        if amount_b < params.amount_b_min {
            return Err(AmmError::InsufficientBAmount {
                amount: amount_b,
                min: params.amount_b_min,
            });
        }
        locked.burn(params.provider, shares, params.recipient)?;
        drop(locked);

        info!(
            pool_id = pool.id(),
            shares,
            amount_a,
            amount_b,
            provider = %params.provider,
            "Removed liquidity"
        );
        Ok(RemovalReceipt {
            pool_id: pool.id(),
            token_a: params.token_a,
            token_b: params.token_b,
            amount_a,
            amount_b,
            shares_burned: shares,
        })
    }

    fn ensure_deadline(&self, deadline: u64) -> AmmResult<()> {
        let now = self.now();
        if now > deadline {
            return Err(AmmError::DeadlineExpired { now, deadline });
        }
        Ok(())
    }

    fn pool_for_hop(&self, token_a: Address, token_b: Address) -> AmmResult<Arc<Pool>> {
        self.registry
            .get_pool(token_a, token_b)
            .ok_or(AmmError::PoolNotFound { token_a, token_b })
    }

    fn pools_on_path(&self, path: &SwapPath) -> AmmResult<Vec<Arc<Pool>>> {
        path.hops()
            .map(|(token_in, token_out)| self.pool_for_hop(token_in, token_out))
            .collect()
    }
}

/// Lock every pool, acquiring in ascending pool id order, and return the
/// guards in path order.
///
/// A path never repeats a token, so it never visits the same pool twice.
fn lock_in_id_order(pools: &[Arc<Pool>]) -> Vec<LockedPool<'_>> {
    let mut order: Vec<usize> = (0..pools.len()).collect();
    order.sort_by_key(|&i| pools[i].id());

    let mut slots: Vec<Option<LockedPool<'_>>> = pools.iter().map(|_| None).collect();
    for i in order {
        slots[i] = Some(pools[i].lock());
    }
    slots.into_iter().flatten().collect()
}

/// Deposit amounts that keep the pool ratio, within the caller's bounds
fn optimal_amounts(
    params: &AddLiquidityParams,
    reserve_a: u128,
    reserve_b: u128,
) -> AmmResult<(u128, u128)> {
    if reserve_a == 0 && reserve_b == 0 {
        return Ok((params.amount_a_desired, params.amount_b_desired));
    }

    let amount_b_optimal = V2Math::quote(params.amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= params.amount_b_desired {
        if amount_b_optimal < params.amount_b_min {
            return Err(AmmError::InsufficientBAmount {
                amount: amount_b_optimal,
                min: params.amount_b_min,
            });
        }
        return Ok((params.amount_a_desired, amount_b_optimal));
    }

    // amount_b_optimal > b_desired implies amount_a_optimal <= a_desired
    let amount_a_optimal = V2Math::quote(params.amount_b_desired, reserve_b, reserve_a)?;
    if amount_a_optimal < params.amount_a_min {
        return Err(AmmError::InsufficientAAmount {
            amount: amount_a_optimal,
            min: params.amount_a_min,
        });
    }
    Ok((amount_a_optimal, params.amount_b_desired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const NOW: u64 = 1_700_000_000;
    const LP: Address = Address::new([0x11; 20]);

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn router() -> (Router, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        let router = Router::new(Arc::new(PairRegistry::default()), clock.clone());
        (router, clock)
    }

    fn add(router: &Router, a: u64, b: u64, amount_a: u128, amount_b: u128) -> LiquidityReceipt {
        router
            .add_liquidity(&AddLiquidityParams {
                token_a: addr(a),
                token_b: addr(b),
                amount_a_desired: amount_a,
                amount_b_desired: amount_b,
                amount_a_min: 0,
                amount_b_min: 0,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap()
    }

    #[test]
    fn test_add_liquidity_uses_pool_ratio() {
        let (router, _) = router();
        add(&router, 1, 2, 1_000_000, 2_000_000);

        let receipt = add(&router, 1, 2, 100_000, 300_000);
        assert_eq!((receipt.amount_a, receipt.amount_b), (100_000, 200_000));

        // caller order is preserved when token_a is the canonical token1
        let receipt = add(&router, 2, 1, 300_000, 100_000);
        assert_eq!((receipt.amount_a, receipt.amount_b), (200_000, 100_000));
    }

    #[test]
    fn test_add_liquidity_minimums() {
        let (router, _) = router();
        add(&router, 1, 2, 1_000_000, 2_000_000);

        let err = router
            .add_liquidity(&AddLiquidityParams {
                token_a: addr(1),
                token_b: addr(2),
                amount_a_desired: 100_000,
                amount_b_desired: 300_000,
                amount_a_min: 0,
                amount_b_min: 250_000,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::InsufficientBAmount {
                amount: 200_000,
                min: 250_000
            }
        );

        let err = router
            .add_liquidity(&AddLiquidityParams {
                token_a: addr(1),
                token_b: addr(2),
                amount_a_desired: 500_000,
                amount_b_desired: 200_000,
                amount_a_min: 150_000,
                amount_b_min: 0,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::InsufficientAAmount {
                amount: 100_000,
                min: 150_000
            }
        );
    }

    #[test]
    fn test_undersized_first_deposit_creates_no_pool() {
        let (router, _) = router();
        let err = router
            .add_liquidity(&AddLiquidityParams {
                token_a: addr(1),
                token_b: addr(2),
                amount_a_desired: 1,
                amount_b_desired: 1,
                amount_a_min: 0,
                amount_b_min: 0,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap_err();
        assert!(matches!(err, AmmError::InsufficientInitialLiquidity { .. }));
        assert!(router.registry().is_empty());
    }

    #[test]
    fn test_deadline_expired() {
        let (router, clock) = router();
        add(&router, 1, 2, 1_000_000, 1_000_000);
        clock.advance(61);

        let path = SwapPath::direct(addr(1), addr(2)).unwrap();
        let err = router
            .execute_swap(1_000, &path, 0, LP, NOW + 60)
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::DeadlineExpired {
                now: NOW + 61,
                deadline: NOW + 60
            }
        );
        assert_eq!(router.deadline_from_now(1_200), NOW + 61 + 1_200);
    }

    #[test]
    fn test_slippage_exceeded_leaves_pools_untouched() {
        let (router, _) = router();
        add(&router, 1, 2, 1_000_000, 1_000_000);
        add(&router, 2, 3, 1_000_000, 1_000_000);

        let path = SwapPath::new(vec![addr(1), addr(2), addr(3)]).unwrap();
        let amounts = router.get_amounts_out(10_000, &path).unwrap();
        let quoted = amounts[2];

        let err = router
            .execute_swap(10_000, &path, quoted + 1, LP, NOW)
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::SlippageExceeded {
                amount_out: quoted,
                min_amount_out: quoted + 1
            }
        );

        let registry = router.registry();
        assert_eq!(
            registry.get_pool(addr(1), addr(2)).unwrap().reserves(),
            (1_000_000, 1_000_000)
        );
        assert_eq!(
            registry.get_pool(addr(2), addr(3)).unwrap().reserves(),
            (1_000_000, 1_000_000)
        );
    }

    #[test]
    fn test_missing_hop_is_pool_not_found() {
        let (router, _) = router();
        add(&router, 1, 2, 1_000_000, 1_000_000);

        let path = SwapPath::new(vec![addr(1), addr(2), addr(3)]).unwrap();
        assert_eq!(
            router.get_amounts_out(1_000, &path).unwrap_err(),
            AmmError::PoolNotFound {
                token_a: addr(2),
                token_b: addr(3)
            }
        );
    }

    #[test]
    fn test_get_amounts_in_covers_requested_output() {
        let (router, _) = router();
        add(&router, 1, 2, 5_000_000, 7_000_000);
        add(&router, 2, 3, 3_000_000, 9_000_000);

        let path = SwapPath::new(vec![addr(1), addr(2), addr(3)]).unwrap();
        let amounts_in = router.get_amounts_in(50_000, &path).unwrap();
        let amounts_out = router.get_amounts_out(amounts_in[0], &path).unwrap();
        assert!(amounts_out[2] >= 50_000);
    }

    #[test]
    fn test_remove_liquidity_checks_minimums_before_burning() {
        let (router, _) = router();
        let receipt = add(&router, 1, 2, 4_000, 4_000);
        assert_eq!(receipt.shares, 3_000);

        let params = RemoveLiquidityParams {
            token_a: addr(2),
            token_b: addr(1),
            shares: 1_000,
            amount_a_min: 1_001,
            amount_b_min: 0,
            provider: LP,
            recipient: LP,
            deadline: NOW,
        };
        assert_eq!(
            router.remove_liquidity(&params).unwrap_err(),
            AmmError::InsufficientAAmount {
                amount: 1_000,
                min: 1_001
            }
        );
        let pool = router.registry().get_pool(addr(1), addr(2)).unwrap();
        assert_eq!(pool.balance_of(LP), 3_000);

        let receipt = router
            .remove_liquidity(&RemoveLiquidityParams {
                amount_a_min: 1_000,
                ..params.clone()
            })
            .unwrap();
        assert_eq!(receipt.shares_burned, 1_000);
        assert_eq!((receipt.amount_a, receipt.amount_b), (1_000, 1_000));

        let receipt = router
            .remove_liquidity_percent(
                &RemoveLiquidityParams {
                    amount_a_min: 1_000,
                    ..params
                },
                5_000,
            )
            .unwrap();
        assert_eq!(receipt.shares_burned, 1_000);
        assert_eq!(pool.balance_of(LP), 1_000);
    }

    #[test]
    fn test_add_liquidity_deadline_expired() {
        let (router, clock) = router();
        add(&router, 1, 2, 1_000_000, 1_000_000);
        clock.advance(1);

        let deposit = |a: u64, b: u64| {
            router.add_liquidity(&AddLiquidityParams {
                token_a: addr(a),
                token_b: addr(b),
                amount_a_desired: 10_000,
                amount_b_desired: 10_000,
                amount_a_min: 0,
                amount_b_min: 0,
                recipient: LP,
                deadline: NOW,
            })
        };
        let expired = AmmError::DeadlineExpired {
            now: NOW + 1,
            deadline: NOW,
        };
        assert_eq!(deposit(1, 2).unwrap_err(), expired);
        assert_eq!(deposit(3, 4).unwrap_err(), expired);

        let pool = router.registry().get_pool(addr(1), addr(2)).unwrap();
        assert_eq!(pool.reserves(), (1_000_000, 1_000_000));
        assert_eq!(pool.balance_of(LP), 999_000);
        assert_eq!(router.registry().len(), 1);
    }

    #[test]
    fn test_remove_liquidity_deadline_expired() {
        let (router, clock) = router();
        add(&router, 1, 2, 4_000, 4_000);
        clock.advance(1);

        let err = router
            .remove_liquidity(&RemoveLiquidityParams {
                token_a: addr(1),
                token_b: addr(2),
                shares: 1_000,
                amount_a_min: 0,
                amount_b_min: 0,
                provider: LP,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::DeadlineExpired {
                now: NOW + 1,
                deadline: NOW
            }
        );

        let pool = router.registry().get_pool(addr(1), addr(2)).unwrap();
        assert_eq!(pool.reserves(), (4_000, 4_000));
        assert_eq!(pool.balance_of(LP), 3_000);
    }

    #[test]
    fn test_remove_liquidity_b_minimum() {
        let (router, _) = router();
        // sqrt(4_000 * 16_000) = 8_000 shares, 1_000 locked
        let receipt = add(&router, 1, 2, 4_000, 16_000);
        assert_eq!(receipt.shares, 7_000);

        let params = RemoveLiquidityParams {
            token_a: addr(1),
            token_b: addr(2),
            shares: 1_000,
            amount_a_min: 0,
            amount_b_min: 2_001,
            provider: LP,
            recipient: LP,
            deadline: NOW,
        };
        assert_eq!(
            router.remove_liquidity(&params).unwrap_err(),
            AmmError::InsufficientBAmount {
                amount: 2_000,
                min: 2_001
            }
        );

        let pool = router.registry().get_pool(addr(1), addr(2)).unwrap();
        assert_eq!(pool.reserves(), (4_000, 16_000));
        assert_eq!(pool.balance_of(LP), 7_000);
        assert_eq!(pool.total_shares(), 8_000);
    }

    #[test]
    fn test_remove_liquidity_missing_pool() {
        let (router, _) = router();
        add(&router, 1, 2, 4_000, 4_000);

        let err = router
            .remove_liquidity(&RemoveLiquidityParams {
                token_a: addr(1),
                token_b: addr(3),
                shares: 1_000,
                amount_a_min: 0,
                amount_b_min: 0,
                provider: LP,
                recipient: LP,
                deadline: NOW,
            })
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::PoolNotFound {
                token_a: addr(1),
                token_b: addr(3)
            }
        );

        assert!(router.registry().get_pool(addr(1), addr(3)).is_none());
        assert_eq!(router.registry().len(), 1);
        let pool = router.registry().get_pool(addr(1), addr(2)).unwrap();
        assert_eq!(pool.reserves(), (4_000, 4_000));
        assert_eq!(pool.balance_of(LP), 3_000);
    }

    #[test]
    fn test_min_amount_with_slippage() {
        assert_eq!(Router::min_amount_with_slippage(10_000, 50), 9_950);
        assert_eq!(Router::min_amount_with_slippage(10_000, 20_000), 0);
    }
}
