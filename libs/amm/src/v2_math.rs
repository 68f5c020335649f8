//! Constant product (x*y=k) math with exact integer arithmetic
//!
//! Amounts are `u128`. Every product is formed in 256/512-bit integers so
//! no intermediate can overflow; a final result that does not fit back into
//! `u128` is reported as `AmmError::Overflow`. All divisions floor, which
//! rounds in the pool's favor.

use crate::error::{AmmError, AmmResult};
use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;

/// Shares permanently locked on the first deposit
pub const MINIMUM_LIQUIDITY: u128 = 1_000;
/// Basis point denominator
pub const BPS_DENOMINATOR: u128 = 10_000;
/// Default swap fee: 30 bps = 0.3% (the 997/1000 input multiplier)
pub const DEFAULT_FEE_BPS: u32 = 30;
/// Max fee: 1000 bps = 10%
pub const MAX_FEE_BPS: u32 = 1_000;

/// Fixed-point scale for percentages: 1e8 units == 100%
const PERCENT_SCALE: u64 = 100_000_000;
/// Decimal places of the percentage returned by `calculate_price_impact`
const PERCENT_DECIMALS: u32 = 6;

/// V2 AMM math functions with zero precision loss
pub struct V2Math;

impl V2Math {
    /// Calculate exact output amount for a constant product pool
    ///
    /// `amount_out = amount_in * (10000 - fee) * reserve_out
    ///              / (reserve_in * 10000 + amount_in * (10000 - fee))`
    ///
    /// With `fee_bps = 30` this equals the canonical
    /// `amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997)`.
    pub fn calculate_output_amount(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee_bps: u32,
    ) -> AmmResult<u128> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in,
                reserve_out,
            });
        }
        if amount_in == 0 {
            return Err(AmmError::InsufficientInputAmount);
        }

        let amount_in_with_fee = U512::from(amount_in) * U512::from(fee_multiplier(fee_bps));
        let numerator = amount_in_with_fee * U512::from(reserve_out);
        let denominator = U512::from(reserve_in) * U512::from(BPS_DENOMINATOR) + amount_in_with_fee;

        let amount_out = narrow(numerator / denominator, "output amount")?;
        if amount_out == 0 {
            return Err(AmmError::InsufficientOutputAmount {
                amount_out: 0,
                min_amount_out: 1,
            });
        }
        Ok(amount_out)
    }

    /// Calculate required input amount for a desired output (reverse calculation)
    ///
    /// Rounds up by one unit so the returned input always suffices.
    pub fn calculate_input_amount(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee_bps: u32,
    ) -> AmmResult<u128> {
        if amount_out == 0 {
            return Err(AmmError::InsufficientOutputAmount {
                amount_out: 0,
                min_amount_out: 1,
            });
        }
        if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in,
                reserve_out,
            });
        }

        let numerator =
            U512::from(reserve_in) * U512::from(amount_out) * U512::from(BPS_DENOMINATOR);
        let denominator =
            U512::from(reserve_out - amount_out) * U512::from(fee_multiplier(fee_bps));

        let amount_in = narrow(numerator / denominator, "input amount")?;
        amount_in
            .checked_add(1)
            .ok_or(AmmError::Overflow {
                context: "input amount",
            })
    }

    /// Amount of B equivalent to `amount_a` at the pool's current ratio
    pub fn quote(amount_a: u128, reserve_a: u128, reserve_b: u128) -> AmmResult<u128> {
        if amount_a == 0 {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_a == 0 || reserve_b == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in: reserve_a,
                reserve_out: reserve_b,
            });
        }
        mul_div(amount_a, reserve_b, reserve_a, "quote")
    }

    /// Shares minted by the first deposit, before the minimum-liquidity lock
    /// is subtracted: `floor(sqrt(amount0 * amount1))`
    pub fn liquidity_root(amount0: u128, amount1: u128) -> u128 {
        let product = U256::from(amount0) * U256::from(amount1);
        // sqrt of a 256-bit value always fits in 128 bits
        product.integer_sqrt().low_u128()
    }

    /// Shares credited to the first depositor: `floor(sqrt(a * b)) - MINIMUM_LIQUIDITY`
    pub fn initial_shares(amount0: u128, amount1: u128) -> AmmResult<u128> {
        let root = Self::liquidity_root(amount0, amount1);
        if root <= MINIMUM_LIQUIDITY {
            return Err(AmmError::InsufficientInitialLiquidity {
                root,
                minimum: MINIMUM_LIQUIDITY,
            });
        }
        Ok(root - MINIMUM_LIQUIDITY)
    }

    /// Shares for a deposit into a funded pool, proportional to the smaller
    /// relative contribution
    pub fn proportional_shares(
        amount0: u128,
        amount1: u128,
        reserve0: u128,
        reserve1: u128,
        total_shares: u128,
    ) -> AmmResult<u128> {
        if reserve0 == 0 || reserve1 == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in: reserve0,
                reserve_out: reserve1,
            });
        }
        let from0 = mul_div(amount0, total_shares, reserve0, "mint shares")?;
        let from1 = mul_div(amount1, total_shares, reserve1, "mint shares")?;
        Ok(from0.min(from1))
    }

    /// Token amounts redeemable for `shares` out of `total_shares`
    pub fn redeemable_amounts(
        shares: u128,
        reserve0: u128,
        reserve1: u128,
        total_shares: u128,
    ) -> AmmResult<(u128, u128)> {
        if total_shares == 0 {
            return Ok((0, 0));
        }
        let amount0 = mul_div(shares, reserve0, total_shares, "burn amount")?;
        let amount1 = mul_div(shares, reserve1, total_shares, "burn amount")?;
        Ok((amount0, amount1))
    }

    /// Calculate price impact of an executed trade as a percentage
    ///
    /// Compares the execution price `amount_out / amount_in` with the spot
    /// price `reserve_out / reserve_in`: `(1 - execution / spot) * 100`.
    /// Executions at or above spot report zero.
    pub fn calculate_price_impact(
        amount_in: u128,
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> AmmResult<Decimal> {
        if amount_in == 0 {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in,
                reserve_out,
            });
        }

        // execution / spot = (amount_out * reserve_in) / (amount_in * reserve_out)
        let numerator = U512::from(amount_out) * U512::from(reserve_in) * U512::from(PERCENT_SCALE);
        let denominator = U512::from(amount_in) * U512::from(reserve_out);
        let ratio = numerator / denominator;

        let scale = U512::from(PERCENT_SCALE);
        let shortfall = if ratio >= scale {
            0
        } else {
            (scale - ratio).low_u64()
        };
        Ok(Decimal::new(shortfall as i64, PERCENT_DECIMALS))
    }

    /// `part / whole` as a percentage with six decimal places
    pub fn share_percent(part: u128, whole: u128) -> Decimal {
        if whole == 0 {
            return Decimal::ZERO;
        }
        let scaled = (U512::from(part) * U512::from(PERCENT_SCALE)) / U512::from(whole);
        Decimal::from_i128_with_scale(scaled.low_u128() as i128, PERCENT_DECIMALS)
    }

    /// Reduce `amount` by a slippage tolerance in basis points
    pub fn apply_slippage(amount: u128, slippage_bps: u32) -> u128 {
        let keep = BPS_DENOMINATOR.saturating_sub(u128::from(slippage_bps));
        Self::portion_bps(amount, keep)
    }

    /// `floor(amount * bps / 10000)`, with `bps` capped at 10000
    pub fn portion_bps(amount: u128, bps: u128) -> u128 {
        // never exceeds amount, so the narrowing cannot fail
        mul_div(amount, bps.min(BPS_DENOMINATOR), BPS_DENOMINATOR, "bps portion").unwrap_or(0)
    }

    /// `x * y` as a 256-bit value, for constant product comparisons
    pub fn product(x: u128, y: u128) -> U256 {
        U256::from(x) * U256::from(y)
    }
}

fn fee_multiplier(fee_bps: u32) -> u128 {
    BPS_DENOMINATOR.saturating_sub(u128::from(fee_bps))
}

/// `floor(a * b / c)` without intermediate overflow
fn mul_div(a: u128, b: u128, c: u128, context: &'static str) -> AmmResult<u128> {
    if c == 0 {
        return Err(AmmError::Overflow { context });
    }
    narrow((U512::from(a) * U512::from(b)) / U512::from(c), context)
}

fn narrow(value: U512, context: &'static str) -> AmmResult<u128> {
    if value > U512::from(u128::MAX) {
        return Err(AmmError::Overflow { context });
    }
    Ok(value.low_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_v2_output_calculation() {
        // 100 in against (1000, 1000) at 0.3%: floor(99_700_000 / 1_099_700) = 90
        let output = V2Math::calculate_output_amount(100, 1_000, 1_000, 30).unwrap();
        assert_eq!(output, 90);
    }

    #[test]
    fn test_fee_bps_matches_997_over_1000() {
        for (amount_in, r_in, r_out) in [(100u128, 1_000u128, 1_000u128), (12_345, 987_654, 55_555)] {
            let canonical = amount_in * 997 * r_out / (r_in * 1_000 + amount_in * 997);
            let output = V2Math::calculate_output_amount(amount_in, r_in, r_out, 30).unwrap();
            assert_eq!(output, canonical);
        }
    }

    #[test]
    fn test_output_rejects_empty_reserves_and_zero_input() {
        assert_eq!(
            V2Math::calculate_output_amount(100, 0, 1_000, 30),
            Err(AmmError::InsufficientLiquidity {
                reserve_in: 0,
                reserve_out: 1_000
            })
        );
        assert_eq!(
            V2Math::calculate_output_amount(0, 1_000, 1_000, 30),
            Err(AmmError::InsufficientInputAmount)
        );
        // an empty pool reports missing liquidity before a zero input
        assert_eq!(
            V2Math::calculate_output_amount(0, 0, 0, 30),
            Err(AmmError::InsufficientLiquidity {
                reserve_in: 0,
                reserve_out: 0
            })
        );
        // 1 unit into a deep pool rounds to nothing
        assert!(matches!(
            V2Math::calculate_output_amount(1, 1_000_000, 1_000, 30),
            Err(AmmError::InsufficientOutputAmount { amount_out: 0, .. })
        ));
    }

    #[test]
    fn test_input_amount_covers_requested_output() {
        let amount_in = V2Math::calculate_input_amount(90, 1_000, 1_000, 30).unwrap();
        let amount_out = V2Math::calculate_output_amount(amount_in, 1_000, 1_000, 30).unwrap();
        assert!(amount_out >= 90);

        assert!(matches!(
            V2Math::calculate_input_amount(1_000, 1_000, 1_000, 30),
            Err(AmmError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_initial_shares() {
        assert_eq!(V2Math::initial_shares(2_000, 2_000).unwrap(), 1_000);
        assert_eq!(
            V2Math::initial_shares(1, 1),
            Err(AmmError::InsufficientInitialLiquidity {
                root: 1,
                minimum: MINIMUM_LIQUIDITY
            })
        );
        // exactly the lock is still rejected
        assert!(V2Math::initial_shares(1_000, 1_000).is_err());
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let big = u128::MAX / 2;
        assert!(V2Math::liquidity_root(big, big) > 0);
        let out = V2Math::calculate_output_amount(big, big, big, 30).unwrap();
        assert!(out < big);
    }

    #[test]
    fn test_proportional_shares_uses_smaller_side() {
        // reserves (1000, 2000), supply 1000; deposit (100, 300) → min(100, 150)
        let shares = V2Math::proportional_shares(100, 300, 1_000, 2_000, 1_000).unwrap();
        assert_eq!(shares, 100);
    }

    #[test]
    fn test_quote() {
        assert_eq!(V2Math::quote(100, 1_000, 2_000).unwrap(), 200);
        assert!(V2Math::quote(100, 0, 2_000).is_err());
    }

    #[test]
    fn test_price_impact() {
        // 90 out for 100 in at spot 1.0 → 10%
        let impact = V2Math::calculate_price_impact(100, 90, 1_000, 1_000).unwrap();
        assert_eq!(impact, dec!(10));

        // better than spot clamps to zero
        let impact = V2Math::calculate_price_impact(100, 120, 1_000, 1_000).unwrap();
        assert_eq!(impact, Decimal::ZERO);
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(V2Math::apply_slippage(10_000, 50), 9_950);
        assert_eq!(V2Math::apply_slippage(10_000, 20_000), 0);
    }

    #[test]
    fn test_share_percent() {
        assert_eq!(V2Math::share_percent(1, 4), dec!(25));
        assert_eq!(V2Math::share_percent(1, 0), Decimal::ZERO);
    }
}
