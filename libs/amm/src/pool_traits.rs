//! Pool trait definitions for a unified pricing interface
//!
//! Implemented by live locked pools and by detached snapshots so the router
//! can price a hop the same way whether it is quoting or executing.

use crate::error::{AmmError, AmmResult};
use crate::pool::PoolId;
use crate::v2_math::V2Math;
use types::{Address, PairKey};

pub trait AmmPool {
    fn pool_id(&self) -> PoolId;

    fn pair(&self) -> PairKey;

    fn fee_bps(&self) -> u32;

    /// Reserves in canonical `(token0, token1)` order
    fn reserves(&self) -> (u128, u128);

    /// Reserves oriented as `(reserve_in, reserve_out)` for a trade selling `token_in`
    fn oriented_reserves(&self, token_in: Address) -> AmmResult<(u128, u128)> {
        let pair = self.pair();
        let (reserve0, reserve1) = self.reserves();
        if token_in == pair.token0 {
            Ok((reserve0, reserve1))
        } else if token_in == pair.token1 {
            Ok((reserve1, reserve0))
        } else {
            Err(AmmError::UnknownToken {
                token: token_in,
                pool_id: self.pool_id(),
            })
        }
    }

    /// Calculate output amount for selling `amount_in` of `token_in`
    fn get_amount_out(&self, token_in: Address, amount_in: u128) -> AmmResult<u128> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in)?;
        V2Math::calculate_output_amount(amount_in, reserve_in, reserve_out, self.fee_bps())
    }

    /// Calculate input of `token_in` required to receive `amount_out`
    fn get_amount_in(&self, token_in: Address, amount_out: u128) -> AmmResult<u128> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in)?;
        V2Math::calculate_input_amount(amount_out, reserve_in, reserve_out, self.fee_bps())
    }
}
