//! # AMM Core - Constant Product Pools, Registry, Router and Path Selection
//!
//! ## Purpose
//!
//! In-process model of a factory/pair/router DEX. Pools hold reserves and LP
//! shares for one token pair and enforce the `x * y = k` invariant with exact
//! integer arithmetic; the registry creates and indexes them; the router
//! quotes and executes multi-hop swaps and manages liquidity; the path
//! selector picks the best direct or single-bridge route.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Token addresses and raw integer amounts from callers
//! - **Output Destinations**: Receipts (`SwapReceipt`, `LiquidityReceipt`,
//!   `RemovalReceipt`) and quotes, all serializable
//! - **Time**: Deadlines checked against an injected [`Clock`]
//! - **Precision**: `u128` amounts with 512-bit intermediates, no floating point
//!
//! ## Architecture Role
//!
//! ```text
//! PathSelector ──> Router ──> PairRegistry ──> Pool (Mutex<PoolState>)
//!                    │                           ▲
//!                    └──── V2Math ───────────────┘
//! ```
//!
//! Each pool serializes its own mutations. Multi-hop execution locks every
//! pool on the path in ascending pool id order.
//!
//! ## Example
//!
//! ```rust
//! use amm::{AddLiquidityParams, ManualClock, PairRegistry, Router};
//! use std::sync::Arc;
//! use types::{Address, SwapPath};
//!
//! let registry = Arc::new(PairRegistry::default());
//! let router = Router::new(registry, Arc::new(ManualClock::new(0)));
//! let (a, b) = (Address::from_low_u64(1), Address::from_low_u64(2));
//! let lp = Address::from_low_u64(7);
//!
//! router.add_liquidity(&AddLiquidityParams {
//!     token_a: a,
//!     token_b: b,
//!     amount_a_desired: 1_000_000,
//!     amount_b_desired: 1_000_000,
//!     amount_a_min: 0,
//!     amount_b_min: 0,
//!     recipient: lp,
//!     deadline: 60,
//! })?;
//!
//! let path = SwapPath::direct(a, b)?;
//! let quote = router.get_amounts_out(1_000, &path)?;
//! let receipt = router.execute_swap(1_000, &path, quote[1], lp, 60)?;
//! assert_eq!(receipt.amount_out, quote[1]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clock;
pub mod error;
pub mod path_selector;
pub mod pool;
pub mod pool_traits;
pub mod registry;
pub mod router;
pub mod v2_math;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AmmError, AmmResult};
pub use path_selector::{BestPath, PathFailure, PathSelector, RoutingConfig};
pub use pool::{LockedPool, Pool, PoolId, PoolSnapshot, PoolStats, Position};
pub use pool_traits::AmmPool;
pub use registry::PairRegistry;
pub use router::{
    AddLiquidityParams, LiquidityReceipt, RemovalReceipt, RemoveLiquidityParams, Router,
    SwapReceipt,
};
pub use v2_math::{V2Math, BPS_DENOMINATOR, DEFAULT_FEE_BPS, MAX_FEE_BPS, MINIMUM_LIQUIDITY};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
