//! # AMM Core Shared Types
//!
//! Identifiers shared by every crate in the workspace.
//!
//! ## Design Philosophy
//!
//! - **Full Addresses**: Tokens and accounts are 20-byte EVM addresses, never truncated
//! - **Canonical Pairs**: A pair of tokens has exactly one ordering, fixed at construction
//! - **Validated Paths**: A `SwapPath` cannot be built with fewer than two tokens or a repeat
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Address, PairKey, SwapPath};
//!
//! let wflr: Address = "0x59A68F2390Aafde7a3B888FB29d708D696De440c".parse().unwrap();
//! let usdc: Address = "0xdDC7a84B617E6a08934e7c93B677a30DC8890fff".parse().unwrap();
//!
//! let pair = PairKey::new(usdc, wflr).unwrap();
//! assert_eq!(pair.token0, wflr);
//!
//! let path = SwapPath::direct(wflr, usdc).unwrap();
//! assert_eq!(path.hop_count(), 1);
//! ```

pub mod address;
pub mod errors;
pub mod pair;

pub use address::Address;
pub use errors::ValidationError;
pub use pair::{PairKey, SwapPath};
