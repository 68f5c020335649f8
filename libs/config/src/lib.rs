//! # DEX Configuration
//!
//! Layered configuration for the AMM services plus the network's
//! well-known token addresses.
//!
//! ## Features
//!
//! - **Token Constants**: Flare mainnet token addresses and symbol lookup
//! - **Routing Defaults**: Wrapped native token and bridge allow-list
//! - **Layered Loading**: TOML base file, environment overlay, `DEX__` variables
//!
//! ## Usage
//!
//! ```rust
//! use dex_config::{constants::tokens, token_by_symbol, DexConfig};
//!
//! let config = DexConfig::default();
//! assert_eq!(config.routing.wrapped_native, tokens::WFLR);
//! assert_eq!(token_by_symbol("usdc"), Some(tokens::USDC));
//! ```

pub mod constants;
pub mod dex_config;

// Re-export commonly used types
pub use constants::{symbol_for, token_by_symbol};
pub use dex_config::{
    load_config, AmmSettings, DexConfig, LoggingSettings, RouterSettings, RoutingSettings,
    SeedSettings, DEFAULT_CONFIG_PATH,
};
