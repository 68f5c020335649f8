//! Standardized emoji logging for the DEX command line
//!
//! Keeps emoji usage consistent across commands so stderr logs read the
//! same way no matter which subcommand produced them.

/// Standard emoji set for DEX logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed

    // Module-specific
    pub const SEARCH: &'static str = "🔍"; // Path search
    pub const POOL: &'static str = "🏊"; // Pool state
    pub const LOAD: &'static str = "📂"; // Seed / config files

    // Event types
    pub const SWAP: &'static str = "🔄"; // Swap executed
    pub const MINT: &'static str = "➕"; // Liquidity added
    pub const BURN: &'static str = "➖"; // Liquidity removed
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_search {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SEARCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_pool {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::POOL, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_load {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::LOAD, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_swap {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SWAP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_mint {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MINT, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_burn {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BURN, format!($($arg)*))
    };
}
