//! DEX Configuration Module
//!
//! Loads configuration from a base TOML file, an optional per-environment
//! overlay and `DEX__`-prefixed environment variables, in that order of
//! increasing precedence. Every section falls back to defaults, so an empty
//! or missing base file yields a working configuration.

use crate::constants::{routing as routing_defaults, tokens};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::Address;

/// Default base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/dex.toml";

const MAX_FEE_BPS: u32 = 1_000;
const MAX_SLIPPAGE_BPS: u32 = 10_000;

/// Main DEX configuration structure
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DexConfig {
    pub amm: AmmSettings,
    pub router: RouterSettings,
    pub routing: RoutingSettings,
    pub logging: LoggingSettings,
    pub seed: SeedSettings,
}

/// Pool parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AmmSettings {
    /// Swap fee for new pools, basis points
    pub fee_bps: u32,
}

/// Router defaults applied when a caller gives no explicit bound
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouterSettings {
    pub default_deadline_secs: u64,
    pub default_slippage_bps: u32,
}

/// Path selection tokens
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RoutingSettings {
    pub wrapped_native: Address,
    pub bridge_tokens: Vec<Address>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

/// Initial pools to load at startup
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SeedSettings {
    pub pools_file: Option<String>,
}

impl Default for AmmSettings {
    fn default() -> Self {
        Self { fee_bps: 30 }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            default_deadline_secs: 1_200,
            default_slippage_bps: 50,
        }
    }
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            wrapped_native: tokens::WFLR,
            bridge_tokens: routing_defaults::BRIDGE_TOKENS.to_vec(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DexConfig {
    /// Load configuration from files with environment overrides
    ///
    /// The base file is required only when `base_path` is given. The
    /// overlay for `environment` is read from `environments/<env>.toml`
    /// next to the base file.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder =
            Config::builder().add_source(File::from(base).required(base_path.is_some()));

        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables, e.g. DEX__AMM__FEE_BPS=25
        builder = builder.add_source(
            Environment::with_prefix("DEX")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("routing.bridge_tokens"),
        );

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Reject values the AMM cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.amm.fee_bps > MAX_FEE_BPS {
            bail!(
                "amm.fee_bps = {} exceeds maximum {}",
                self.amm.fee_bps,
                MAX_FEE_BPS
            );
        }
        if self.router.default_slippage_bps > MAX_SLIPPAGE_BPS {
            bail!(
                "router.default_slippage_bps = {} exceeds {}",
                self.router.default_slippage_bps,
                MAX_SLIPPAGE_BPS
            );
        }
        if self.router.default_deadline_secs == 0 {
            bail!("router.default_deadline_secs must be positive");
        }
        if self.routing.wrapped_native.is_zero() {
            bail!("routing.wrapped_native cannot be the native token itself");
        }
        if self.routing.bridge_tokens.iter().any(Address::is_zero) {
            bail!("routing.bridge_tokens must list wrapped tokens, not the zero address");
        }
        Ok(())
    }

    /// Expand environment variables and `~` in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(pools_file) = &self.seed.pools_file {
            let expanded =
                shellexpand::full(pools_file).context("Failed to expand seed pools path")?;
            self.seed.pools_file = Some(expanded.to_string());
        }
        Ok(())
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed.pools_file.as_ref().map(PathBuf::from)
    }
}

/// Load, expand and validate configuration in one call
pub fn load_config(base_path: Option<&Path>, environment: Option<&str>) -> Result<DexConfig> {
    let mut config = DexConfig::load(base_path, environment)?;
    config.expand_env_vars()?;
    config.validate()?;
    Ok(config)
}
