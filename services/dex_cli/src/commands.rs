//! Subcommands and the in-memory DEX they run against

use crate::pool_loader::SeedPool;
use crate::tokens::{parse_account, parse_amount, parse_token};
use amm::{
    AddLiquidityParams, BestPath, Clock, Decimal, PairRegistry, PathSelector, PoolSnapshot,
    RemoveLiquidityParams, Router, RoutingConfig, SystemClock,
};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dex_config::DexConfig;
use serde::Serialize;
use std::sync::Arc;
use types::{Address, SwapPath};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every pool with reserves and activity counters
    Pools,
    /// Find the best path for a trade and quote it
    Quote(TradeArgs),
    /// Execute a trade along the best path
    Swap(SwapArgs),
    /// Deposit liquidity, creating the pool if needed
    AddLiquidity(AddLiquidityArgs),
    /// Withdraw liquidity by share count or percentage
    RemoveLiquidity(RemoveLiquidityArgs),
    /// Show an account's liquidity positions
    Positions {
        #[arg(long, value_parser = parse_account)]
        account: Address,
    },
    /// Quote a fixed path and report its price impact
    Impact(ImpactArgs),
}

#[derive(Args, Debug)]
pub struct TradeArgs {
    /// Token sold (symbol or address)
    #[arg(long, value_parser = parse_token)]
    pub from: Address,
    /// Token bought (symbol or address)
    #[arg(long, value_parser = parse_token)]
    pub to: Address,
    /// Raw input amount
    #[arg(long, value_parser = parse_amount)]
    pub amount: u128,
    /// Bridge token to consider; repeat to give several. Defaults to routing.bridge_tokens
    #[arg(long = "bridge", value_parser = parse_token)]
    pub bridges: Vec<Address>,
}

#[derive(Args, Debug)]
pub struct SwapArgs {
    #[command(flatten)]
    pub trade: TradeArgs,
    /// Minimum output; derived from the slippage tolerance when omitted
    #[arg(long, value_parser = parse_amount)]
    pub min_out: Option<u128>,
    /// Slippage tolerance in basis points, defaults to router.default_slippage_bps
    #[arg(long)]
    pub slippage_bps: Option<u32>,
    #[arg(long, value_parser = parse_account)]
    pub recipient: Address,
    /// Seconds until the trade expires, defaults to router.default_deadline_secs
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AddLiquidityArgs {
    #[arg(long, value_parser = parse_token)]
    pub token_a: Address,
    #[arg(long, value_parser = parse_token)]
    pub token_b: Address,
    #[arg(long, value_parser = parse_amount)]
    pub amount_a: u128,
    #[arg(long, value_parser = parse_amount)]
    pub amount_b: u128,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub min_a: u128,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub min_b: u128,
    #[arg(long, value_parser = parse_account)]
    pub recipient: Address,
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RemoveLiquidityArgs {
    #[arg(long, value_parser = parse_token)]
    pub token_a: Address,
    #[arg(long, value_parser = parse_token)]
    pub token_b: Address,
    /// Exact shares to burn
    #[arg(long, value_parser = parse_amount, conflicts_with = "percent_bps", required_unless_present = "percent_bps")]
    pub shares: Option<u128>,
    /// Fraction of the provider's balance to burn, in basis points
    #[arg(long)]
    pub percent_bps: Option<u32>,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub min_a: u128,
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub min_b: u128,
    #[arg(long, value_parser = parse_account)]
    pub provider: Address,
    /// Receiver of the withdrawn tokens, defaults to the provider
    #[arg(long, value_parser = parse_account)]
    pub recipient: Option<Address>,
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ImpactArgs {
    /// Comma-separated tokens, e.g. WFLR,USDC,ETH
    #[arg(long, value_parser = parse_token, value_delimiter = ',', required = true)]
    pub path: Vec<Address>,
    #[arg(long, value_parser = parse_amount)]
    pub amount: u128,
}

#[derive(Debug, Serialize)]
pub struct QuoteOutput {
    pub best: BestPath,
    pub slippage_bps: u32,
    pub min_amount_out: u128,
    pub price_impact_percent: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ImpactOutput {
    pub path: SwapPath,
    pub amounts: Vec<u128>,
    pub price_impact_percent: Decimal,
}

/// Registry, router and path selector built from configuration
pub struct Dex {
    config: DexConfig,
    router: Arc<Router>,
    selector: PathSelector,
}

impl Dex {
    pub fn new(config: DexConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DexConfig, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(PairRegistry::new(config.amm.fee_bps));
        let router = Arc::new(Router::new(registry, clock));
        let routing = RoutingConfig::new(
            config.routing.wrapped_native,
            config.routing.bridge_tokens.clone(),
        );
        let selector = PathSelector::new(router.clone(), routing);
        Self {
            config,
            router,
            selector,
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Deposit every seed through the router; returns the number applied
    pub fn seed(&self, pools: &[SeedPool]) -> Result<usize> {
        for pool in pools {
            let receipt = self
                .router
                .add_liquidity(&AddLiquidityParams {
                    token_a: self.selector.resolve_token(pool.token_a),
                    token_b: self.selector.resolve_token(pool.token_b),
                    amount_a_desired: pool.amount_a,
                    amount_b_desired: pool.amount_b,
                    amount_a_min: 0,
                    amount_b_min: 0,
                    recipient: pool.provider,
                    deadline: self.deadline(None),
                })
                .with_context(|| format!("Failed to seed pool {}/{}", pool.token_a, pool.token_b))?;
            log_mint!(
                "Seeded pool {} with {} shares for {}",
                receipt.pool_id,
                receipt.shares,
                pool.provider.short()
            );
        }
        Ok(pools.len())
    }

    /// Run one subcommand and render its result as pretty JSON
    pub fn run(&self, command: Command) -> Result<String> {
        match command {
            Command::Pools => {
                let snapshots: Vec<PoolSnapshot> = self
                    .router
                    .registry()
                    .list_pools()
                    .iter()
                    .map(|pool| pool.snapshot())
                    .collect();
                log_pool!("{} pools", snapshots.len());
                render(&snapshots)
            }
            Command::Quote(args) => render(&self.quote(&args)?),
            Command::Swap(args) => {
                let best = self.best_path(&args.trade)?;
                let slippage_bps = args
                    .slippage_bps
                    .unwrap_or(self.config.router.default_slippage_bps);
                let min_amount_out = args
                    .min_out
                    .unwrap_or_else(|| Router::min_amount_with_slippage(best.amount_out, slippage_bps));

                let receipt = self
                    .router
                    .execute_swap(
                        args.trade.amount,
                        &best.path,
                        min_amount_out,
                        args.recipient,
                        self.deadline(args.deadline_secs),
                    )
                    .context("Swap failed")?;
                log_swap!(
                    "Swapped {} for {} via {}",
                    receipt.amounts[0],
                    receipt.amount_out,
                    receipt.path
                );
                render(&receipt)
            }
            Command::AddLiquidity(args) => {
                let receipt = self
                    .router
                    .add_liquidity(&AddLiquidityParams {
                        token_a: self.selector.resolve_token(args.token_a),
                        token_b: self.selector.resolve_token(args.token_b),
                        amount_a_desired: args.amount_a,
                        amount_b_desired: args.amount_b,
                        amount_a_min: args.min_a,
                        amount_b_min: args.min_b,
                        recipient: args.recipient,
                        deadline: self.deadline(args.deadline_secs),
                    })
                    .context("Add liquidity failed")?;
                log_mint!("Minted {} shares in pool {}", receipt.shares, receipt.pool_id);
                render(&receipt)
            }
            Command::RemoveLiquidity(args) => {
                let params = RemoveLiquidityParams {
                    token_a: self.selector.resolve_token(args.token_a),
                    token_b: self.selector.resolve_token(args.token_b),
                    shares: args.shares.unwrap_or_default(),
                    amount_a_min: args.min_a,
                    amount_b_min: args.min_b,
                    provider: args.provider,
                    recipient: args.recipient.unwrap_or(args.provider),
                    deadline: self.deadline(args.deadline_secs),
                };
                let receipt = match args.percent_bps {
                    Some(percent_bps) => self.router.remove_liquidity_percent(&params, percent_bps),
                    None => self.router.remove_liquidity(&params),
                }
                .context("Remove liquidity failed")?;
                log_burn!(
                    "Burned {} shares from pool {}",
                    receipt.shares_burned,
                    receipt.pool_id
                );
                render(&receipt)
            }
            Command::Positions { account } => {
                let positions = self.router.registry().positions(account)?;
                render(&positions)
            }
            Command::Impact(args) => render(&self.impact(&args)?),
        }
    }

    fn quote(&self, args: &TradeArgs) -> Result<QuoteOutput> {
        let best = self.best_path(args)?;
        let slippage_bps = self.config.router.default_slippage_bps;
        let price_impact_percent =
            self.selector
                .estimate_price_impact(&best.path, args.amount, best.amount_out)?;

        Ok(QuoteOutput {
            min_amount_out: Router::min_amount_with_slippage(best.amount_out, slippage_bps),
            slippage_bps,
            price_impact_percent,
            best,
        })
    }

    fn impact(&self, args: &ImpactArgs) -> Result<ImpactOutput> {
        let tokens = args
            .path
            .iter()
            .map(|&token| self.selector.resolve_token(token))
            .collect();
        let path = SwapPath::new(tokens).context("Invalid path")?;
        let amounts = self.router.get_amounts_out(args.amount, &path)?;
        let amount_out = amounts.last().copied().unwrap_or_default();
        let price_impact_percent = self
            .selector
            .estimate_price_impact(&path, args.amount, amount_out)?;

        Ok(ImpactOutput {
            path,
            amounts,
            price_impact_percent,
        })
    }

    fn best_path(&self, args: &TradeArgs) -> Result<BestPath> {
        let best = if args.bridges.is_empty() {
            self.selector
                .find_best_path_default(args.from, args.to, args.amount)
        } else {
            self.selector
                .find_best_path(args.from, args.to, args.amount, &args.bridges)
        }
        .context("No route available")?;

        log_search!(
            "Best path {} returns {} ({} candidates rejected)",
            best.path,
            best.amount_out,
            best.failures.len()
        );
        Ok(best)
    }

    fn deadline(&self, secs: Option<u64>) -> u64 {
        self.router
            .deadline_from_now(secs.unwrap_or(self.config.router.default_deadline_secs))
    }
}

fn render<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}
