#[macro_use]
mod logging;
mod commands;
mod pool_loader;
mod tokens;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Command, Dex};
use dex_config::{load_config, LoggingSettings};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dex")]
#[command(about = "Quote, route and simulate trades against an in-memory constant-product DEX")]
#[command(version)]
struct Cli {
    /// Base configuration file (default: config/dex.toml, optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Environment overlay, read from environments/<ENV>.toml next to the config
    #[arg(long, global = true)]
    env: Option<String>,
    /// Pool seed file; overrides seed.pools_file
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Logs go to stderr so stdout carries only the JSON result
fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level).context("Invalid logging.level filter")?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.env.as_deref())
        .context("Failed to load DEX configuration")?;
    init_tracing(&config.logging)?;
    info!(
        fee_bps = config.amm.fee_bps,
        bridges = config.routing.bridge_tokens.len(),
        "Starting DEX"
    );

    let seed_path = cli.seed.clone().or_else(|| config.seed_path());
    let dex = Dex::new(config);

    if let Some(path) = seed_path {
        log_load!("Loading pool seeds from {:?}", path);
        let pools = pool_loader::load_seed_file(&path)?;
        let seeded = dex.seed(&pools)?;
        log_success!("Seeded {} pools", seeded);
    } else {
        info!("No seed file configured, starting with an empty registry");
    }

    match dex.run(cli.command) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            log_error!("{:#}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_config::constants::tokens;

    #[test]
    fn test_parse_swap_command() {
        let cli = Cli::try_parse_from([
            "dex",
            "--seed",
            "pools.json",
            "swap",
            "--from",
            "FLR",
            "--to",
            "usdc",
            "--amount",
            "1_000_000",
            "--bridge",
            "ETH",
            "--recipient",
            "0x00000000000000000000000000000000000000aa",
        ])
        .unwrap();

        assert_eq!(cli.seed, Some(PathBuf::from("pools.json")));
        match cli.command {
            Command::Swap(args) => {
                assert_eq!(args.trade.from, types::Address::ZERO);
                assert_eq!(args.trade.to, tokens::USDC);
                assert_eq!(args.trade.amount, 1_000_000);
                assert_eq!(args.trade.bridges, vec![tokens::ETH]);
                assert_eq!(args.min_out, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_impact_path_list() {
        let cli = Cli::try_parse_from([
            "dex", "impact", "--path", "WFLR,USDC,ETH", "--amount", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Impact(args) => {
                assert_eq!(args.path, vec![tokens::WFLR, tokens::USDC, tokens::ETH])
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_account_arguments_reject_symbols() {
        assert!(Cli::try_parse_from(["dex", "positions", "--account", "FLR"]).is_err());
        assert!(Cli::try_parse_from([
            "dex",
            "positions",
            "--account",
            "0x0000000000000000000000000000000000000000",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "dex",
            "positions",
            "--account",
            "0x00000000000000000000000000000000000000aa",
        ])
        .is_ok());
    }

    #[test]
    fn test_remove_requires_shares_or_percent() {
        let base = [
            "dex",
            "remove-liquidity",
            "--token-a",
            "WFLR",
            "--token-b",
            "USDC",
            "--provider",
            "0x00000000000000000000000000000000000000aa",
        ];
        assert!(Cli::try_parse_from(base).is_err());

        let mut with_both = base.to_vec();
        with_both.extend(["--shares", "10", "--percent-bps", "5000"]);
        assert!(Cli::try_parse_from(with_both).is_err());

        let mut with_percent = base.to_vec();
        with_percent.extend(["--percent-bps", "5000"]);
        assert!(Cli::try_parse_from(with_percent).is_ok());
    }
}
