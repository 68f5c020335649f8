use crate::tokens::{parse_account, parse_amount, parse_token};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use types::Address;

const SEED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize, Serialize)]
struct SeedFileJson {
    version: u32,
    pools: Vec<SeedPoolJson>,
}

/// Amounts are strings: 18-decimal balances overflow JSON numbers
#[derive(Debug, Deserialize, Serialize)]
struct SeedPoolJson {
    token_a: String,
    token_b: String,
    amount_a: String,
    amount_b: String,
    provider: String,
}

/// Initial liquidity for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPool {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: u128,
    pub amount_b: u128,
    pub provider: Address,
}

fn parse_entry(entry: &SeedPoolJson) -> std::result::Result<SeedPool, String> {
    Ok(SeedPool {
        token_a: parse_token(&entry.token_a)?,
        token_b: parse_token(&entry.token_b)?,
        amount_a: parse_amount(&entry.amount_a)?,
        amount_b: parse_amount(&entry.amount_b)?,
        provider: parse_account(&entry.provider)?,
    })
}

/// Load pool seeds from a JSON file
///
/// Entries that fail to parse are skipped with a warning; an unsupported
/// file version is an error.
pub fn load_seed_file(seed_path: &Path) -> Result<Vec<SeedPool>> {
    info!("Loading pool seeds from {:?}", seed_path);

    let json_content = fs::read_to_string(seed_path).context("Failed to read pool seed file")?;

    let seed: SeedFileJson =
        serde_json::from_str(&json_content).context("Failed to parse pool seed JSON")?;
    if seed.version != SEED_FORMAT_VERSION {
        bail!(
            "Unsupported pool seed version {} (expected {})",
            seed.version,
            SEED_FORMAT_VERSION
        );
    }

    let mut pools = Vec::with_capacity(seed.pools.len());
    for entry in &seed.pools {
        match parse_entry(entry) {
            Ok(pool) => pools.push(pool),
            Err(e) => warn!(
                "Skipping seed {}/{}: {}",
                entry.token_a, entry.token_b, e
            ),
        }
    }

    info!(
        "Parsed {} of {} pool seeds",
        pools.len(),
        seed.pools.len()
    );
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_config::constants::tokens;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_seed_file_skips_bad_entries() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
  "version": 1,
  "pools": [
    {{ "token_a": "WFLR", "token_b": "USDC",
       "amount_a": "1000000000000000000000000", "amount_b": "25000000000",
       "provider": "0x00000000000000000000000000000000000000aa" }},
    {{ "token_a": "DOGE", "token_b": "USDC",
       "amount_a": "1", "amount_b": "1",
       "provider": "0x00000000000000000000000000000000000000aa" }},
    {{ "token_a": "WFLR", "token_b": "ETH",
       "amount_a": "1000000", "amount_b": "1000000",
       "provider": "FLR" }}
  ]
}}"#
        )
        .unwrap();

        let pools = load_seed_file(file.path()).unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].token_a, tokens::WFLR);
        assert_eq!(pools[0].amount_a, 1_000_000_000_000_000_000_000_000);
        assert_eq!(pools[0].provider, Address::from_low_u64(0xaa));
        assert!(pools.iter().all(|pool| !pool.provider.is_zero()));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "version": 7, "pools": [] }}"#).unwrap();
        assert!(load_seed_file(file.path()).is_err());
    }
}
