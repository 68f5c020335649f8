//! Argument parsers for tokens and raw amounts

use dex_config::token_by_symbol;
use types::Address;

/// Known symbol (`WFLR`, `usdc`, ...) or `0x`-prefixed address
pub fn parse_token(input: &str) -> Result<Address, String> {
    if let Some(address) = token_by_symbol(input) {
        return Ok(address);
    }
    input
        .parse::<Address>()
        .map_err(|e| format!("'{}' is neither a known symbol nor an address: {}", input, e))
}

/// Account address; symbols and the zero address are rejected
pub fn parse_account(input: &str) -> Result<Address, String> {
    let account = input
        .parse::<Address>()
        .map_err(|e| format!("'{}' is not an account address: {}", input, e))?;
    if account.is_zero() {
        return Err(format!("'{}' is the zero address", input));
    }
    Ok(account)
}

/// Raw integer amount; `_` separators are allowed
pub fn parse_amount(input: &str) -> Result<u128, String> {
    input
        .replace('_', "")
        .parse::<u128>()
        .map_err(|e| format!("invalid amount '{}': {}", input, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_config::constants::tokens;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("wflr"), Ok(tokens::WFLR));
        assert_eq!(parse_token("FLR"), Ok(Address::ZERO));
        assert_eq!(
            parse_token("0x0A73ABF26e1e8dEE7380B804112f072224add49A"),
            Ok(tokens::CLAP)
        );
        assert!(parse_token("DOGE").is_err());
    }

    #[test]
    fn test_parse_account() {
        assert_eq!(
            parse_account("0x00000000000000000000000000000000000000aa"),
            Ok(Address::from_low_u64(0xaa))
        );
        assert!(parse_account("FLR").is_err());
        assert!(parse_account("WFLR").is_err());
        assert!(parse_account("0x0000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1_000_000"), Ok(1_000_000));
        assert_eq!(
            parse_amount("340282366920938463463374607431768211455"),
            Ok(u128::MAX)
        );
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.5").is_err());
    }
}
