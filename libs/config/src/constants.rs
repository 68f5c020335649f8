//! Well-known Flare network addresses and routing defaults

use types::Address;

/// Token addresses on Flare mainnet
pub mod tokens {
    use types::Address;

    /// Native FLR is addressed as the zero address and routed as WFLR
    pub const FLR: Address = Address::ZERO;

    /// Wrapped FLR
    pub const WFLR: Address = Address::from_hex_literal("0x59A68F2390Aafde7a3B888FB29d708D696De440c");

    /// USD Coin (bridged)
    pub const USDC: Address = Address::from_hex_literal("0xdDC7a84B617E6a08934e7c93B677a30DC8890fff");

    /// Ether (bridged)
    pub const ETH: Address = Address::from_hex_literal("0xe0572C001B320dBd214C5ddB592C018FA5cedA4F");

    pub const LEGEND: Address =
        Address::from_hex_literal("0x0eaF4Fa5a3abfb43456334ceB2A64B990Ea7a60a");

    /// DEX governance token
    pub const CLAP: Address = Address::from_hex_literal("0x0A73ABF26e1e8dEE7380B804112f072224add49A");

    /// Symbol table, in display order
    pub const BY_SYMBOL: [(&str, Address); 6] = [
        ("FLR", FLR),
        ("WFLR", WFLR),
        ("USDC", USDC),
        ("ETH", ETH),
        ("LEGEND", LEGEND),
        ("CLAP", CLAP),
    ];
}

/// Path selection defaults
pub mod routing {
    use super::tokens;
    use types::Address;

    /// Bridge allow-list, tried in this order after the direct path
    pub const BRIDGE_TOKENS: [Address; 2] = [tokens::WFLR, tokens::USDC];
}

/// Address for a known symbol, case-insensitive
pub fn token_by_symbol(symbol: &str) -> Option<Address> {
    tokens::BY_SYMBOL
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(symbol))
        .map(|(_, address)| *address)
}

/// Symbol for a known address
pub fn symbol_for(address: Address) -> Option<&'static str> {
    tokens::BY_SYMBOL
        .iter()
        .find(|(_, known)| *known == address)
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(token_by_symbol("usdc"), Some(tokens::USDC));
        assert_eq!(token_by_symbol("FLR"), Some(Address::ZERO));
        assert_eq!(token_by_symbol("DOGE"), None);
        assert_eq!(symbol_for(tokens::CLAP), Some("CLAP"));
    }

    #[test]
    fn test_literals_match_parsed() {
        let wflr: Address = "0x59A68F2390Aafde7a3B888FB29d708D696De440c".parse().unwrap();
        assert_eq!(tokens::WFLR, wflr);
        assert!(tokens::BY_SYMBOL
            .iter()
            .skip(1)
            .all(|(_, address)| !address.is_zero()));
    }
}
