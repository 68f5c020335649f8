//! Canonical token pairs and validated swap paths

use crate::{Address, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered token pair stored in canonical order (`token0 < token1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub token0: Address,
    pub token1: Address,
}

impl PairKey {
    /// Normalize `(a, b)` into canonical order
    pub fn new(a: Address, b: Address) -> Result<Self, ValidationError> {
        if a == b {
            return Err(ValidationError::IdenticalTokens { token: a });
        }
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { token0, token1 })
    }

    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// The counterpart of `token`, if `token` belongs to this pair
    pub fn other(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    pub fn is_token0(&self, token: Address) -> bool {
        self.token0 == token
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0.short(), self.token1.short())
    }
}

/// Ordered token route with at least two tokens and no repeats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct SwapPath(Vec<Address>);

impl SwapPath {
    pub fn new(tokens: Vec<Address>) -> Result<Self, ValidationError> {
        if tokens.len() < 2 {
            return Err(ValidationError::PathTooShort { len: tokens.len() });
        }
        for (i, token) in tokens.iter().enumerate() {
            if tokens[..i].contains(token) {
                return Err(ValidationError::RepeatedToken { token: *token });
            }
        }
        Ok(Self(tokens))
    }

    pub fn direct(token_in: Address, token_out: Address) -> Result<Self, ValidationError> {
        if token_in == token_out {
            return Err(ValidationError::IdenticalTokens { token: token_in });
        }
        Self::new(vec![token_in, token_out])
    }

    pub fn bridged(
        token_in: Address,
        bridge: Address,
        token_out: Address,
    ) -> Result<Self, ValidationError> {
        Self::new(vec![token_in, bridge, token_out])
    }

    pub fn tokens(&self) -> &[Address] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the path holds no tokens
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Adjacent `(token_in, token_out)` pairs in path order
    pub fn hops(&self) -> impl Iterator<Item = (Address, Address)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn token_in(&self) -> Address {
        self.0[0]
    }

    pub fn token_out(&self) -> Address {
        self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<Address>> for SwapPath {
    type Error = ValidationError;

    fn try_from(tokens: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<SwapPath> for Vec<Address> {
    fn from(path: SwapPath) -> Self {
        path.0
    }
}

impl fmt::Display for SwapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", token.short())?;
        }
        Ok(())
    }
}
