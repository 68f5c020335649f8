//! Best-path search over direct and single-bridge routes
//!
//! Candidates are the direct path followed by one path per bridge token in
//! allow-list order. Each candidate is quoted through the router; the
//! strictly greatest final output wins and ties keep the earlier candidate.
//! A candidate that cannot be quoted is recorded as a [`PathFailure`] and
//! the search moves on.

use crate::error::{AmmError, AmmResult};
use crate::pool_traits::AmmPool;
use crate::router::Router;
use crate::v2_math::V2Math;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use tracing::{debug, warn};
use types::{Address, SwapPath};

/// Tokens the selector may route through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Stand-in for the native token (`Address::ZERO`)
    pub wrapped_native: Address,
    /// Bridge allow-list, in preference order
    pub bridge_tokens: Vec<Address>,
}

impl RoutingConfig {
    pub fn new(wrapped_native: Address, bridge_tokens: Vec<Address>) -> Self {
        Self {
            wrapped_native,
            bridge_tokens,
        }
    }
}

/// A candidate that could not be quoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFailure {
    pub path: SwapPath,
    #[serde(serialize_with = "serialize_display")]
    pub error: AmmError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestPath {
    pub path: SwapPath,
    /// Quoted amount at every path token
    pub amounts: Vec<u128>,
    pub amount_out: u128,
    /// Candidates rejected along the way
    pub failures: Vec<PathFailure>,
}

pub struct PathSelector {
    router: Arc<Router>,
    routing: RoutingConfig,
}

impl PathSelector {
    pub fn new(router: Arc<Router>, routing: RoutingConfig) -> Self {
        Self { router, routing }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Map the native token to its wrapped form; other tokens pass through
    pub fn resolve_token(&self, token: Address) -> Address {
        if token.is_zero() {
            self.routing.wrapped_native
        } else {
            token
        }
    }

    /// Direct path first, then one bridged path per usable bridge
    pub fn candidate_paths(
        &self,
        token_in: Address,
        token_out: Address,
        bridges: &[Address],
    ) -> AmmResult<Vec<SwapPath>> {
        let mut candidates = vec![SwapPath::direct(token_in, token_out)?];
        let mut seen: Vec<Address> = Vec::with_capacity(bridges.len());

        for &bridge in bridges {
            let bridge = self.resolve_token(bridge);
            if bridge == token_in || bridge == token_out || seen.contains(&bridge) {
                continue;
            }
            seen.push(bridge);
            candidates.push(SwapPath::bridged(token_in, bridge, token_out)?);
        }
        Ok(candidates)
    }

    /// Highest-output path from `token_in` to `token_out` over the direct
    /// route and routes bridged through `bridges`
    pub fn find_best_path(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        bridges: &[Address],
    ) -> AmmResult<BestPath> {
        let token_in = self.resolve_token(token_in);
        let token_out = self.resolve_token(token_out);
        if token_in == token_out {
            return Err(AmmError::IdenticalTokens { token: token_in });
        }

        let mut best: Option<(SwapPath, Vec<u128>)> = None;
        let mut failures = Vec::new();

        for path in self.candidate_paths(token_in, token_out, bridges)? {
            match self.router.get_amounts_out(amount_in, &path) {
                Ok(amounts) => {
                    let improves = best
                        .as_ref()
                        .map_or(true, |(_, current)| final_amount(&amounts) > final_amount(current));
                    if improves {
                        best = Some((path, amounts));
                    }
                }
                Err(error) => {
                    warn!(path = %path, amount_in, error = %error, "Candidate path rejected");
                    failures.push(PathFailure { path, error });
                }
            }
        }

        let (path, amounts) = best.ok_or(AmmError::NoRouteFound {
            token_in,
            token_out,
        })?;
        let amount_out = final_amount(&amounts);
        debug!(path = %path, amount_in, amount_out, rejected = failures.len(), "Selected path");

        Ok(BestPath {
            path,
            amounts,
            amount_out,
            failures,
        })
    }

    /// [`find_best_path`](Self::find_best_path) over the configured allow-list
    pub fn find_best_path_default(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
    ) -> AmmResult<BestPath> {
        self.find_best_path(token_in, token_out, amount_in, &self.routing.bridge_tokens)
    }

    /// Price impact, in percent, of receiving `amount_out` for `amount_in`
    ///
    /// Measured against the spot price of the path's first pool, so for
    /// multi-hop paths the figure is indicative only.
    pub fn estimate_price_impact(
        &self,
        path: &SwapPath,
        amount_in: u128,
        amount_out: u128,
    ) -> AmmResult<Decimal> {
        let (token_in, next) = (path.tokens()[0], path.tokens()[1]);
        let pool = self
            .router
            .registry()
            .get_pool(token_in, next)
            .ok_or(AmmError::PoolNotFound {
                token_a: token_in,
                token_b: next,
            })?;
        let (reserve_in, reserve_out) = pool.lock().oriented_reserves(token_in)?;
        V2Math::calculate_price_impact(amount_in, amount_out, reserve_in, reserve_out)
    }
}

fn final_amount(amounts: &[u128]) -> u128 {
    amounts.last().copied().unwrap_or_default()
}

fn serialize_display<S: Serializer>(error: &AmmError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
