//! Pair Registry (factory)
//!
//! Creates at most one pool per unordered token pair and keeps them
//! enumerable in creation order.
//!
//! Lookups go through a `DashMap` keyed by the canonical `PairKey`, so
//! concurrent readers never block each other. Creation order lives in a
//! `RwLock<Vec<_>>`; the pair index shard is held while the pool is appended
//! so two racing creators of the same pair cannot both succeed.

use crate::error::{AmmError, AmmResult};
use crate::pool::{Pool, Position};
use crate::v2_math::{DEFAULT_FEE_BPS, MAX_FEE_BPS};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use types::{Address, PairKey};

pub struct PairRegistry {
    /// Canonical pair -> pool
    pools: DashMap<PairKey, Arc<Pool>>,
    /// All pools in creation order; index == pool id
    ordered: RwLock<Vec<Arc<Pool>>>,
    /// Token -> pairs it participates in
    token_index: DashMap<Address, Vec<PairKey>>,
    /// Fee applied to newly created pools
    fee_bps: u32,
}

impl Default for PairRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_BPS)
    }
}

impl PairRegistry {
    /// Registry whose pools charge `fee_bps`, capped at `MAX_FEE_BPS`
    pub fn new(fee_bps: u32) -> Self {
        Self {
            pools: DashMap::new(),
            ordered: RwLock::new(Vec::new()),
            token_index: DashMap::new(),
            fee_bps: fee_bps.min(MAX_FEE_BPS),
        }
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Create the pool for `(token_a, token_b)`
    ///
    /// Fails with `IdenticalTokens` when both sides match and `PairExists`
    /// when the unordered pair already has a pool.
    pub fn create_pool(&self, token_a: Address, token_b: Address) -> AmmResult<Arc<Pool>> {
        let pair = PairKey::new(token_a, token_b)?;
        match self.pools.entry(pair) {
            Entry::Occupied(_) => Err(AmmError::PairExists {
                token0: pair.token0,
                token1: pair.token1,
            }),
            Entry::Vacant(vacant) => {
                let pool = self.insert_pool(pair);
                vacant.insert(pool.clone());
                Ok(pool)
            }
        }
    }

    /// Existing pool for the pair, or a freshly created one
    pub fn get_or_create_pool(&self, token_a: Address, token_b: Address) -> AmmResult<Arc<Pool>> {
        let pair = PairKey::new(token_a, token_b)?;
        let pool = self
            .pools
            .entry(pair)
            .or_insert_with(|| self.insert_pool(pair))
            .clone();
        Ok(pool)
    }

    /// Order-independent lookup
    pub fn get_pool(&self, token_a: Address, token_b: Address) -> Option<Arc<Pool>> {
        let pair = PairKey::new(token_a, token_b).ok()?;
        self.pools.get(&pair).map(|entry| entry.value().clone())
    }

    pub fn get_pool_by_id(&self, pool_id: u64) -> Option<Arc<Pool>> {
        let index = usize::try_from(pool_id).ok()?;
        self.ordered.read().get(index).cloned()
    }

    /// All pools in creation order
    ///
    /// Returns a fresh copy each call, so iteration can restart at will and
    /// never observes pools created afterwards.
    pub fn list_pools(&self) -> Vec<Arc<Pool>> {
        self.ordered.read().clone()
    }

    /// Pools that trade `token`, in creation order
    pub fn pools_for_token(&self, token: Address) -> Vec<Arc<Pool>> {
        let pairs = match self.token_index.get(&token) {
            Some(pairs) => pairs.value().clone(),
            None => return Vec::new(),
        };
        let mut pools: Vec<Arc<Pool>> = pairs
            .iter()
            .filter_map(|pair| self.pools.get(pair).map(|entry| entry.value().clone()))
            .collect();
        pools.sort_by_key(|pool| pool.id());
        pools
    }

    /// Every non-empty position held by `account`
    pub fn positions(&self, account: Address) -> AmmResult<Vec<Position>> {
        let mut positions = Vec::new();
        for pool in self.list_pools() {
            if let Some(position) = pool.position(account)? {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    pub fn len(&self) -> usize {
        self.ordered.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a new pool to the ordered list and token index.
    ///
    /// Caller must hold the pair's index entry.
    fn insert_pool(&self, pair: PairKey) -> Arc<Pool> {
        let pool = {
            let mut ordered = self.ordered.write();
            let pool = Arc::new(Pool::new(ordered.len() as u64, pair, self.fee_bps));
            ordered.push(pool.clone());
            pool
        };

        self.token_index
            .entry(pair.token0)
            .or_default()
            .push(pair);
        self.token_index
            .entry(pair.token1)
            .or_default()
            .push(pair);

        info!(
            pool_id = pool.id(),
            token0 = %pair.token0,
            token1 = %pair.token1,
            fee_bps = self.fee_bps,
            "Created pool"
        );
        pool
    }
}
