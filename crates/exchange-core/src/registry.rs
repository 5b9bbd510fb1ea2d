//! Pool registry
//!
//! The registry creates at most one pool per unordered asset pair and keeps
//! the protocol fee settings. A pool's address is derived from the registry
//! address and the sorted pair, so anyone can compute it without a lookup:
//!
//! ```text
//! pool = keccak256(0xff ‖ registry ‖ keccak256(asset0 ‖ asset1))[12..]
//! ```

use std::collections::HashMap;

use exchange_types::{Address, AssetId, ExchangeError, ExchangeResult, POOL_ADDRESS_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ClaimTokenConfig;
use crate::events::{Event, EventLog};
use crate::journal::Journal;
use crate::ledger::permit::keccak256;
use crate::ledger::ClaimLedger;
use crate::pool::Pool;

/// Registry administration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity allowed to change these settings
    pub administrator: Address,
    /// Receiver of protocol fee claims. The null address turns the fee off.
    pub fee_recipient: Address,
}

impl RegistryConfig {
    pub fn fee_enabled(&self) -> bool {
        !self.fee_recipient.is_zero()
    }
}

#[derive(Debug, Clone)]
pub struct PoolRegistry {
    address: Address,
    config: RegistryConfig,
    claim_token: ClaimTokenConfig,
    /// Pools in creation order
    pools: Vec<Pool>,
    by_pair: HashMap<(AssetId, AssetId), usize>,
    by_address: HashMap<Address, usize>,
    /// Pools as they were before their first mutation in an open atomic frame
    journal: Journal<Address, Pool>,
    /// Pool count and settings when each open frame began
    marks: Vec<RegistryMark>,
}

#[derive(Debug, Clone)]
struct RegistryMark {
    pool_count: usize,
    config: RegistryConfig,
}

/// Sort two assets into pool order, rejecting degenerate pairs
pub fn sort_assets(asset_a: AssetId, asset_b: AssetId) -> ExchangeResult<(AssetId, AssetId)> {
    if asset_a == asset_b {
        return Err(ExchangeError::IdenticalAssets);
    }
    let (asset0, asset1) = if asset_a < asset_b {
        (asset_a, asset_b)
    } else {
        (asset_b, asset_a)
    };
    if asset0.is_zero() {
        return Err(ExchangeError::ZeroAsset);
    }
    Ok((asset0, asset1))
}

/// Address of the pool for a sorted pair under `registry`
pub fn pool_address(registry: Address, asset0: AssetId, asset1: AssetId) -> Address {
    let mut pair = [0u8; 2 * Address::LEN];
    pair[..Address::LEN].copy_from_slice(asset0.as_bytes());
    pair[Address::LEN..].copy_from_slice(asset1.as_bytes());
    let salt = keccak256(&pair);

    let mut preimage = Vec::with_capacity(1 + Address::LEN + 32);
    preimage.push(POOL_ADDRESS_PREFIX);
    preimage.extend_from_slice(registry.as_bytes());
    preimage.extend_from_slice(&salt);
    Address::from_hash(&keccak256(&preimage))
}

impl PoolRegistry {
    pub fn new(address: Address, config: RegistryConfig, claim_token: ClaimTokenConfig) -> Self {
        Self {
            address,
            config,
            claim_token,
            pools: Vec::new(),
            by_pair: HashMap::new(),
            by_address: HashMap::new(),
            journal: Journal::default(),
            marks: Vec::new(),
        }
    }

    // ========================================================================
    // Pool Creation and Lookup
    // ========================================================================

    /// Create the pool for an unordered pair and return its address
    pub fn create_pool(
        &mut self,
        asset_a: AssetId,
        asset_b: AssetId,
        chain_id: u64,
        events: &mut EventLog,
    ) -> ExchangeResult<Address> {
        let (asset0, asset1) = sort_assets(asset_a, asset_b)?;
        if self.by_pair.contains_key(&(asset0, asset1)) {
            return Err(ExchangeError::PoolExists);
        }

        let address = pool_address(self.address, asset0, asset1);
        let ledger = ClaimLedger::new(address, &self.claim_token, chain_id);
        let index = self.pools.len();

        self.pools.push(Pool::new(address, asset0, asset1, ledger));
        self.by_pair.insert((asset0, asset1), index);
        self.by_address.insert(address, index);

        info!(%asset0, %asset1, pool = %address, index, "pool created");
        events.emit(Event::PoolCreated {
            asset0,
            asset1,
            pool: address,
            index: index as u64,
        });
        Ok(address)
    }

    /// Pool for an unordered pair, if one exists
    pub fn get_pool(&self, asset_a: AssetId, asset_b: AssetId) -> Option<Address> {
        let pair = if asset_a < asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };
        self.by_pair.get(&pair).map(|&index| self.pools[index].address())
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Address of the `index`-th pool created
    pub fn pool_at(&self, index: usize) -> Option<Address> {
        self.pools.get(index).map(Pool::address)
    }

    pub fn pool(&self, address: Address) -> ExchangeResult<&Pool> {
        self.by_address
            .get(&address)
            .map(|&index| &self.pools[index])
            .ok_or(ExchangeError::PoolNotFound(address))
    }

    /// Mutable access to a pool, journaled while an atomic frame is open
    pub(crate) fn pool_mut(&mut self, address: Address) -> ExchangeResult<&mut Pool> {
        let index = *self
            .by_address
            .get(&address)
            .ok_or(ExchangeError::PoolNotFound(address))?;
        let pool = &mut self.pools[index];
        self.journal.record(address, || pool.clone());
        Ok(pool)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.iter()
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn fee_recipient(&self) -> Address {
        self.config.fee_recipient
    }

    pub fn administrator(&self) -> Address {
        self.config.administrator
    }

    pub fn set_fee_recipient(
        &mut self,
        caller: Address,
        fee_recipient: Address,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        self.ensure_administrator(caller)?;
        let previous = std::mem::replace(&mut self.config.fee_recipient, fee_recipient);

        info!(%previous, current = %fee_recipient, "fee recipient changed");
        events.emit(Event::FeeRecipientChanged {
            previous,
            current: fee_recipient,
        });
        Ok(())
    }

    pub fn set_administrator(
        &mut self,
        caller: Address,
        administrator: Address,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        self.ensure_administrator(caller)?;
        let previous = std::mem::replace(&mut self.config.administrator, administrator);

        info!(%previous, current = %administrator, "administrator changed");
        events.emit(Event::AdministratorChanged {
            previous,
            current: administrator,
        });
        Ok(())
    }

    fn ensure_administrator(&self, caller: Address) -> ExchangeResult<()> {
        if caller != self.config.administrator {
            return Err(ExchangeError::Forbidden);
        }
        Ok(())
    }

    // ========================================================================
    // Atomic Frames
    // ========================================================================

    pub(crate) fn begin(&mut self) {
        self.journal.begin();
        self.marks.push(RegistryMark {
            pool_count: self.pools.len(),
            config: self.config.clone(),
        });
    }

    pub(crate) fn commit(&mut self) {
        self.journal.commit();
        self.marks.pop();
    }

    /// Drop pools created since the matching `begin` and restore the
    /// settings and every pool mutated since then
    pub(crate) fn rollback(&mut self) {
        let originals = self.journal.rollback();
        let Some(mark) = self.marks.pop() else {
            return;
        };

        for pool in self.pools.drain(mark.pool_count..) {
            self.by_pair.remove(&pool.assets());
            self.by_address.remove(&pool.address());
        }
        self.config = mark.config;

        for (address, original) in originals {
            // Pools created inside the frame are already gone
            if let Some(&index) = self.by_address.get(&address) {
                self.pools[index] = original;
            }
        }
    }
}
