/// Asset balances held outside the pools
///
/// Pools only ever see assets through [`AssetTransfer`]: they read their own
/// balance and move funds out. [`AssetBook`] is the in-memory implementation
/// the runtime uses for every asset.
use std::collections::HashMap;

use exchange_math::{safe_add_u128, safe_sub_u128};
use exchange_types::{Address, AssetId, ExchangeError, ExchangeResult};
use tracing::trace;

use crate::journal::Journal;

/// Collaborator interface for fungible assets
pub trait AssetTransfer {
    /// Balance of `holder` in `asset`
    fn balance_of(&self, asset: AssetId, holder: Address) -> u128;

    /// Move `amount` of `asset` from `from` to `to`
    fn transfer(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u128,
    ) -> ExchangeResult<()>;
}

/// Entry of the balance table, as recorded by the undo journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BookEntry {
    Balance(AssetId, Address),
    Supply(AssetId),
}

/// Multi-asset balance table
#[derive(Debug, Clone, Default)]
pub struct AssetBook {
    balances: HashMap<(AssetId, Address), u128>,
    supplies: HashMap<AssetId, u128>,
    /// Entries overwritten inside open atomic frames, `None` if absent
    journal: Journal<BookEntry, Option<u128>>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `asset` out of nothing and credit it to `to`
    pub fn mint(&mut self, asset: AssetId, to: Address, amount: u128) -> ExchangeResult<()> {
        if asset.is_zero() {
            return Err(ExchangeError::ZeroAsset);
        }
        if to.is_zero() {
            return Err(ExchangeError::InvalidRecipient);
        }

        let supply = safe_add_u128(self.total_supply(asset), amount)?;
        // Individual balances are bounded by the supply
        let balance = self.balance_of(asset, to) + amount;

        self.write(BookEntry::Supply(asset), supply);
        self.write(BookEntry::Balance(asset, to), balance);
        trace!(%asset, %to, amount, "asset minted");
        Ok(())
    }

    /// Total amount of `asset` ever minted
    pub fn total_supply(&self, asset: AssetId) -> u128 {
        self.supplies.get(&asset).copied().unwrap_or(0)
    }

    fn write(&mut self, entry: BookEntry, value: u128) {
        let original = match entry {
            BookEntry::Balance(asset, holder) => self.balances.insert((asset, holder), value),
            BookEntry::Supply(asset) => self.supplies.insert(asset, value),
        };
        self.journal.record(entry, || original);
    }

    // ========================================================================
    // Atomic Frames
    // ========================================================================

    pub(crate) fn begin(&mut self) {
        self.journal.begin();
    }

    pub(crate) fn commit(&mut self) {
        self.journal.commit();
    }

    /// Undo every write made since the matching `begin`
    pub(crate) fn rollback(&mut self) {
        for (entry, original) in self.journal.rollback() {
            match (entry, original) {
                (BookEntry::Balance(asset, holder), Some(value)) => {
                    self.balances.insert((asset, holder), value);
                }
                (BookEntry::Balance(asset, holder), None) => {
                    self.balances.remove(&(asset, holder));
                }
                (BookEntry::Supply(asset), Some(value)) => {
                    self.supplies.insert(asset, value);
                }
                (BookEntry::Supply(asset), None) => {
                    self.supplies.remove(&asset);
                }
            }
        }
    }
}

impl AssetTransfer for AssetBook {
    fn balance_of(&self, asset: AssetId, holder: Address) -> u128 {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u128,
    ) -> ExchangeResult<()> {
        if to.is_zero() {
            return Err(ExchangeError::InvalidRecipient);
        }

        let from_balance = safe_sub_u128(self.balance_of(asset, from), amount)
            .map_err(|_| ExchangeError::InsufficientBalance)?;
        self.write(BookEntry::Balance(asset, from), from_balance);

        let to_balance = self.balance_of(asset, to) + amount;
        self.write(BookEntry::Balance(asset, to), to_balance);

        trace!(%asset, %from, %to, amount, "asset transferred");
        Ok(())
    }
}
