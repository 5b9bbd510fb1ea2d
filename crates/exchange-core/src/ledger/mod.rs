//! Claim token ledger
//!
//! Each pool embeds one ledger recording who owns how much of the pool. Holders
//! move claims with `transfer`, delegate with `approve` / `transfer_from`, or
//! delegate by signature with `authorize`. Only the owning pool mints and burns.
//!
//! Every operation validates before it writes, so a failed call changes nothing.

pub mod permit;

use std::collections::HashMap;

use exchange_math::{safe_add_u128, safe_sub_u128};
use exchange_types::{Address, ExchangeError, ExchangeResult, UNLIMITED_ALLOWANCE};
use tracing::{debug, warn};

use crate::config::ClaimTokenConfig;
use crate::events::{Event, EventLog};
use permit::{domain_separator, permit_digest, PermitSignature};

#[derive(Debug, Clone)]
pub struct ClaimLedger {
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    domain_separator: [u8; 32],
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    nonces: HashMap<Address, u64>,
}

impl ClaimLedger {
    /// Empty ledger at `address`, with its permit domain fixed for `chain_id`
    pub fn new(address: Address, metadata: &ClaimTokenConfig, chain_id: u64) -> Self {
        Self {
            address,
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            decimals: metadata.decimals,
            domain_separator: domain_separator(
                &metadata.name,
                &metadata.version,
                chain_id,
                address,
            ),
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            nonces: HashMap::new(),
        }
    }

    // ========================================================================
    // Read Surface
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn domain_separator(&self) -> [u8; 32] {
        self.domain_separator
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: Address) -> u128 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Nonce the next permit from `owner` must be signed with
    pub fn current_nonce(&self, owner: Address) -> u64 {
        self.nonces.get(&owner).copied().unwrap_or(0)
    }

    /// Sum of all balances. Equal to `total_supply` at every step.
    pub fn balance_sum(&self) -> u128 {
        self.balances.values().sum()
    }

    // ========================================================================
    // Holder Operations
    // ========================================================================

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        if to.is_zero() {
            return Err(ExchangeError::InvalidRecipient);
        }
        let from_balance = safe_sub_u128(self.balance_of(from), amount)
            .map_err(|_| ExchangeError::InsufficientBalance)?;

        self.balances.insert(from, from_balance);
        // Cannot overflow: balances sum to the supply
        *self.balances.entry(to).or_insert(0) += amount;

        events.emit(Event::Transfer {
            ledger: self.address,
            from,
            to,
            amount,
        });
        Ok(())
    }

    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        self.allowances.insert((owner, spender), amount);
        events.emit(Event::Approval {
            ledger: self.address,
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    /// Spend `spender`'s allowance from `from` to move `amount` to `to`
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        let allowance = self.allowance(from, spender);
        let remaining = if allowance == UNLIMITED_ALLOWANCE {
            allowance
        } else {
            safe_sub_u128(allowance, amount).map_err(|_| ExchangeError::InsufficientAllowance)?
        };

        // Validate the transfer before touching the allowance
        if to.is_zero() {
            return Err(ExchangeError::InvalidRecipient);
        }
        if self.balance_of(from) < amount {
            return Err(ExchangeError::InsufficientBalance);
        }

        self.allowances.insert((from, spender), remaining);
        self.transfer(from, to, amount, events)
    }

    /// Approve `spender` on behalf of `owner` using an off-line signature
    ///
    /// Fails `Expired` once `now` passes `deadline`, whatever the signature.
    /// A signature is valid for exactly one nonce, so it cannot be replayed.
    #[allow(clippy::too_many_arguments)]
    pub fn authorize(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u128,
        deadline: u64,
        signature: &PermitSignature,
        now: u64,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        if now > deadline {
            return Err(ExchangeError::Expired);
        }

        let nonce = self.current_nonce(owner);
        let digest = permit_digest(&self.domain_separator, owner, spender, amount, nonce, deadline);
        match signature.recover(&digest) {
            Some(signer) if signer == owner && !signer.is_zero() => {}
            _ => {
                warn!(ledger = %self.address, %owner, nonce, "permit signature rejected");
                return Err(ExchangeError::InvalidSignature);
            }
        }

        self.nonces.insert(owner, nonce + 1);
        debug!(ledger = %self.address, %owner, %spender, amount, nonce, "permit accepted");
        self.approve(owner, spender, amount, events)
    }

    // ========================================================================
    // Pool Operations
    // ========================================================================

    pub(crate) fn mint(
        &mut self,
        to: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        self.total_supply = safe_add_u128(self.total_supply, amount)?;
        *self.balances.entry(to).or_insert(0) += amount;
        events.emit(Event::Transfer {
            ledger: self.address,
            from: Address::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    pub(crate) fn burn(
        &mut self,
        from: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        let balance = safe_sub_u128(self.balance_of(from), amount)
            .map_err(|_| ExchangeError::InsufficientBalance)?;
        self.balances.insert(from, balance);
        self.total_supply -= amount;
        events.emit(Event::Transfer {
            ledger: self.address,
            from,
            to: Address::ZERO,
            amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use permit::{sign_permit, signer_address};

    const LEDGER: Address = Address::from_low_u64(0x100);
    const ALICE: Address = Address::from_low_u64(0x1);
    const BOB: Address = Address::from_low_u64(0x2);
    const CAROL: Address = Address::from_low_u64(0x3);

    fn funded_ledger(events: &mut EventLog) -> ClaimLedger {
        let mut ledger = ClaimLedger::new(LEDGER, &ClaimTokenConfig::default(), 1);
        ledger.mint(ALICE, 1_000, events).unwrap();
        ledger
    }

    #[test]
    fn test_metadata() {
        let ledger = ClaimLedger::new(LEDGER, &ClaimTokenConfig::default(), 1);
        assert_eq!(ledger.name(), "Exchange LP Token");
        assert_eq!(ledger.symbol(), "EX-LP");
        assert_eq!(ledger.decimals(), 18);
        assert_eq!(ledger.address(), LEDGER);
        assert_eq!(
            ledger.domain_separator(),
            domain_separator("Exchange LP Token", "1", 1, LEDGER)
        );
    }

    #[test]
    fn test_transfer() {
        let mut events = EventLog::new();
        let mut ledger = funded_ledger(&mut events);

        ledger.transfer(ALICE, BOB, 300, &mut events).unwrap();
        assert_eq!(ledger.balance_of(ALICE), 700);
        assert_eq!(ledger.balance_of(BOB), 300);
        assert_eq!(ledger.balance_sum(), ledger.total_supply());

        assert_eq!(
            ledger.transfer(BOB, CAROL, 301, &mut events),
            Err(ExchangeError::InsufficientBalance)
        );
        assert_eq!(
            ledger.transfer(ALICE, Address::ZERO, 1, &mut events),
            Err(ExchangeError::InvalidRecipient)
        );
        assert_eq!(
            events.as_slice().last(),
            Some(&Event::Transfer { ledger: LEDGER, from: ALICE, to: BOB, amount: 300 })
        );
    }

    #[test]
    fn test_transfer_from_decrements_allowance() {
        let mut events = EventLog::new();
        let mut ledger = funded_ledger(&mut events);

        ledger.approve(ALICE, BOB, 500, &mut events).unwrap();
        ledger.transfer_from(BOB, ALICE, CAROL, 200, &mut events).unwrap();
        assert_eq!(ledger.allowance(ALICE, BOB), 300);
        assert_eq!(ledger.balance_of(CAROL), 200);

        assert_eq!(
            ledger.transfer_from(BOB, ALICE, CAROL, 301, &mut events),
            Err(ExchangeError::InsufficientAllowance)
        );
        assert_eq!(ledger.allowance(ALICE, BOB), 300);
    }

    #[test]
    fn test_unlimited_allowance_is_not_spent() {
        let mut events = EventLog::new();
        let mut ledger = funded_ledger(&mut events);

        ledger.approve(ALICE, BOB, UNLIMITED_ALLOWANCE, &mut events).unwrap();
        ledger.transfer_from(BOB, ALICE, CAROL, 1_000, &mut events).unwrap();
        assert_eq!(ledger.allowance(ALICE, BOB), UNLIMITED_ALLOWANCE);
    }

    #[test]
    fn test_failed_transfer_from_keeps_allowance() {
        let mut events = EventLog::new();
        let mut ledger = funded_ledger(&mut events);

        ledger.approve(ALICE, BOB, 5_000, &mut events).unwrap();
        assert_eq!(
            ledger.transfer_from(BOB, ALICE, CAROL, 2_000, &mut events),
            Err(ExchangeError::InsufficientBalance)
        );
        assert_eq!(ledger.allowance(ALICE, BOB), 5_000);
    }

    #[test]
    fn test_burn() {
        let mut events = EventLog::new();
        let mut ledger = funded_ledger(&mut events);

        ledger.burn(ALICE, 400, &mut events).unwrap();
        assert_eq!(ledger.total_supply(), 600);
        assert_eq!(
            ledger.burn(ALICE, 601, &mut events),
            Err(ExchangeError::InsufficientBalance)
        );
        assert_eq!(ledger.balance_sum(), ledger.total_supply());
    }

    #[test]
    fn test_authorize() {
        let mut events = EventLog::new();
        let mut ledger = ClaimLedger::new(LEDGER, &ClaimTokenConfig::default(), 1);
        let key = SigningKey::from_bytes(&[42u8; 32]);
        let owner = signer_address(&key.verifying_key());
        let domain = ledger.domain_separator();

        let signature = sign_permit(&key, &domain, BOB, 77, 0, 100);
        ledger.authorize(owner, BOB, 77, 100, &signature, 100, &mut events).unwrap();
        assert_eq!(ledger.allowance(owner, BOB), 77);
        assert_eq!(ledger.current_nonce(owner), 1);

        // Replay: the nonce has moved on
        assert_eq!(
            ledger.authorize(owner, BOB, 77, 100, &signature, 100, &mut events),
            Err(ExchangeError::InvalidSignature)
        );

        // Signed for someone else
        let signature = sign_permit(&key, &domain, BOB, 77, 1, 100);
        assert_eq!(
            ledger.authorize(ALICE, BOB, 77, 100, &signature, 100, &mut events),
            Err(ExchangeError::InvalidSignature)
        );

        // Past the deadline
        assert_eq!(
            ledger.authorize(owner, BOB, 77, 100, &signature, 101, &mut events),
            Err(ExchangeError::Expired)
        );
        assert_eq!(ledger.current_nonce(owner), 1);
    }
}
