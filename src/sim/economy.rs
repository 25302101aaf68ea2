//! Dual-currency ledger
//!
//! Balances never go negative: an overspend is refused and leaves the balance
//! untouched. Every successful mutation is written through to the store and
//! announced to the notifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{Notification, Notifier};
use crate::persistence::{COIN_COUNT_KEY, GEMS_COUNT_KEY, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Coins,
    Gems,
}

impl Currency {
    pub fn storage_key(self) -> &'static str {
        match self {
            Currency::Coins => COIN_COUNT_KEY,
            Currency::Gems => GEMS_COUNT_KEY,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Coins => write!(f, "coins"),
            Currency::Gems => write!(f, "gems"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyLedger {
    coins: u32,
    gems: u32,
}

impl EconomyLedger {
    /// Restore balances from the store (missing keys read as zero)
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let ledger = Self {
            coins: store.get(COIN_COUNT_KEY, 0),
            gems: store.get(GEMS_COUNT_KEY, 0),
        };
        log::info!(
            "Ledger loaded: {} coins, {} gems",
            ledger.coins,
            ledger.gems
        );
        ledger
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn gems(&self) -> u32 {
        self.gems
    }

    pub fn balance(&self, currency: Currency) -> u32 {
        match currency {
            Currency::Coins => self.coins,
            Currency::Gems => self.gems,
        }
    }

    pub fn can_afford(&self, currency: Currency, amount: u32) -> bool {
        self.balance(currency) >= amount
    }

    /// Credit `amount`; zero is a no-op
    pub fn add<S, N>(&mut self, currency: Currency, amount: u32, store: &mut S, ui: &mut N)
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        if amount == 0 {
            return;
        }
        let slot = self.slot_mut(currency);
        *slot = slot.saturating_add(amount);
        self.commit(currency, store, ui);
    }

    /// Debit `amount` if the balance covers it; returns whether it did
    pub fn spend<S, N>(&mut self, currency: Currency, amount: u32, store: &mut S, ui: &mut N) -> bool
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        if !self.can_afford(currency, amount) {
            log::debug!(
                "Refused spend of {} {} (balance {})",
                amount,
                currency,
                self.balance(currency)
            );
            return false;
        }
        if amount == 0 {
            return true;
        }
        *self.slot_mut(currency) -= amount;
        self.commit(currency, store, ui);
        true
    }

    pub fn add_coins<S, N>(&mut self, amount: u32, store: &mut S, ui: &mut N)
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        self.add(Currency::Coins, amount, store, ui);
    }

    pub fn spend_coins<S, N>(&mut self, amount: u32, store: &mut S, ui: &mut N) -> bool
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        self.spend(Currency::Coins, amount, store, ui)
    }

    pub fn add_gems<S, N>(&mut self, amount: u32, store: &mut S, ui: &mut N)
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        self.add(Currency::Gems, amount, store, ui);
    }

    pub fn spend_gems<S, N>(&mut self, amount: u32, store: &mut S, ui: &mut N) -> bool
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        self.spend(Currency::Gems, amount, store, ui)
    }

    fn slot_mut(&mut self, currency: Currency) -> &mut u32 {
        match currency {
            Currency::Coins => &mut self.coins,
            Currency::Gems => &mut self.gems,
        }
    }

    fn commit<S, N>(&self, currency: Currency, store: &mut S, ui: &mut N)
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let balance = self.balance(currency);
        store.set(currency.storage_key(), balance);
        ui.notify(Notification::BalanceChanged { currency, balance });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_overspend_refused() {
        let mut store = MemoryStore::new().with(COIN_COUNT_KEY, 100);
        let mut ui: Vec<Notification> = Vec::new();
        let mut ledger = EconomyLedger::load(&store);

        assert!(!ledger.spend_coins(150, &mut store, &mut ui));
        assert_eq!(ledger.coins(), 100);
        assert!(ui.is_empty());

        assert!(ledger.spend_coins(60, &mut store, &mut ui));
        assert_eq!(ledger.coins(), 40);
        assert_eq!(store.get(COIN_COUNT_KEY, 0), 40);
    }

    #[test]
    fn test_mutations_persist_and_notify() {
        let mut store = MemoryStore::new();
        let mut ui: Vec<Notification> = Vec::new();
        let mut ledger = EconomyLedger::load(&store);

        ledger.add_gems(12, &mut store, &mut ui);
        assert_eq!(store.get(GEMS_COUNT_KEY, 0), 12);
        assert_eq!(
            ui,
            vec![Notification::BalanceChanged {
                currency: Currency::Gems,
                balance: 12
            }]
        );

        // Reload restores the persisted balance
        let reloaded = EconomyLedger::load(&store);
        assert_eq!(reloaded.gems(), 12);
        assert_eq!(reloaded.coins(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(Currency, u32),
        Spend(Currency, u32),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let currency = prop_oneof![Just(Currency::Coins), Just(Currency::Gems)];
        (currency, 0u32..500, any::<bool>()).prop_map(|(c, n, add)| {
            if add { Op::Add(c, n) } else { Op::Spend(c, n) }
        })
    }

    proptest! {
        #[test]
        fn prop_spend_never_overdraws(ops in proptest::collection::vec(arb_op(), 0..64)) {
            let mut store = MemoryStore::new();
            let mut ui: Vec<Notification> = Vec::new();
            let mut ledger = EconomyLedger::default();

            for op in ops {
                match op {
                    Op::Add(c, n) => ledger.add(c, n, &mut store, &mut ui),
                    Op::Spend(c, n) => {
                        let before = ledger.balance(c);
                        let ok = ledger.spend(c, n, &mut store, &mut ui);
                        if n > before {
                            prop_assert!(!ok);
                            prop_assert_eq!(ledger.balance(c), before);
                        } else {
                            prop_assert!(ok);
                            prop_assert_eq!(ledger.balance(c), before - n);
                        }
                    }
                }
                prop_assert_eq!(store.get(COIN_COUNT_KEY, 0), ledger.coins());
                prop_assert_eq!(store.get(GEMS_COUNT_KEY, 0), ledger.gems());
            }
        }
    }
}
