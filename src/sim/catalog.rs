//! Terrain and player catalogs
//!
//! Each catalog has a browse cursor (what the shop is showing) and a selection
//! (what the next session uses). Purchases go through the ledger; a failed
//! purchase leaves both the catalog and the balances untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::economy::{Currency, EconomyLedger};
use super::state::{Notification, Notifier};
use crate::consts::*;
use crate::error::SelectionError;
use crate::persistence::KeyValueStore;
use crate::platform::TemplateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: u32,
    pub currency: Currency,
}

impl Price {
    pub fn coins(amount: u32) -> Self {
        Self {
            amount,
            currency: Currency::Coins,
        }
    }

    pub fn gems(amount: u32) -> Self {
        Self {
            amount,
            currency: Currency::Gems,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainEntry {
    pub name: String,
    pub template: TemplateId,
    /// Coin price
    pub price: u32,
    pub locked: bool,
}

/// Base gameplay stats of a player model plus its upgrade prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub move_speed: f32,
    pub max_speed: f32,
    pub rotate_speed: f32,
    pub max_health: u32,
    pub speed_upgrade_price: u32,
    pub rotation_upgrade_price: u32,
    pub health_upgrade_price: u32,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            max_speed: 10.0,
            rotate_speed: 5.0,
            max_health: 5,
            speed_upgrade_price: 100,
            rotation_upgrade_price: 150,
            health_upgrade_price: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    Speed,
    Rotation,
    Health,
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upgrade::Speed => write!(f, "speed"),
            Upgrade::Rotation => write!(f, "rotation"),
            Upgrade::Health => write!(f, "health"),
        }
    }
}

impl PlayerProfile {
    pub fn upgrade_price(&self, upgrade: Upgrade) -> u32 {
        match upgrade {
            Upgrade::Speed => self.speed_upgrade_price,
            Upgrade::Rotation => self.rotation_upgrade_price,
            Upgrade::Health => self.health_upgrade_price,
        }
    }

    pub fn can_upgrade(&self, upgrade: Upgrade) -> bool {
        match upgrade {
            Upgrade::Speed => self.move_speed < self.max_speed,
            Upgrade::Rotation => self.rotate_speed < ROTATION_UPGRADE_CAP,
            Upgrade::Health => self.max_health < HEALTH_UPGRADE_CAP,
        }
    }

    /// Apply one step and raise its price; false at the cap
    fn apply_upgrade(&mut self, upgrade: Upgrade) -> bool {
        if !self.can_upgrade(upgrade) {
            return false;
        }
        match upgrade {
            Upgrade::Speed => {
                self.move_speed += SPEED_UPGRADE_STEP;
                self.max_speed += SPEED_UPGRADE_STEP;
                self.speed_upgrade_price += UPGRADE_PRICE_STEP;
            }
            Upgrade::Rotation => {
                self.rotate_speed += ROTATION_UPGRADE_STEP;
                self.rotation_upgrade_price += UPGRADE_PRICE_STEP;
            }
            Upgrade::Health => {
                self.max_health += 1;
                self.health_upgrade_price += UPGRADE_PRICE_STEP;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    pub template: TemplateId,
    pub price: Price,
    /// Unlock level a terrain purchase must have reached before buying
    #[serde(default)]
    pub required_level: u32,
    pub locked: bool,
    #[serde(default)]
    pub profile: PlayerProfile,
}

fn wrap_next(index: usize, len: usize) -> usize {
    (index + 1) % len
}

fn wrap_previous(index: usize, len: usize) -> usize {
    (index + len - 1) % len
}

/// Charge `price` or report exactly why not
fn charge<S, N>(
    price: Price,
    ledger: &mut EconomyLedger,
    store: &mut S,
    ui: &mut N,
) -> Result<(), SelectionError>
where
    S: KeyValueStore + ?Sized,
    N: Notifier + ?Sized,
{
    if ledger.spend(price.currency, price.amount, store, ui) {
        Ok(())
    } else {
        Err(SelectionError::InsufficientFunds {
            currency: price.currency,
            required: price.amount,
            available: ledger.balance(price.currency),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TerrainCatalog {
    entries: Vec<TerrainEntry>,
    browse: usize,
    selected: Option<usize>,
}

impl TerrainCatalog {
    pub fn new(entries: Vec<TerrainEntry>, default_index: usize) -> Self {
        let selected = (default_index < entries.len()).then_some(default_index);
        if selected.is_none() && !entries.is_empty() {
            log::warn!(
                "Default terrain {} out of range ({} terrains)",
                default_index,
                entries.len()
            );
        }
        Self {
            entries,
            browse: selected.unwrap_or(0),
            selected,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TerrainEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TerrainEntry> {
        self.entries.get(index)
    }

    pub fn browse_index(&self) -> usize {
        self.browse
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&TerrainEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn next(&mut self) -> Result<usize, SelectionError> {
        if self.entries.is_empty() {
            return Err(SelectionError::EmptyCatalog);
        }
        self.browse = wrap_next(self.browse, self.entries.len());
        Ok(self.browse)
    }

    pub fn previous(&mut self) -> Result<usize, SelectionError> {
        if self.entries.is_empty() {
            return Err(SelectionError::EmptyCatalog);
        }
        self.browse = wrap_previous(self.browse, self.entries.len());
        Ok(self.browse)
    }

    pub fn set_browse(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.entries.len() {
            return Err(SelectionError::InvalidIndex {
                index,
                len: self.entries.len(),
            });
        }
        self.browse = index;
        Ok(())
    }

    /// Buy the browsed terrain with coins; returns its index
    pub fn buy<S, N>(
        &mut self,
        ledger: &mut EconomyLedger,
        store: &mut S,
        ui: &mut N,
    ) -> Result<usize, SelectionError>
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let index = self.browse;
        let entry = self.entries.get(index).ok_or(SelectionError::EmptyCatalog)?;
        if !entry.locked {
            return Err(SelectionError::AlreadyUnlocked(index));
        }
        charge(Price::coins(entry.price), ledger, store, ui)?;

        self.entries[index].locked = false;
        log::info!("Terrain '{}' unlocked", self.entries[index].name);
        Ok(index)
    }

    /// Select the browsed terrain; Ok(true) if the selection changed
    pub fn select(&mut self) -> Result<bool, SelectionError> {
        let index = self.browse;
        let entry = self.entries.get(index).ok_or(SelectionError::EmptyCatalog)?;
        if entry.locked {
            return Err(SelectionError::Locked(index));
        }
        if self.selected == Some(index) {
            return Ok(false);
        }
        self.selected = Some(index);
        Ok(true)
    }

    /// Shop view of the browsed terrain
    pub fn view(&self, ledger: &EconomyLedger) -> Option<Notification> {
        let entry = self.entries.get(self.browse)?;
        Some(Notification::TerrainView {
            index: self.browse,
            name: entry.name.clone(),
            price: entry.price,
            locked: entry.locked,
            selected: self.selected == Some(self.browse),
            affordable: ledger.can_afford(Currency::Coins, entry.price),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlayerCatalog {
    entries: Vec<PlayerEntry>,
    browse: usize,
    selected: Option<usize>,
    unlock_level: u32,
}

impl PlayerCatalog {
    /// Starts with the first unlocked entry selected
    pub fn new(entries: Vec<PlayerEntry>, unlock_level: u32) -> Self {
        let selected = entries.iter().position(|e| !e.locked);
        Self {
            entries,
            browse: 0,
            selected,
            unlock_level,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlayerEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PlayerEntry> {
        self.entries.get(index)
    }

    pub fn browse_index(&self) -> usize {
        self.browse
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&PlayerEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn unlock_level(&self) -> u32 {
        self.unlock_level
    }

    /// Raise the unlock level (never lowers it)
    pub fn raise_unlock_level(&mut self, level: u32) {
        if level > self.unlock_level {
            log::info!("Player unlock level raised to {}", level);
            self.unlock_level = level;
        }
    }

    pub fn next(&mut self) -> Result<usize, SelectionError> {
        if self.entries.is_empty() {
            return Err(SelectionError::EmptyCatalog);
        }
        self.browse = wrap_next(self.browse, self.entries.len());
        Ok(self.browse)
    }

    pub fn previous(&mut self) -> Result<usize, SelectionError> {
        if self.entries.is_empty() {
            return Err(SelectionError::EmptyCatalog);
        }
        self.browse = wrap_previous(self.browse, self.entries.len());
        Ok(self.browse)
    }

    pub fn set_browse(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.entries.len() {
            return Err(SelectionError::InvalidIndex {
                index,
                len: self.entries.len(),
            });
        }
        self.browse = index;
        Ok(())
    }

    /// Buy the browsed player; returns its index
    pub fn buy<S, N>(
        &mut self,
        ledger: &mut EconomyLedger,
        store: &mut S,
        ui: &mut N,
    ) -> Result<usize, SelectionError>
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let index = self.browse;
        let entry = self.entries.get(index).ok_or(SelectionError::EmptyCatalog)?;
        if !entry.locked {
            return Err(SelectionError::AlreadyUnlocked(index));
        }
        if entry.required_level > self.unlock_level {
            return Err(SelectionError::LevelTooLow {
                required: entry.required_level,
                current: self.unlock_level,
            });
        }
        charge(entry.price, ledger, store, ui)?;

        self.entries[index].locked = false;
        log::info!("Player '{}' unlocked", self.entries[index].name);
        Ok(index)
    }

    pub fn select(&mut self) -> Result<usize, SelectionError> {
        let index = self.browse;
        self.set_selected(index)?;
        Ok(index)
    }

    /// Select by index directly
    pub fn set_selected(&mut self, index: usize) -> Result<(), SelectionError> {
        let entry = self.entries.get(index).ok_or(SelectionError::InvalidIndex {
            index,
            len: self.entries.len(),
        })?;
        if entry.locked {
            return Err(SelectionError::Locked(index));
        }
        self.selected = Some(index);
        log::debug!("Selected player {}", index);
        Ok(())
    }

    /// Upgrade the browsed player's profile with coins
    ///
    /// The cap is checked before charging, so a maxed stat never costs
    /// anything. Returns the price of the next step.
    pub fn upgrade<S, N>(
        &mut self,
        upgrade: Upgrade,
        ledger: &mut EconomyLedger,
        store: &mut S,
        ui: &mut N,
    ) -> Result<u32, SelectionError>
    where
        S: KeyValueStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let index = self.browse;
        let entry = self.entries.get(index).ok_or(SelectionError::EmptyCatalog)?;
        if entry.locked {
            return Err(SelectionError::Locked(index));
        }
        if !entry.profile.can_upgrade(upgrade) {
            return Err(SelectionError::UpgradeMaxed(upgrade));
        }
        charge(
            Price::coins(entry.profile.upgrade_price(upgrade)),
            ledger,
            store,
            ui,
        )?;

        let profile = &mut self.entries[index].profile;
        profile.apply_upgrade(upgrade);
        log::info!("Upgraded {} of player {}", upgrade, index);
        Ok(profile.upgrade_price(upgrade))
    }

    /// Shop view of the browsed player
    pub fn view(&self, ledger: &EconomyLedger) -> Option<Notification> {
        let entry = self.entries.get(self.browse)?;
        Some(Notification::PlayerView {
            index: self.browse,
            name: entry.name.clone(),
            price: entry.price.amount,
            currency: entry.price.currency,
            locked: entry.locked,
            selected: self.selected == Some(self.browse),
            level_unlocked: entry.required_level <= self.unlock_level,
            affordable: ledger.can_afford(entry.price.currency, entry.price.amount),
        })
    }
}
