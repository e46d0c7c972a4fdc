//! # Items and Inventory
//!
//! Item templates, items lying on the map, the warrior's inventory, and the
//! loot tables rolled when a monster dies.

use crate::config::{BACKPACK_SLOTS, HEALTH_POTION_RESTORE};
use crate::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Broad item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Weapon,
    Armor,
    Consumable,
    Misc,
    /// Coins; picked up straight into the purse
    Gold,
}

/// An immutable item template.
///
/// # Examples
///
/// ```
/// use cairn::{Item, ItemCategory};
///
/// let blade = Item::weapon("Headless Blade", 25);
/// assert_eq!(blade.category, ItemCategory::Weapon);
/// assert_eq!(blade.gold_value, 250);
/// assert_eq!(blade.sell_price, 125);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub category: ItemCategory,
    pub description: String,
    pub attack_bonus: u32,
    pub defense_bonus: u32,
    /// Health restored when consumed
    pub health_restore: u32,
    /// Buy price, or the amount for gold
    pub gold_value: u32,
    pub sell_price: u32,
}

impl Item {
    /// Creates an item with no bonuses; sell price is half the buy price.
    pub fn new(
        name: impl Into<String>,
        category: ItemCategory,
        description: impl Into<String>,
        gold_value: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            attack_bonus: 0,
            defense_bonus: 0,
            health_restore: 0,
            gold_value,
            sell_price: gold_value / 2,
        }
    }

    /// A weapon worth 10 gold per attack point.
    pub fn weapon(name: impl Into<String>, attack_bonus: u32) -> Self {
        let mut item = Self::new(
            name,
            ItemCategory::Weapon,
            format!("Deals {} extra damage", attack_bonus),
            attack_bonus * 10,
        );
        item.attack_bonus = attack_bonus;
        item
    }

    /// Armor worth 10 gold per defense point.
    pub fn armor(name: impl Into<String>, defense_bonus: u32) -> Self {
        let mut item = Self::new(
            name,
            ItemCategory::Armor,
            format!("+{} defense", defense_bonus),
            defense_bonus * 10,
        );
        item.defense_bonus = defense_bonus;
        item
    }

    /// A standard restorative consumable.
    pub fn potion(name: impl Into<String>) -> Self {
        let mut item = Self::new(
            name,
            ItemCategory::Consumable,
            format!("Restores {} health", HEALTH_POTION_RESTORE),
            30,
        );
        item.health_restore = HEALTH_POTION_RESTORE;
        item
    }

    /// A trinket with no combat use.
    pub fn misc(name: impl Into<String>, description: impl Into<String>, gold_value: u32) -> Self {
        Self::new(name, ItemCategory::Misc, description, gold_value)
    }

    /// A pile of coins.
    pub fn gold(amount: u32) -> Self {
        Self::new(
            format!("{} Gold", amount),
            ItemCategory::Gold,
            format!("{} pieces of gold", amount),
            amount,
        )
    }

    /// Whether using the item restores health.
    pub fn is_restorative(&self) -> bool {
        self.category == ItemCategory::Consumable && self.health_restore > 0
    }
}

/// An item placed on a specific tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItem {
    pub item: Item,
    pub position: Position,
}

impl GroundItem {
    /// Places an item on a tile.
    pub fn new(item: Item, position: Position) -> Self {
        Self { item, position }
    }
}

/// Equipment slots plus a fixed-size backpack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub backpack: Vec<Option<Item>>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self {
            weapon: None,
            armor: None,
            backpack: vec![None; BACKPACK_SLOTS],
        }
    }

    /// Stores an item, preferring an empty matching equipment slot.
    ///
    /// Returns the item back when there is no room for it.
    pub fn add_item(&mut self, item: Item) -> Result<(), Item> {
        match item.category {
            ItemCategory::Weapon if self.weapon.is_none() => {
                self.weapon = Some(item);
                return Ok(());
            }
            ItemCategory::Armor if self.armor.is_none() => {
                self.armor = Some(item);
                return Ok(());
            }
            _ => {}
        }

        match self.backpack.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(item);
                Ok(())
            }
            None => Err(item),
        }
    }

    /// Swaps a backpack weapon or armor into its equipment slot.
    pub fn equip_from_backpack(&mut self, index: usize) -> bool {
        let Some(slot) = self.backpack.get_mut(index) else {
            return false;
        };
        let equipment = match slot.as_ref().map(|item| item.category) {
            Some(ItemCategory::Weapon) => &mut self.weapon,
            Some(ItemCategory::Armor) => &mut self.armor,
            _ => return false,
        };
        std::mem::swap(slot, equipment);
        true
    }

    /// Removes and returns the first restorative consumable in the backpack.
    pub fn take_first_restorative(&mut self) -> Option<Item> {
        self.backpack
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(Item::is_restorative))
            .and_then(Option::take)
    }

    /// Number of restorative consumables carried.
    pub fn count_restoratives(&self) -> usize {
        self.backpack
            .iter()
            .flatten()
            .filter(|item| item.is_restorative())
            .count()
    }

    /// Removes and returns the first backpack item with the given name.
    pub fn take_named(&mut self, name: &str) -> Option<Item> {
        self.backpack
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|item| item.name == name))
            .and_then(Option::take)
    }

    /// Number of backpack items with the given name.
    pub fn count_named(&self, name: &str) -> usize {
        self.backpack
            .iter()
            .flatten()
            .filter(|item| item.name == name)
            .count()
    }

    /// Sum of attack bonuses on equipped items.
    pub fn total_attack_bonus(&self) -> u32 {
        self.equipped().map(|item| item.attack_bonus).sum()
    }

    /// Sum of defense bonuses on equipped items.
    pub fn total_defense_bonus(&self) -> u32 {
        self.equipped().map(|item| item.defense_bonus).sum()
    }

    /// Whether a free backpack slot exists.
    pub fn has_space(&self) -> bool {
        self.backpack.iter().any(Option::is_none)
    }

    fn equipped(&self) -> impl Iterator<Item = &Item> {
        self.weapon.iter().chain(self.armor.iter())
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// One possible drop in a loot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootDrop {
    /// A fixed item
    Item(Item),
    /// Gold with an amount rolled from an inclusive range
    Gold { min: u32, max: u32 },
}

/// Ordered drop chances; the first successful roll wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub entries: Vec<(LootDrop, f64)>,
}

impl LootTable {
    /// Creates a table from `(drop, chance)` pairs with chances in `0.0..=1.0`.
    pub fn new(entries: Vec<(LootDrop, f64)>) -> Self {
        Self { entries }
    }

    /// Rolls each entry in order and returns the first drop that succeeds.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Item> {
        for (drop, chance) in &self.entries {
            if rng.gen::<f64>() < *chance {
                return Some(match drop {
                    LootDrop::Item(item) => item.clone(),
                    LootDrop::Gold { min, max } => Item::gold(rng.gen_range(*min..=*max)),
                });
            }
        }
        None
    }
}
