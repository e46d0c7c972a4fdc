//! # Loot Tables
//!
//! What each monster kind may leave behind when slain.
//!
//! Entries are rolled in order and the first success is the drop, so a table
//! reads from rarest treasure down to the common fallbacks. Every kind can
//! also drop a town portal scroll.

use crate::config::TOWN_PORTAL;
use crate::{Item, LootDrop, LootTable, MonsterKind};

const TOWN_PORTAL_CHANCE: f64 = 0.15;

/// A scroll that returns the warrior to town.
pub fn town_portal() -> Item {
    Item::misc(TOWN_PORTAL, "Opens a portal back to town", 100)
}

fn item(item: Item, chance: f64) -> (LootDrop, f64) {
    (LootDrop::Item(item), chance)
}

fn gold(min: u32, max: u32, chance: f64) -> (LootDrop, f64) {
    (LootDrop::Gold { min, max }, chance)
}

/// Returns the loot table for a monster kind.
///
/// # Examples
///
/// ```
/// use cairn::generation::loot_table_for;
/// use cairn::MonsterKind;
///
/// let table = loot_table_for(MonsterKind::Leprechaun);
/// assert_eq!(table.entries.len(), 4);
/// ```
pub fn loot_table_for(kind: MonsterKind) -> LootTable {
    let mut entries = match kind {
        MonsterKind::Banshee => vec![
            item(Item::armor("Spectral Veil", 8), 0.3),
            item(Item::potion("Tear of Sorrow"), 0.6),
            gold(1, 5, 0.5),
        ],
        MonsterKind::Leprechaun => vec![
            item(Item::weapon("Lucky Shillelagh", 12), 0.4),
            gold(5, 15, 0.9),
            item(Item::misc("Four-Leaf Clover", "Brings good fortune", 50), 0.3),
        ],
        MonsterKind::Pooka => vec![
            item(Item::weapon("Twisted Horn", 15), 0.35),
            item(Item::armor("Shadow Pelt", 10), 0.3),
            item(Item::potion("Dark Berry"), 0.7),
            gold(2, 6, 0.5),
        ],
        MonsterKind::Selkie => vec![
            item(Item::armor("Seal Skin Cloak", 12), 0.4),
            item(Item::potion("Ocean Pearl"), 0.6),
            gold(2, 7, 0.5),
        ],
        MonsterKind::Dullahan => vec![
            item(Item::weapon("Headless Blade", 25), 0.4),
            item(Item::armor("Dark Rider's Mail", 15), 0.3),
            gold(5, 12, 0.6),
        ],
        MonsterKind::Changeling => vec![
            item(Item::weapon("Fae Dagger", 18), 0.35),
            item(Item::potion("Glamour Essence"), 0.65),
            gold(3, 8, 0.5),
        ],
        MonsterKind::Clurichaun => vec![
            item(Item::weapon("Drunken Bottle", 14), 0.4),
            item(Item::potion("Fine Whiskey"), 0.75),
            gold(4, 10, 0.65),
        ],
        MonsterKind::Merrow => vec![
            item(Item::armor("Coral Crown", 11), 0.35),
            item(Item::weapon("Trident Shard", 20), 0.3),
            item(Item::potion("Sea Kelp"), 0.7),
            gold(3, 9, 0.5),
        ],
        MonsterKind::FearGorta => vec![
            item(Item::potion("Blessed Bread"), 0.7),
            item(Item::armor("Tattered Robes", 6), 0.4),
            gold(1, 4, 0.4),
        ],
        MonsterKind::CatSi => vec![
            item(Item::weapon("Cat's Claw", 16), 0.4),
            item(Item::armor("Fur Mantle", 9), 0.35),
            gold(2, 6, 0.5),
        ],
    };
    entries.push(item(town_portal(), TOWN_PORTAL_CHANCE));
    LootTable::new(entries)
}
