//! Numeric game tables used by API payloads.
//!
//! The API reports races, classes, qualities and similar values as small
//! integers. Each table maps those ids to a typed value with its English
//! name.

use serde::Deserialize;
use std::fmt;

macro_rules! id_table {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty {
            $($variant:ident = $id:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub fn from_id(id: $repr) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn id(self) -> $repr {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// English name
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

id_table! {
    /// Playable races
    Race: u8 {
        Human = 1 => "human",
        Orc = 2 => "orc",
        Dwarf = 3 => "dwarf",
        NightElf = 4 => "night elf",
        Undead = 5 => "undead",
        Tauren = 6 => "tauren",
        Gnome = 7 => "gnome",
        Troll = 8 => "troll",
        Goblin = 9 => "goblin",
        BloodElf = 10 => "blood elf",
        Draenei = 11 => "draenei",
        Worgen = 22 => "worgen",
    }
}

id_table! {
    /// Playable classes
    Class: u8 {
        Warrior = 1 => "warrior",
        Paladin = 2 => "paladin",
        Hunter = 3 => "hunter",
        Rogue = 4 => "rogue",
        Priest = 5 => "priest",
        DeathKnight = 6 => "death knight",
        Shaman = 7 => "shaman",
        Mage = 8 => "mage",
        Warlock = 9 => "warlock",
        Druid = 11 => "druid",
    }
}

id_table! {
    Gender: u8 {
        Male = 0 => "male",
        Female = 1 => "female",
    }
}

id_table! {
    /// The side a character or guild plays for
    Faction: u8 {
        Alliance = 0 => "alliance",
        Horde = 1 => "horde",
    }
}

id_table! {
    ItemQuality: u8 {
        Poor = 0 => "poor",
        Common = 1 => "common",
        Uncommon = 2 => "uncommon",
        Rare = 3 => "rare",
        Epic = 4 => "epic",
        Legendary = 5 => "legendary",
        Artifact = 6 => "artifact",
        Heirloom = 7 => "heirloom",
    }
}

id_table! {
    /// Reputation standing with a faction
    Standing: u8 {
        Hated = 0 => "hated",
        Hostile = 1 => "hostile",
        Unfriendly = 2 => "unfriendly",
        Neutral = 3 => "neutral",
        Friendly = 4 => "friendly",
        Honored = 5 => "honored",
        Revered = 6 => "revered",
        Exalted = 7 => "exalted",
    }
}

id_table! {
    /// State of a world PvP zone battle
    PvpZoneStatus: i8 {
        Unknown = -1 => "unknown",
        Idle = 0 => "idle",
        Populating = 1 => "populating",
        Active = 2 => "active",
        Concluded = 3 => "concluded",
    }
}

impl Faction {
    /// Side a race belongs to. Every playable race has exactly one.
    pub fn for_race(race: Race) -> Self {
        match race {
            Race::Human
            | Race::Dwarf
            | Race::NightElf
            | Race::Gnome
            | Race::Draenei
            | Race::Worgen => Self::Alliance,
            Race::Orc
            | Race::Undead
            | Race::Tauren
            | Race::Troll
            | Race::Goblin
            | Race::BloodElf => Self::Horde,
        }
    }

    /// Parse the `"alliance"`/`"horde"` spelling used by arena team payloads.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|faction| faction.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealmType {
    Pvp,
    Pve,
    Rp,
    RpPvp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    High,
    Medium,
    Low,
    /// `"n/a"` for new or merged realms
    #[serde(other)]
    Unknown,
}

/// Pixel sizes the icon service renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl IconSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 18,
            Self::Medium => 36,
            Self::Large => 56,
        }
    }

    pub fn from_pixels(pixels: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.pixels() == pixels)
    }
}

const STAT_NAMES: &[(u32, &str)] = &[
    (1, "+{amount} Health"),
    (2, "+{amount} Mana"),
    (3, "+{amount} Agility"),
    (4, "+{amount} Strength"),
    (5, "+{amount} Intellect"),
    (6, "+{amount} Spirit"),
    (7, "+{amount} Stamina"),
    (12, "Equip: Increases defense rating by {amount}."),
    (13, "Equip: Increases your dodge rating by {amount}."),
    (14, "Equip: Increases your parry rating by {amount}."),
    (15, "Equip: Increases your shield block rating by {amount}."),
    (16, "Equip: Improves melee hit rating by {amount}."),
    (17, "Equip: Improves ranged hit rating by {amount}."),
    (18, "Equip: Improves spell hit rating by {amount}."),
    (19, "Equip: Improves melee critical strike rating by {amount}."),
    (20, "Equip: Improves ranged critical strike rating by {amount}."),
    (21, "Equip: Improves spell critical strike rating by {amount}."),
    (22, "Equip: Improves melee hit avoidance rating by {amount}."),
    (23, "Equip: Improves ranged hit avoidance rating by {amount}."),
    (24, "Equip: Improves spell hit avoidance rating by {amount}."),
    (25, "Equip: Improves melee critical avoidance rating by {amount}."),
    (26, "Equip: Improves ranged critical avoidance rating by {amount}."),
    (27, "Equip: Improves spell critical avoidance rating by {amount}."),
    (28, "Equip: Improves melee haste rating by {amount}."),
    (29, "Equip: Improves ranged haste rating by {amount}."),
    (30, "Equip: Improves spell haste rating by {amount}."),
    (31, "Equip: Increases your hit rating by {amount}."),
    (32, "Equip: Increases your critical strike rating by {amount}."),
    (33, "Equip: Improves hit avoidance rating by {amount}."),
    (34, "Equip: Improves critical avoidance rating by {amount}."),
    (35, "Equip: Increases your resilience rating by {amount}."),
    (36, "Equip: Increases your haste rating by {amount}."),
    (37, "Equip: Increases your expertise rating by {amount}."),
    (38, "Equip: Increases attack power by {amount}."),
    (39, "Equip: Increases ranged attack power by {amount}."),
    (
        40,
        "Equip: Increases attack power by {amount} in Cat, Bear, Dire Bear, and Moonkin forms only.",
    ),
    (
        41,
        "Equip: Increases damage done by magical spells and effects by up to {amount}.",
    ),
    (
        42,
        "Equip: Increases healing done by magical spells and effects by up to {amount}.",
    ),
    (43, "Equip: Restores {amount} mana per 5 sec."),
    (44, "Equip: Increases your armor penetration rating by {amount}."),
    (45, "Equip: Increases spell power by {amount}."),
    (46, "Equip: Restores {amount} health per 5 sec."),
    (47, "Equip: Increases spell penetration by {amount}."),
    (48, "Equip: Increases the block value of your shield by {amount}."),
    (49, "Equip: Increases your mastery rating by {amount}."),
];

/// Tooltip text for a bonus stat, e.g. `+130 Stamina`.
///
/// A negative amount drops the leading `+` (`-20 Spirit`). Unknown stat ids
/// give `None`.
pub fn stat_string(stat: u32, amount: i64) -> Option<String> {
    let (_, template) = STAT_NAMES.iter().find(|(id, _)| *id == stat)?;
    let text = template.replace("{amount}", &amount.to_string());
    if amount < 0 && template.starts_with('+') {
        return Some(text[1..].to_string());
    }
    Some(text)
}

/// Stats a reforge can move between, in id order.
const REFORGE_STATS: [u32; 8] = [6, 13, 14, 31, 32, 36, 37, 49];
const FIRST_REFORGE: u32 = 113;

/// `(from_stat, to_stat)` for a reforge id.
///
/// Ids 113 to 168 enumerate every ordered pair of distinct reforgeable
/// stats, grouped by source stat.
pub fn reforge(id: u32) -> Option<(u32, u32)> {
    let index = id.checked_sub(FIRST_REFORGE)? as usize;
    let targets = REFORGE_STATS.len() - 1;
    let from = *REFORGE_STATS.get(index / targets)?;
    let to = REFORGE_STATS
        .iter()
        .copied()
        .filter(|stat| *stat != from)
        .nth(index % targets)?;
    Some((from, to))
}
