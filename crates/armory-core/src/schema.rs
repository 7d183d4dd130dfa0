//! Per-kind field schemas.
//!
//! Core fields come back in every response for a kind. Optional fields are
//! only present when named in the `fields=` query parameter. Any other name
//! is unknown and is rejected before a request is made.

use crate::identity::EntityKind;

/// How a field name relates to a kind's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Core,
    /// Carries the schema's static spelling of the name.
    Optional(&'static str),
}

#[derive(Debug)]
pub struct Schema {
    pub kind: EntityKind,
    pub core: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl Schema {
    pub fn for_kind(kind: EntityKind) -> &'static Self {
        match kind {
            EntityKind::Realm => &REALM,
            EntityKind::Guild => &GUILD,
            EntityKind::Character => &CHARACTER,
            EntityKind::Item => &ITEM,
            EntityKind::ItemSet => &ITEM_SET,
            EntityKind::Quest => &QUEST,
            EntityKind::Achievement => &ACHIEVEMENT,
            EntityKind::ArenaTeam => &ARENA_TEAM,
            EntityKind::Data => &DATA,
        }
    }

    pub fn classify(&self, field: &str) -> Option<FieldClass> {
        if self.core.contains(&field) {
            Some(FieldClass::Core)
        } else {
            self.optional
                .iter()
                .copied()
                .find(|candidate| *candidate == field)
                .map(FieldClass::Optional)
        }
    }

    pub fn is_optional(&self, field: &str) -> bool {
        self.optional.contains(&field)
    }
}

static REALM: Schema = Schema {
    kind: EntityKind::Realm,
    core: &[
        "type",
        "queue",
        "status",
        "population",
        "name",
        "slug",
        "battlegroup",
        "locale",
        "timezone",
        "wintergrasp",
        "tol-barad",
    ],
    optional: &[],
};

static GUILD: Schema = Schema {
    kind: EntityKind::Guild,
    core: &[
        "lastModified",
        "name",
        "realm",
        "battlegroup",
        "level",
        "side",
        "achievementPoints",
        "emblem",
    ],
    optional: GuildField::NAMES,
};

static CHARACTER: Schema = Schema {
    kind: EntityKind::Character,
    core: &[
        "lastModified",
        "name",
        "realm",
        "battlegroup",
        "class",
        "race",
        "gender",
        "level",
        "achievementPoints",
        "thumbnail",
        "calcClass",
        "totalHonorableKills",
    ],
    optional: CharacterField::NAMES,
};

static ITEM: Schema = Schema {
    kind: EntityKind::Item,
    core: &[
        "id",
        "name",
        "description",
        "icon",
        "stackable",
        "allowableClasses",
        "allowableRaces",
        "itemBind",
        "bonusStats",
        "itemSpells",
        "buyPrice",
        "sellPrice",
        "itemClass",
        "itemSubClass",
        "containerSlots",
        "weaponInfo",
        "inventoryType",
        "equippable",
        "itemLevel",
        "itemSet",
        "maxCount",
        "maxDurability",
        "minFactionId",
        "minReputation",
        "quality",
        "requiredSkill",
        "requiredLevel",
        "requiredSkillRank",
        "requiredAbility",
        "baseArmor",
        "armor",
        "hasSockets",
        "socketInfo",
        "isAuctionable",
        "displayInfoId",
        "disenchantingSkillRank",
        "itemSource",
    ],
    optional: &[],
};

static ITEM_SET: Schema = Schema {
    kind: EntityKind::ItemSet,
    core: &["id", "name", "setBonuses", "items"],
    optional: &[],
};

static QUEST: Schema = Schema {
    kind: EntityKind::Quest,
    core: &[
        "id",
        "title",
        "reqLevel",
        "suggestedPartyMembers",
        "category",
        "level",
    ],
    optional: &[],
};

static ACHIEVEMENT: Schema = Schema {
    kind: EntityKind::Achievement,
    core: &[
        "id",
        "title",
        "points",
        "description",
        "reward",
        "rewardItems",
        "icon",
        "criteria",
        "accountWide",
        "factionId",
    ],
    optional: &[],
};

static ARENA_TEAM: Schema = Schema {
    kind: EntityKind::ArenaTeam,
    core: &[
        "realm",
        "ranking",
        "rating",
        "teamsize",
        "created",
        "name",
        "gamesPlayed",
        "gamesWon",
        "gamesLost",
        "sessionGamesPlayed",
        "sessionGamesWon",
        "sessionGamesLost",
        "lastSessionRanking",
        "side",
        "currentWeekRanking",
        "members",
    ],
    optional: &[],
};

static DATA: Schema = Schema {
    kind: EntityKind::Data,
    core: &["realms", "classes", "races", "battlegroups"],
    optional: &[],
};

/// Optional character profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterField {
    Guild,
    Stats,
    Feed,
    Talents,
    Items,
    Reputation,
    Titles,
    Professions,
    Appearance,
    Companions,
    Mounts,
    Pets,
    Achievements,
    Progression,
    Pvp,
    Quests,
}

impl CharacterField {
    pub const ALL: [Self; 16] = [
        Self::Guild,
        Self::Stats,
        Self::Feed,
        Self::Talents,
        Self::Items,
        Self::Reputation,
        Self::Titles,
        Self::Professions,
        Self::Appearance,
        Self::Companions,
        Self::Mounts,
        Self::Pets,
        Self::Achievements,
        Self::Progression,
        Self::Pvp,
        Self::Quests,
    ];

    const NAMES: &'static [&'static str] = &[
        "guild",
        "stats",
        "feed",
        "talents",
        "items",
        "reputation",
        "titles",
        "professions",
        "appearance",
        "companions",
        "mounts",
        "pets",
        "achievements",
        "progression",
        "pvp",
        "quests",
    ];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Optional guild profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuildField {
    Members,
    Achievements,
    News,
}

impl GuildField {
    pub const ALL: [Self; 3] = [Self::Members, Self::Achievements, Self::News];

    const NAMES: &'static [&'static str] = &["members", "achievements", "news"];

    pub fn as_str(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Insertion-ordered set of requested optional fields.
///
/// Only grows: there is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(Vec<&'static str>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the field was already present.
    pub fn insert(&mut self, field: &'static str) -> bool {
        if self.contains(field) {
            false
        } else {
            self.0.push(field);
            true
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(&field)
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        other.iter().all(|field| self.contains(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[&'static str] {
        &self.0
    }

    /// Comma-joined value for the `fields=` query parameter.
    pub fn query_value(&self) -> String {
        self.0.join(",")
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a &'static str;
    type IntoIter = std::slice::Iter<'a, &'static str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
