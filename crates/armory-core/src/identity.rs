//! Entity identity: the composite key every cached record is stored under.
//!
//! Keys normalize on construction. Realm names become slugs and names are
//! lowercased, so two lookups that differ only in spelling of the same
//! realm or in name casing produce equal keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ArmoryError, Result};
use crate::region::Region;
use crate::slug::realm_slug;

/// Kind of remote entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Realm,
    Guild,
    Character,
    Item,
    ItemSet,
    Quest,
    Achievement,
    ArenaTeam,
    /// Region-wide reference data such as class and race lists
    Data,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Realm => "realm",
            Self::Guild => "guild",
            Self::Character => "character",
            Self::Item => "item",
            Self::ItemSet => "item set",
            Self::Quest => "quest",
            Self::Achievement => "achievement",
            Self::ArenaTeam => "arena team",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arena bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSize {
    #[serde(rename = "2v2")]
    TwoVsTwo,
    #[serde(rename = "3v3")]
    ThreeVsThree,
    #[serde(rename = "5v5")]
    FiveVsFive,
}

impl TeamSize {
    pub fn from_players(players: u8) -> Option<Self> {
        match players {
            2 => Some(Self::TwoVsTwo),
            3 => Some(Self::ThreeVsThree),
            5 => Some(Self::FiveVsFive),
            _ => None,
        }
    }

    pub fn players(self) -> u8 {
        match self {
            Self::TwoVsTwo => 2,
            Self::ThreeVsThree => 3,
            Self::FiveVsFive => 5,
        }
    }

    /// Bracket as it appears in request paths, e.g. `3v3`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoVsTwo => "2v2",
            Self::ThreeVsThree => "3v3",
            Self::FiveVsFive => "5v5",
        }
    }
}

impl fmt::Display for TeamSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `2`, `3`, `5` or the bracket form `2v2`, `3v3`, `5v5`.
impl FromStr for TeamSize {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let players = s
            .strip_suffix(|c: char| c.is_ascii_digit())
            .and_then(|rest| rest.strip_suffix('v'))
            .unwrap_or(s);
        players
            .parse::<u8>()
            .ok()
            .and_then(Self::from_players)
            .filter(|size| s == players || s == size.as_str())
            .ok_or_else(|| ArmoryError::InvalidIdentifier(format!("unknown arena team size '{s}'")))
    }
}

/// Region-wide reference data resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataResource {
    /// Every realm in the region, used to list slugs
    RealmStatus,
    ItemClasses,
    Battlegroups,
    CharacterClasses,
    CharacterRaces,
}

impl DataResource {
    /// Path segments below the API base.
    pub fn segments(self) -> &'static [&'static str] {
        match self {
            Self::RealmStatus => &["realm", "status"],
            Self::ItemClasses => &["data", "item", "classes"],
            Self::Battlegroups => &["data", "battlegroups", ""],
            Self::CharacterClasses => &["data", "character", "classes"],
            Self::CharacterRaces => &["data", "character", "races"],
        }
    }

    /// Top-level field the resource's payload lives under.
    pub fn field(self) -> &'static str {
        match self {
            Self::RealmStatus => "realms",
            Self::ItemClasses | Self::CharacterClasses => "classes",
            Self::Battlegroups => "battlegroups",
            Self::CharacterRaces => "races",
        }
    }
}

/// Identifier of an entity within its kind and realm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// Lowercased name (guilds, characters) or slug (realms)
    Name(String),
    Numeric(u64),
    Team { size: TeamSize, name: String },
    Data(DataResource),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Team { size, name } => write!(f, "{size}/{name}"),
            Self::Data(resource) => f.write_str(&resource.segments().join("/")),
        }
    }
}

/// Composite identity of a remote entity: region, kind, realm slug (for
/// realm-scoped kinds) and normalized identifier.
///
/// Fields are private so a key can only be produced already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    region: Region,
    kind: EntityKind,
    realm: Option<String>,
    id: EntityId,
}

impl EntityKey {
    pub fn realm(region: Region, name: &str) -> Self {
        Self {
            region,
            kind: EntityKind::Realm,
            realm: None,
            id: EntityId::Name(realm_slug(name)),
        }
    }

    pub fn guild(region: Region, realm: &str, name: &str) -> Self {
        Self::named(region, EntityKind::Guild, realm, name)
    }

    pub fn character(region: Region, realm: &str, name: &str) -> Self {
        Self::named(region, EntityKind::Character, realm, name)
    }

    pub fn arena_team(region: Region, realm: &str, size: TeamSize, name: &str) -> Self {
        Self {
            region,
            kind: EntityKind::ArenaTeam,
            realm: Some(realm_slug(realm)),
            id: EntityId::Team {
                size,
                name: normalize_name(name),
            },
        }
    }

    pub fn item(region: Region, id: u64) -> Self {
        Self::numeric(region, EntityKind::Item, id)
    }

    pub fn item_set(region: Region, id: u64) -> Self {
        Self::numeric(region, EntityKind::ItemSet, id)
    }

    pub fn quest(region: Region, id: u64) -> Self {
        Self::numeric(region, EntityKind::Quest, id)
    }

    pub fn achievement(region: Region, id: u64) -> Self {
        Self::numeric(region, EntityKind::Achievement, id)
    }

    pub fn data(region: Region, resource: DataResource) -> Self {
        Self {
            region,
            kind: EntityKind::Data,
            realm: None,
            id: EntityId::Data(resource),
        }
    }

    fn named(region: Region, kind: EntityKind, realm: &str, name: &str) -> Self {
        Self {
            region,
            kind,
            realm: Some(realm_slug(realm)),
            id: EntityId::Name(normalize_name(name)),
        }
    }

    fn numeric(region: Region, kind: EntityKind, id: u64) -> Self {
        Self {
            region,
            kind,
            realm: None,
            id: EntityId::Numeric(id),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Realm slug for realm-scoped kinds.
    pub fn realm_slug(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Name part of the identifier, if it has one.
    pub fn name(&self) -> Option<&str> {
        match &self.id {
            EntityId::Name(name) | EntityId::Team { name, .. } => Some(name),
            EntityId::Numeric(_) | EntityId::Data(_) => None,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.kind)?;
        if let Some(realm) = &self.realm {
            write!(f, "/{realm}")?;
        }
        write!(f, "/{}", self.id)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
