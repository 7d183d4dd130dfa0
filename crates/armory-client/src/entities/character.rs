use armory_core::{ArmoryError, EntityKey, EntityKind, Record, Result, TeamSize};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{ArenaTeam, Entity, Guild, Item, Quest, Realm};
use crate::game::{Class, Faction, Gender, Race, Standing};
use crate::media;
use crate::session::LookupOptions;

entity! {
    /// A player character.
    ///
    /// The basic profile is fetched on first access. Profile sections such
    /// as `guild`, `talents` or `pvp` are optional fields: reading one adds
    /// it to the request and refetches once, after which it is kept.
    Character
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Title {
    pub id: u32,
    /// Title text with `%s` where the character's name goes
    pub name: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TalentTree {
    pub total: u32,
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Glyph {
    #[serde(rename = "glyph")]
    pub id: u32,
    /// Id of the glyph's item
    pub item: u64,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TalentSpec {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    pub icon: String,
    pub build: String,
    #[serde(default)]
    pub trees: Vec<TalentTree>,
    /// Glyphs by slot kind (`prime`, `major`, `minor`)
    #[serde(default)]
    pub glyphs: BTreeMap<String, Vec<Glyph>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaTeamSummary {
    pub name: String,
    pub personal_rating: u32,
    pub team_rating: u32,
    /// `2v2`, `3v3` or `5v5`
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatedBattleground {
    pub name: String,
    pub played: u32,
    pub won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profession {
    pub id: u32,
    pub name: String,
    pub icon: String,
    pub rank: u32,
    pub max: u32,
    #[serde(default)]
    pub recipes: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Professions {
    #[serde(default)]
    pub primary: Vec<Profession>,
    #[serde(default)]
    pub secondary: Vec<Profession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub face_variation: u32,
    pub skin_color: u32,
    pub hair_variation: u32,
    pub hair_color: u32,
    pub feature_variation: u32,
    pub show_helm: bool,
    pub show_cloak: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reputation {
    pub id: u32,
    pub name: String,
    standing: u8,
    /// Progress within the current standing
    pub value: i64,
    pub max: i64,
}

impl Reputation {
    pub fn standing(&self) -> Option<Standing> {
        Standing::from_id(self.standing)
    }
}

/// A hunter's combat pet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pet {
    pub name: String,
    /// NPC id
    pub creature: u64,
    /// Stable slot
    pub slot: u32,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PvpProfile {
    rated_battlegrounds: RatedBattlegrounds,
    arena_teams: Vec<ArenaTeamSummary>,
    total_honorable_kills: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RatedBattlegrounds {
    personal_rating: u32,
    battlegrounds: Vec<RatedBattleground>,
}

impl Character {
    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    /// The character's realm. Never fetches.
    pub fn realm(&self) -> Result<Realm> {
        self.session
            .realm_in(self.key().realm_slug().unwrap_or_default(), self.region())
    }

    pub async fn battlegroup(&self) -> Result<String> {
        self.record.get_as("battlegroup").await
    }

    /// `None` for a race id outside the race table.
    pub async fn race(&self) -> Result<Option<Race>> {
        let id: u8 = self.record.get_as("race").await?;
        Ok(Race::from_id(id))
    }

    pub async fn class(&self) -> Result<Option<Class>> {
        let id: u8 = self.record.get_as("class").await?;
        Ok(Class::from_id(id))
    }

    pub async fn gender(&self) -> Result<Option<Gender>> {
        let id: u8 = self.record.get_as("gender").await?;
        Ok(Gender::from_id(id))
    }

    pub async fn level(&self) -> Result<u32> {
        self.record.get_as("level").await
    }

    pub async fn achievement_points(&self) -> Result<u32> {
        self.record.get_as("achievementPoints").await
    }

    /// Side the character plays for, derived from race.
    pub async fn faction(&self) -> Result<Option<Faction>> {
        Ok(self.race().await?.map(Faction::for_race))
    }

    pub async fn thumbnail_url(&self) -> Result<String> {
        let thumbnail: String = self.record.get_as("thumbnail").await?;
        Ok(media::thumbnail_url(self.region(), &thumbnail))
    }

    /// The character's guild, `None` when unguilded.
    ///
    /// The returned guild is the session's shared [`Guild`] for that
    /// identity, seeded with the summary embedded in the character profile.
    pub async fn guild(&self) -> Result<Option<Guild>> {
        let Some(data) = self.record.get_opt_as::<Record>("guild").await? else {
            return Ok(None);
        };
        let realm_slug = self.key().realm_slug().unwrap_or_default();
        let name = data.get("name").and_then(Value::as_str).ok_or_else(|| {
            ArmoryError::shape(EntityKind::Character, "guild", "guild summary without a name")
        })?;
        let realm = data
            .get("realm")
            .and_then(Value::as_str)
            .unwrap_or(realm_slug);

        let key = EntityKey::guild(self.region(), realm, name);
        let record = self.session.seeded(key, data)?;
        Ok(Some(Guild::new(self.session.clone(), record)))
    }

    /// Computed stats (health, power, ratings) keyed by API name.
    pub async fn stats(&self) -> Result<Record> {
        self.record.get_as("stats").await
    }

    pub async fn titles(&self) -> Result<Vec<Title>> {
        self.record.get_as("titles").await
    }

    /// The title currently shown, if any.
    pub async fn current_title(&self) -> Result<Option<Title>> {
        Ok(self.titles().await?.into_iter().find(|title| title.selected))
    }

    /// Title `id` with the character's name filled in, e.g. `Jon the
    /// Kingslayer`. `None` if the character has not earned it.
    pub async fn title_string(&self, id: u32) -> Result<Option<String>> {
        let Some(title) = self.titles().await?.into_iter().find(|title| title.id == id) else {
            return Ok(None);
        };
        let name = self.name().await?;
        Ok(Some(title.name.replace("%s", &name)))
    }

    pub async fn talents(&self) -> Result<Vec<TalentSpec>> {
        self.record.get_as("talents").await
    }

    /// Shared [`Item`] for a glyph, in the character's region.
    pub fn glyph_item(&self, glyph: &Glyph) -> Result<Item> {
        self.session.item_in(glyph.item, self.region())
    }

    pub async fn honorable_kills(&self) -> Result<u64> {
        Ok(self.pvp().await?.total_honorable_kills)
    }

    pub async fn arena_teams(&self) -> Result<Vec<ArenaTeamSummary>> {
        Ok(self.pvp().await?.arena_teams)
    }

    /// Full [`ArenaTeam`] for a summary from [`arena_teams`](Self::arena_teams).
    pub fn arena_team(&self, summary: &ArenaTeamSummary) -> Result<ArenaTeam> {
        let size: TeamSize = summary.size.parse()?;
        self.session.arena_team_with(
            size,
            &summary.name,
            LookupOptions::new()
                .realm(self.key().realm_slug().unwrap_or_default())
                .region(self.region()),
        )
    }

    pub async fn rated_battleground_rating(&self) -> Result<u32> {
        Ok(self.pvp().await?.rated_battlegrounds.personal_rating)
    }

    /// Rated battleground results per battleground.
    pub async fn rated_battlegrounds(&self) -> Result<Vec<RatedBattleground>> {
        Ok(self.pvp().await?.rated_battlegrounds.battlegrounds)
    }

    pub async fn professions(&self) -> Result<Professions> {
        self.record.get_as("professions").await
    }

    pub async fn appearance(&self) -> Result<Appearance> {
        self.record.get_as("appearance").await
    }

    pub async fn reputation(&self) -> Result<Vec<Reputation>> {
        self.record.get_as("reputation").await
    }

    /// Spell ids of collected mounts.
    pub async fn mounts(&self) -> Result<Vec<u64>> {
        self.record.get_as("mounts").await
    }

    /// Spell ids of collected companion pets.
    pub async fn companions(&self) -> Result<Vec<u64>> {
        self.record.get_as("companions").await
    }

    /// Combat pets, `None` for characters that cannot have any.
    pub async fn pets(&self) -> Result<Option<Vec<Pet>>> {
        self.record.get_opt_as("pets").await
    }

    /// Completed quests as shared [`Quest`] handles. Quest details are
    /// fetched only when read.
    pub async fn quests(&self) -> Result<Vec<Quest>> {
        let ids: Vec<u64> = self.record.get_as("quests").await?;
        ids.into_iter()
            .map(|id| self.session.quest_in(id, self.region()))
            .collect()
    }

    /// Raw value of any core or optional field, e.g. `feed`, `items` or
    /// `progression`.
    pub async fn field(&self, name: &str) -> Result<Option<Value>> {
        self.record.get_field_opt(name).await
    }

    async fn pvp(&self) -> Result<PvpProfile> {
        self.record.get_as("pvp").await
    }
}
