use armory_core::{EntityKey, Record, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{Character, Entity, Realm};
use crate::game::Faction;

entity! {
    /// A guild on a realm.
    ///
    /// Guild profiles carry the scalar fields below; `members`, `news` and
    /// `achievements` are optional fields fetched on first use.
    Guild
}

/// Tabard colors and symbols.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildEmblem {
    pub icon: u32,
    pub icon_color: String,
    pub border: u32,
    pub border_color: String,
    pub background_color: String,
}

/// A roster entry.
#[derive(Debug, Clone)]
pub struct GuildMember {
    /// 0 is the guild master
    pub rank: u32,
    pub character: Character,
}

#[derive(Deserialize)]
struct RawMember {
    rank: u32,
    character: Record,
}

impl Guild {
    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    pub async fn level(&self) -> Result<u32> {
        self.record.get_as("level").await
    }

    pub async fn achievement_points(&self) -> Result<u32> {
        self.record.get_as("achievementPoints").await
    }

    /// `None` for a side id outside the faction table.
    pub async fn faction(&self) -> Result<Option<Faction>> {
        let side: u8 = self.record.get_as("side").await?;
        Ok(Faction::from_id(side))
    }

    /// Display name of the guild's realm.
    pub async fn realm_name(&self) -> Result<String> {
        self.record.get_as("realm").await
    }

    /// The guild's realm. Never fetches.
    pub fn realm(&self) -> Result<Realm> {
        self.session
            .realm_in(self.key().realm_slug().unwrap_or_default(), self.region())
    }

    pub async fn battlegroup(&self) -> Result<String> {
        self.record.get_as("battlegroup").await
    }

    pub async fn emblem(&self) -> Result<GuildEmblem> {
        self.record.get_as("emblem").await
    }

    /// The roster. Each member is the session's shared [`Character`] for
    /// that identity; characters not seen before are seeded with the
    /// roster's embedded data.
    pub async fn members(&self) -> Result<Vec<GuildMember>> {
        let members: Vec<RawMember> = self.record.get_as("members").await?;
        let guild_realm = self.key().realm_slug().unwrap_or_default();

        members
            .into_iter()
            .map(|member| -> Result<GuildMember> {
                let character = self.embedded_character(guild_realm, member.character)?;
                Ok(GuildMember {
                    rank: member.rank,
                    character,
                })
            })
            .collect()
    }

    /// Recent guild events, as returned by the API.
    pub async fn news(&self) -> Result<Value> {
        self.record.get_field("news").await
    }

    pub async fn achievements(&self) -> Result<Value> {
        self.record.get_field("achievements").await
    }

    fn embedded_character(&self, guild_realm: &str, data: Record) -> Result<Character> {
        let name = data.get("name").and_then(Value::as_str).unwrap_or_default();
        let realm = data
            .get("realm")
            .and_then(Value::as_str)
            .unwrap_or(guild_realm);
        let key = EntityKey::character(self.region(), realm, name);
        let record = self.session.seeded(key, data)?;
        Ok(Character::new(self.session.clone(), record))
    }
}
