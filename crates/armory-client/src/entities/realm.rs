use armory_core::Result;
use serde::Deserialize;

use super::{Character, Entity};
use crate::game::{Faction, Population, PvpZoneStatus, RealmType};
use crate::session::LookupOptions;

entity! {
    /// A realm and its live status.
    Realm
}

/// State of a world PvP zone such as Wintergrasp.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PvpZone {
    pub area: u32,
    #[serde(rename = "controlling-faction", alias = "controllingFaction")]
    controlling_faction: u8,
    status: i8,
    /// Start of the next battle, in milliseconds since the epoch
    pub next: u64,
}

impl PvpZone {
    pub fn controlling_faction(&self) -> Option<Faction> {
        Faction::from_id(self.controlling_faction)
    }

    pub fn status(&self) -> PvpZoneStatus {
        PvpZoneStatus::from_id(self.status).unwrap_or(PvpZoneStatus::Unknown)
    }
}

impl Realm {
    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    /// Slug the realm was looked up by. Never fetches.
    pub fn slug(&self) -> &str {
        self.key().name().unwrap_or_default()
    }

    pub async fn battlegroup(&self) -> Result<String> {
        self.record.get_as("battlegroup").await
    }

    pub async fn is_online(&self) -> Result<bool> {
        self.record.get_as("status").await
    }

    /// Whether logins are queued
    pub async fn has_queue(&self) -> Result<bool> {
        self.record.get_as("queue").await
    }

    pub async fn realm_type(&self) -> Result<RealmType> {
        self.record.get_as("type").await
    }

    pub async fn population(&self) -> Result<Population> {
        self.record.get_as("population").await
    }

    pub async fn timezone(&self) -> Result<Option<String>> {
        self.record.get_opt_as("timezone").await
    }

    /// Names of the PvP zones reported for the realm, sorted.
    pub async fn pvp_zones(&self) -> Result<Vec<String>> {
        let snapshot = self.record.snapshot().await?;
        let mut zones: Vec<String> = snapshot
            .into_iter()
            .filter(|(_, value)| value.is_object())
            .map(|(zone, _)| zone)
            .collect();
        zones.sort();
        Ok(zones)
    }

    /// Current state of `zone`, always refetched.
    pub async fn pvp_zone_status(&self, zone: &str) -> Result<PvpZone> {
        self.record.force_refresh().await?;
        self.record.get_as(zone).await
    }

    /// A character on this realm, in the realm's region.
    pub fn character(&self, name: &str) -> Result<Character> {
        self.character_with(name, LookupOptions::new())
    }

    pub fn character_with(&self, name: &str, options: LookupOptions) -> Result<Character> {
        self.session
            .character_with(name, options.realm(self.slug()).region(self.region()))
    }
}
