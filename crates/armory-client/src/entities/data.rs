//! Region-wide reference data.
//!
//! Each resource is an ordinary cached record, so it is fetched at most
//! once per region and session.

use armory_core::{DataResource, EntityKey, LazyRecord, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::game::Faction;
use crate::session::{Armory, LookupOptions};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Battlegroup {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: u8,
    pub mask: u32,
    /// e.g. `rage`, `mana`
    pub power_type: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RaceInfo {
    pub id: u8,
    pub mask: u32,
    side: String,
    pub name: String,
}

impl RaceInfo {
    pub fn faction(&self) -> Option<Faction> {
        Faction::from_name(&self.side)
    }
}

#[derive(Deserialize)]
struct RealmSummary {
    slug: String,
}

#[derive(Deserialize)]
struct ItemClass {
    class: u32,
    name: String,
}

impl Armory {
    /// Slugs of every realm in the session's region.
    pub async fn realm_slugs(&self) -> Result<Vec<String>> {
        let realms: Vec<RealmSummary> = self
            .reference(DataResource::RealmStatus)?
            .get_as("realms")
            .await?;
        Ok(realms.into_iter().map(|realm| realm.slug).collect())
    }

    /// Item class names by class id.
    pub async fn item_classes(&self) -> Result<BTreeMap<u32, String>> {
        let classes: Vec<ItemClass> = self
            .reference(DataResource::ItemClasses)?
            .get_as("classes")
            .await?;
        Ok(classes
            .into_iter()
            .map(|class| (class.class, class.name))
            .collect())
    }

    pub async fn battlegroups(&self) -> Result<Vec<Battlegroup>> {
        self.reference(DataResource::Battlegroups)?
            .get_as("battlegroups")
            .await
    }

    /// Character classes.
    pub async fn classes(&self) -> Result<Vec<ClassInfo>> {
        self.reference(DataResource::CharacterClasses)?
            .get_as("classes")
            .await
    }

    /// Character races.
    pub async fn races(&self) -> Result<Vec<RaceInfo>> {
        self.reference(DataResource::CharacterRaces)?
            .get_as("races")
            .await
    }

    fn reference(&self, resource: DataResource) -> Result<Arc<LazyRecord>> {
        self.lookup(EntityKey::data(self.region(), resource), LookupOptions::default())
    }
}
