use armory_core::{EntityKey, Record, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{Entity, Item};
use crate::game::IconSize;
use crate::media;

entity! {
    Achievement(id)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Criterion {
    pub id: u64,
    pub description: String,
}

impl Achievement {
    pub async fn title(&self) -> Result<String> {
        self.record.get_as("title").await
    }

    pub async fn points(&self) -> Result<u32> {
        self.record.get_as("points").await
    }

    pub async fn description(&self) -> Result<String> {
        self.record.get_as("description").await
    }

    /// Reward text, e.g. `Title Reward: Salty`.
    pub async fn reward(&self) -> Result<Option<String>> {
        self.record.get_opt_as("reward").await
    }

    /// Items granted on completion. `None` when the achievement has no
    /// reward; an empty list when the reward is not an item.
    pub async fn reward_items(&self) -> Result<Option<Vec<Item>>> {
        let Some(rewards) = self.record.get_opt_as::<Vec<Record>>("rewardItems").await? else {
            return Ok(None);
        };

        let mut items = Vec::with_capacity(rewards.len());
        for reward in rewards {
            let Some(id) = reward.get("id").and_then(Value::as_u64) else {
                continue;
            };
            let record = self
                .session
                .seeded(EntityKey::item(self.region(), id), reward)?;
            items.push(Item::new(self.session.clone(), record, id));
        }
        Ok(Some(items))
    }

    pub async fn icon(&self) -> Result<String> {
        self.record.get_as("icon").await
    }

    pub async fn icon_url(&self, size: IconSize) -> Result<String> {
        Ok(media::icon_url(self.region(), size, &self.icon().await?))
    }

    pub async fn criteria(&self) -> Result<Vec<Criterion>> {
        self.record.get_as("criteria").await
    }
}
