use armory_core::{EntityKey, Record, Result};
use serde::Deserialize;
use serde_json::Value;

use super::Entity;
use crate::game::{IconSize, ItemQuality, stat_string};
use crate::media;
use crate::money::Money;

entity! {
    /// An item template.
    Item(id)
}

entity! {
    /// A set of items with shared bonuses.
    ItemSet(id)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BonusStat {
    pub stat: u32,
    pub amount: i64,
    #[serde(default)]
    pub reforged: bool,
}

impl BonusStat {
    /// Tooltip line, e.g. `+130 Stamina`.
    pub fn tooltip(&self) -> Option<String> {
        stat_string(self.stat, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpellInfo {
    pub id: u64,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpell {
    pub spell_id: u64,
    pub n_charges: i32,
    pub consumable: bool,
    pub category_id: u32,
    pub trigger: String,
    pub spell: Option<SpellInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Damage {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponInfo {
    pub damage: Damage,
    pub weapon_speed: f64,
    pub dps: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSocketInfo {
    #[serde(default)]
    sockets: Vec<RawSocket>,
    socket_bonus: Option<String>,
}

#[derive(Deserialize)]
struct RawSocket {
    #[serde(rename = "type")]
    color: String,
}

/// Gem sockets and the bonus for matching all of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSocketInfo")]
pub struct SocketInfo {
    /// Socket colors, e.g. `RED` or `META`
    pub sockets: Vec<String>,
    pub socket_bonus: Option<String>,
}

impl From<RawSocketInfo> for SocketInfo {
    fn from(raw: RawSocketInfo) -> Self {
        Self {
            sockets: raw.sockets.into_iter().map(|socket| socket.color).collect(),
            socket_bonus: raw.socket_bonus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSource {
    pub source_id: u64,
    /// e.g. `VENDOR` or `CREATURE_DROP`
    pub source_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredAbility {
    pub spell_id: u64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetBonus {
    pub description: String,
    /// Pieces needed for the bonus
    pub threshold: u32,
}

impl Item {
    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    /// Flavor text; empty for most items.
    pub async fn description(&self) -> Result<String> {
        Ok(self
            .record
            .get_opt_as("description")
            .await?
            .unwrap_or_default())
    }

    pub async fn icon(&self) -> Result<String> {
        self.record.get_as("icon").await
    }

    pub async fn icon_url(&self, size: IconSize) -> Result<String> {
        Ok(media::icon_url(self.region(), size, &self.icon().await?))
    }

    /// Maximum stack size.
    pub async fn stack_size(&self) -> Result<u32> {
        self.record.get_as("stackable").await
    }

    pub async fn is_stackable(&self) -> Result<bool> {
        Ok(self.stack_size().await? > 1)
    }

    /// Class ids that may use the item; `None` when unrestricted.
    pub async fn allowable_classes(&self) -> Result<Option<Vec<u8>>> {
        self.record.get_opt_as("allowableClasses").await
    }

    pub async fn allowable_races(&self) -> Result<Option<Vec<u8>>> {
        self.record.get_opt_as("allowableRaces").await
    }

    /// 0 never binds, 1 binds on pickup, 2 binds on equip.
    pub async fn binding(&self) -> Result<u8> {
        self.record.get_as("itemBind").await
    }

    /// Stats other than armor.
    pub async fn bonus_stats(&self) -> Result<Vec<BonusStat>> {
        Ok(self
            .record
            .get_opt_as("bonusStats")
            .await?
            .unwrap_or_default())
    }

    pub async fn spells(&self) -> Result<Vec<ItemSpell>> {
        Ok(self
            .record
            .get_opt_as("itemSpells")
            .await?
            .unwrap_or_default())
    }

    pub async fn buy_price(&self) -> Result<Money> {
        self.record.get_as("buyPrice").await
    }

    pub async fn sell_price(&self) -> Result<Money> {
        self.record.get_as("sellPrice").await
    }

    pub async fn item_class(&self) -> Result<u32> {
        self.record.get_as("itemClass").await
    }

    pub async fn item_subclass(&self) -> Result<u32> {
        self.record.get_as("itemSubClass").await
    }

    /// Bag slots; 0 for anything that is not a container.
    pub async fn container_slots(&self) -> Result<u32> {
        Ok(self
            .record
            .get_opt_as("containerSlots")
            .await?
            .unwrap_or_default())
    }

    /// `None` for items that are not weapons.
    pub async fn weapon_info(&self) -> Result<Option<WeaponInfo>> {
        self.record.get_opt_as("weaponInfo").await
    }

    pub async fn inventory_type(&self) -> Result<u32> {
        self.record.get_as("inventoryType").await
    }

    pub async fn is_equippable(&self) -> Result<bool> {
        self.record.get_as("equippable").await
    }

    pub async fn item_level(&self) -> Result<u32> {
        self.record.get_as("itemLevel").await
    }

    /// Set this item belongs to, seeded with the embedded set summary.
    pub async fn item_set(&self) -> Result<Option<ItemSet>> {
        let Some(data) = self.record.get_opt_as::<Record>("itemSet").await? else {
            return Ok(None);
        };
        let Some(id) = data.get("id").and_then(Value::as_u64) else {
            return Ok(None);
        };
        let record = self
            .session
            .seeded(EntityKey::item_set(self.region(), id), data)?;
        Ok(Some(ItemSet::new(self.session.clone(), record, id)))
    }

    /// Unique-equipped limit; 0 for none.
    pub async fn max_count(&self) -> Result<u32> {
        self.record.get_as("maxCount").await
    }

    pub async fn max_durability(&self) -> Result<u32> {
        self.record.get_as("maxDurability").await
    }

    /// Reputation faction the item requires, 0 for none.
    pub async fn min_faction_id(&self) -> Result<u32> {
        self.record.get_as("minFactionId").await
    }

    /// Standing needed with [`min_faction_id`](Self::min_faction_id).
    pub async fn min_reputation(&self) -> Result<u8> {
        self.record.get_as("minReputation").await
    }

    pub async fn quality(&self) -> Result<Option<ItemQuality>> {
        let id: u8 = self.record.get_as("quality").await?;
        Ok(ItemQuality::from_id(id))
    }

    pub async fn required_skill(&self) -> Result<u32> {
        self.record.get_as("requiredSkill").await
    }

    pub async fn required_skill_rank(&self) -> Result<u32> {
        self.record.get_as("requiredSkillRank").await
    }

    pub async fn required_level(&self) -> Result<u32> {
        self.record.get_as("requiredLevel").await
    }

    pub async fn required_ability(&self) -> Result<Option<RequiredAbility>> {
        self.record.get_opt_as("requiredAbility").await
    }

    pub async fn base_armor(&self) -> Result<i64> {
        self.record.get_as("baseArmor").await
    }

    /// Total armor including bonus armor.
    pub async fn armor(&self) -> Result<i64> {
        self.record.get_as("armor").await
    }

    pub async fn bonus_armor(&self) -> Result<i64> {
        Ok(self.armor().await? - self.base_armor().await?)
    }

    pub async fn has_sockets(&self) -> Result<bool> {
        self.record.get_as("hasSockets").await
    }

    pub async fn socket_info(&self) -> Result<Option<SocketInfo>> {
        self.record.get_opt_as("socketInfo").await
    }

    pub async fn is_auctionable(&self) -> Result<bool> {
        self.record.get_as("isAuctionable").await
    }

    pub async fn display_info_id(&self) -> Result<u64> {
        self.record.get_as("displayInfoId").await
    }

    /// Enchanting skill needed to disenchant; `None` if it cannot be.
    pub async fn disenchanting_skill_rank(&self) -> Result<Option<u32>> {
        self.record.get_opt_as("disenchantingSkillRank").await
    }

    pub async fn source(&self) -> Result<Option<ItemSource>> {
        self.record.get_opt_as("itemSource").await
    }
}

impl ItemSet {
    pub async fn name(&self) -> Result<String> {
        self.record.get_as("name").await
    }

    pub async fn bonuses(&self) -> Result<Vec<SetBonus>> {
        self.record.get_as("setBonuses").await
    }

    /// Bonuses active when `pieces` items of the set are equipped.
    pub async fn bonuses_with_items(&self, pieces: u32) -> Result<Vec<SetBonus>> {
        let mut bonuses = self.bonuses().await?;
        bonuses.retain(|bonus| bonus.threshold <= pieces);
        Ok(bonuses)
    }

    /// Items in the set, as shared [`Item`] handles.
    pub async fn items(&self) -> Result<Vec<Item>> {
        let ids: Vec<u64> = self.record.get_as("items").await?;
        ids.into_iter()
            .map(|id| self.session.item_in(id, self.region()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Armory, ClientConfig};
    use armory_core::{Region, StaticFetcher};
    use serde_json::json;
    use std::sync::Arc;

    fn session() -> (Armory, Arc<StaticFetcher>) {
        let fetcher = Arc::new(StaticFetcher::new());
        let armory = Armory::with_fetcher(ClientConfig::new(Region::US), fetcher.clone()).unwrap();
        (armory, fetcher)
    }

    fn sword() -> Value {
        json!({
            "id": 71086,
            "name": "Dragonwrath, Tarecgosa's Rest",
            "description": "",
            "icon": "stave_2h_tarecgosa_e_01stagefinal",
            "stackable": 1,
            "itemBind": 1,
            "bonusStats": [
                {"stat": 32, "amount": 225, "reforged": false},
                {"stat": 7, "amount": 442}
            ],
            "itemSpells": [],
            "buyPrice": 1587432,
            "itemClass": 2,
            "itemSubClass": 10,
            "containerSlots": 0,
            "weaponInfo": {"damage": {"min": 1089, "max": 1634}, "weaponSpeed": 3.3, "dps": 412.57574},
            "inventoryType": 17,
            "equippable": true,
            "itemLevel": 397,
            "maxCount": 1,
            "maxDurability": 120,
            "minFactionId": 0,
            "minReputation": 0,
            "quality": 5,
            "sellPrice": 317486,
            "requiredSkill": 0,
            "requiredLevel": 85,
            "requiredSkillRank": 0,
            "socketInfo": {"sockets": [{"type": "RED"}, {"type": "YELLOW"}], "socketBonus": "+30 Intellect"},
            "itemSource": {"sourceId": 0, "sourceType": "NONE"},
            "baseArmor": 0,
            "armor": 0,
            "hasSockets": true,
            "isAuctionable": false,
            "displayInfoId": 108324
        })
    }

    #[tokio::test]
    async fn test_item_fields() {
        let (armory, fetcher) = session();
        fetcher.respond("/api/wow/item/71086", sword());

        let item = armory.item(71086).unwrap();
        assert_eq!(item.id(), 71086);
        assert_eq!(item.quality().await.unwrap(), Some(ItemQuality::Legendary));
        assert!(!item.is_stackable().await.unwrap());
        assert_eq!(item.allowable_classes().await.unwrap(), None);
        assert_eq!(item.buy_price().await.unwrap().to_string(), "158g 74s 32c");
        assert_eq!(item.bonus_stats().await.unwrap()[1].tooltip().as_deref(), Some("+442 Stamina"));
        assert_eq!(item.weapon_info().await.unwrap().unwrap().damage.max, 1634);
        assert_eq!(
            item.socket_info().await.unwrap().unwrap().sockets,
            vec!["RED", "YELLOW"]
        );
        assert_eq!(item.required_ability().await.unwrap(), None);
        assert_eq!(item.bonus_armor().await.unwrap(), 0);
        assert_eq!(
            item.icon_url(IconSize::Medium).await.unwrap(),
            "https://us.media.blizzard.com/wow/icons/36/stave_2h_tarecgosa_e_01stagefinal.jpg"
        );
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_item_set_bonuses_and_items() {
        let (armory, fetcher) = session();
        fetcher.respond(
            "/api/wow/item/set/1060",
            json!({
                "id": 1060,
                "name": "Deep Earth Vestments",
                "setBonuses": [
                    {"description": "Reduces the cost of your Healing Touch.", "threshold": 2},
                    {"description": "Increases your critical strike chance.", "threshold": 4}
                ],
                "items": [76749, 76750]
            }),
        );

        let set = armory.item_set(1060).unwrap();
        assert_eq!(set.bonuses_with_items(3).await.unwrap().len(), 1);
        assert_eq!(set.bonuses_with_items(4).await.unwrap().len(), 2);
        assert_eq!(set.bonuses_with_items(1).await.unwrap().len(), 0);

        let items = set.items().await.unwrap();
        assert_eq!(items[0].id(), 76749);
        assert!(items[1].is_same(&armory.item(76750).unwrap()));
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_item_set_from_item_is_seeded() {
        let (armory, fetcher) = session();
        let mut body = sword();
        body["itemSet"] = json!({"id": 1060, "name": "Deep Earth Vestments", "setBonuses": [], "items": [76749]});
        fetcher.respond("/api/wow/item/71086", body);

        let set = armory.item(71086).unwrap().item_set().await.unwrap().unwrap();
        assert_eq!(set.id(), 1060);
        assert_eq!(set.name().await.unwrap(), "Deep Earth Vestments");
        assert!(set.is_same(&armory.item_set(1060).unwrap()));
        assert_eq!(fetcher.fetch_count(), 1);
    }
}
