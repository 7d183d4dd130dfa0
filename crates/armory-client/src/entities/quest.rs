use armory_core::Result;

entity! {
    Quest(id)
}

impl Quest {
    pub async fn title(&self) -> Result<String> {
        self.record.get_as("title").await
    }

    /// Minimum level to pick the quest up.
    pub async fn required_level(&self) -> Result<u32> {
        self.record.get_as("reqLevel").await
    }

    /// Recommended group size, 0 for solo quests.
    pub async fn suggested_party_members(&self) -> Result<u32> {
        self.record.get_as("suggestedPartyMembers").await
    }

    /// Zone or quest category name.
    pub async fn category(&self) -> Result<String> {
        self.record.get_as("category").await
    }

    pub async fn level(&self) -> Result<u32> {
        self.record.get_as("level").await
    }
}
