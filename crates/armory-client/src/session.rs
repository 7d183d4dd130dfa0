//! The `Armory` session: configuration, transport and object cache shared
//! by every entity looked up through it.

use armory_core::{
    ArmoryError, CacheStats, EntityKey, Fetcher, LazyRecord, Locale, ObjectCache, Record,
    RecordConfig, Region, Result, Schema, TeamSize,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::ClientConfig;
use crate::entities::{Achievement, ArenaTeam, Character, Guild, Item, ItemSet, Quest, Realm};
use crate::error::ClientError;
use crate::transport::HttpFetcher;

/// Per-lookup overrides of the session defaults.
#[derive(Debug, Clone)]
pub struct LookupOptions {
    realm: Option<String>,
    region: Option<Region>,
    initial_fields: Vec<String>,
    record: Option<Record>,
    use_cache: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            realm: None,
            region: None,
            initial_fields: Vec::new(),
            record: None,
            use_cache: true,
        }
    }
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Optional fields to include in the next request for the entity, also
    /// when it is already cached.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Seed a newly created record with data already at hand. Ignored when
    /// the identity is already cached.
    #[must_use]
    pub fn record(mut self, record: Record) -> Self {
        self.record = Some(record);
        self
    }

    /// `false` builds a private record that is neither read from nor stored
    /// in the session cache.
    #[must_use]
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

struct Inner {
    config: ClientConfig,
    locale: Option<Locale>,
    fetcher: Arc<dyn Fetcher>,
    cache: ObjectCache,
}

/// A client session against the community API.
///
/// Cloning is cheap; clones share the cache, so looking up the same
/// identity through any clone yields the same underlying record.
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use armory_client::{Armory, ClientConfig, Region};
///
/// let armory = Armory::new(ClientConfig::new(Region::EU).with_realm("Draenor"))?;
/// let character = armory.character("Jon")?;
/// println!("{} is level {}", character.name().await?, character.level().await?);
/// if let Some(guild) = character.guild().await? {
///     println!("<{}>", guild.name().await?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Armory {
    inner: Arc<Inner>,
}

impl fmt::Debug for Armory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Armory")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl Armory {
    /// Validate `config` and open a session over HTTPS.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ClientError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Open a session over a custom transport.
    pub fn with_fetcher(
        config: ClientConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> std::result::Result<Self, ClientError> {
        config.validate()?;
        let locale = config.session_locale()?;
        debug!(region = %config.region, ?locale, "armory session opened");

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                locale,
                fetcher,
                cache: ObjectCache::new(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn region(&self) -> Region {
        self.inner.config.region
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn realm(&self, name: &str) -> Result<Realm> {
        self.realm_in(name, self.region())
    }

    pub fn realm_in(&self, name: &str, region: Region) -> Result<Realm> {
        let record = self.lookup(EntityKey::realm(region, name), LookupOptions::default())?;
        Ok(Realm::new(self.clone(), record))
    }

    pub fn guild(&self, name: &str) -> Result<Guild> {
        self.guild_with(name, LookupOptions::default())
    }

    /// Look up a guild. `options` may preselect optional fields such as
    /// `members` to avoid a second request.
    pub fn guild_with(&self, name: &str, options: LookupOptions) -> Result<Guild> {
        let region = options.region.unwrap_or(self.region());
        let realm = self.realm_or_default(options.realm.as_deref())?;
        let record = self.lookup(EntityKey::guild(region, &realm, name), options)?;
        Ok(Guild::new(self.clone(), record))
    }

    pub fn character(&self, name: &str) -> Result<Character> {
        self.character_with(name, LookupOptions::default())
    }

    pub fn character_with(&self, name: &str, options: LookupOptions) -> Result<Character> {
        let region = options.region.unwrap_or(self.region());
        let realm = self.realm_or_default(options.realm.as_deref())?;
        let record = self.lookup(EntityKey::character(region, &realm, name), options)?;
        Ok(Character::new(self.clone(), record))
    }

    pub fn arena_team(&self, size: TeamSize, name: &str) -> Result<ArenaTeam> {
        self.arena_team_with(size, name, LookupOptions::default())
    }

    pub fn arena_team_with(
        &self,
        size: TeamSize,
        name: &str,
        options: LookupOptions,
    ) -> Result<ArenaTeam> {
        let region = options.region.unwrap_or(self.region());
        let realm = self.realm_or_default(options.realm.as_deref())?;
        let record = self.lookup(EntityKey::arena_team(region, &realm, size, name), options)?;
        Ok(ArenaTeam::new(self.clone(), record))
    }

    pub fn item(&self, id: u64) -> Result<Item> {
        self.item_in(id, self.region())
    }

    pub fn item_in(&self, id: u64, region: Region) -> Result<Item> {
        let record = self.lookup(EntityKey::item(region, id), LookupOptions::default())?;
        Ok(Item::new(self.clone(), record, id))
    }

    pub fn item_set(&self, id: u64) -> Result<ItemSet> {
        let record = self.lookup(EntityKey::item_set(self.region(), id), LookupOptions::default())?;
        Ok(ItemSet::new(self.clone(), record, id))
    }

    pub fn quest(&self, id: u64) -> Result<Quest> {
        self.quest_in(id, self.region())
    }

    pub fn quest_in(&self, id: u64, region: Region) -> Result<Quest> {
        let record = self.lookup(EntityKey::quest(region, id), LookupOptions::default())?;
        Ok(Quest::new(self.clone(), record, id))
    }

    pub fn achievement(&self, id: u64) -> Result<Achievement> {
        let record =
            self.lookup(EntityKey::achievement(self.region(), id), LookupOptions::default())?;
        Ok(Achievement::new(self.clone(), record, id))
    }

    /// Shared record for `key`, seeded with `record` if it is not cached yet.
    ///
    /// Only core fields are kept: embedded summaries reuse optional field
    /// names with other meanings, e.g. a guild summary's `members` count.
    pub(crate) fn seeded(&self, key: EntityKey, mut record: Record) -> Result<Arc<LazyRecord>> {
        let schema = Schema::for_kind(key.kind());
        record.retain(|field, _| !schema.is_optional(field));
        self.lookup(key, LookupOptions::default().record(record))
    }

    pub(crate) fn lookup(&self, key: EntityKey, options: LookupOptions) -> Result<Arc<LazyRecord>> {
        let config = self.record_config(key.region())?;
        let fetcher = Arc::clone(&self.inner.fetcher);
        let LookupOptions {
            initial_fields,
            record,
            use_cache,
            ..
        } = options;

        let declared = initial_fields.clone();
        let record = self.inner.cache.resolve(key, use_cache, move |key| {
            LazyRecord::builder(key, config, fetcher)
                .initial_fields(initial_fields)
                .record(record)
                .build()
        })?;
        // A cached record was built for an earlier lookup.
        record.declare_fields(&declared)?;
        Ok(record)
    }

    /// Record settings for `region`. The session locale is only sent where
    /// the region serves it.
    fn record_config(&self, region: Region) -> Result<RecordConfig> {
        let locale = self
            .inner
            .locale
            .clone()
            .filter(|locale| region.supports(locale));
        Ok(RecordConfig::new(self.inner.config.base_url(region)?)
            .with_locale(locale)
            .with_staleness(self.inner.config.staleness))
    }

    fn realm_or_default(&self, realm: Option<&str>) -> Result<String> {
        realm
            .or(self.inner.config.realm.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                ArmoryError::InvalidConfiguration(
                    "no realm given and no default realm configured".to_string(),
                )
            })
    }
}
