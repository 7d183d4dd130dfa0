//! Lazily resolved entity records.
//!
//! A [`LazyRecord`] owns the structured response for one entity, the set of
//! optional fields requested so far and the request target derived from
//! them. Nothing is fetched until a field is read.
//!
//! Reading a field goes through these steps:
//!
//! 1. Unknown names fail with [`ArmoryError::UnknownField`] without touching
//!    the network.
//! 2. If no record is held (or the held one is stale under the configured
//!    [`StalenessPolicy`]) the current target is fetched.
//! 3. If the field is present it is returned.
//! 4. If it is a declarable optional field not yet requested, it joins the
//!    requested set and the target is rebuilt. Whenever the held record was
//!    not fetched from the current target (it was supplied from embedded
//!    data, a field was declared after loading, or an earlier widening
//!    fetch failed) it is refetched once.
//! 5. A field that is still absent is a shape anomaly.
//!
//! The requested set only grows, and every refetch uses the current target,
//! so an optional field once read is part of every later refresh.
//!
//! State sits behind an async mutex held across the fetch. Concurrent
//! readers of one record are serialized and never lose a widening.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ArmoryError, FetchError, FetchFailure, Result};
use crate::fetch::Fetcher;
use crate::identity::{EntityKey, EntityKind};
use crate::region::{Locale, Region};
use crate::schema::{FieldClass, FieldSet, Schema};
use crate::target::RequestTarget;

/// Structured record as returned by the API.
pub type Record = Map<String, Value>;

/// When a fetched record is considered out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessPolicy {
    /// Records live as long as the session.
    #[default]
    Never,
    /// Reads refetch in place once the record is older than this.
    RefreshAfter(Duration),
}

impl StalenessPolicy {
    pub fn is_stale(self, fetched_at: Instant) -> bool {
        match self {
            Self::Never => false,
            Self::RefreshAfter(max_age) => fetched_at.elapsed() >= max_age,
        }
    }
}

/// Per-record request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    pub base_url: Url,
    pub locale: Option<Locale>,
    pub staleness: StalenessPolicy,
}

impl RecordConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            locale: None,
            staleness: StalenessPolicy::Never,
        }
    }

    /// Configuration for the region's public API base.
    pub fn for_region(region: Region) -> Result<Self> {
        let base_url = Url::parse(region.api_base())
            .map_err(|e| ArmoryError::InvalidConfiguration(format!("API base for {region}: {e}")))?;
        Ok(Self::new(base_url))
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn with_staleness(mut self, staleness: StalenessPolicy) -> Self {
        self.staleness = staleness;
        self
    }
}

/// Where the held record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Fetched from the current request target
    Fetched,
    /// Embedded data handed over at construction
    Supplied,
}

struct RecordState {
    record: Option<Record>,
    provenance: Provenance,
    fields: FieldSet,
    target: RequestTarget,
    /// Target the held record was fetched from; `None` until a fetch
    /// succeeds.
    fetched_target: Option<RequestTarget>,
    last_modified: Option<u64>,
    fetched_at: Option<Instant>,
}

impl RecordState {
    fn needs_fetch(&self, staleness: StalenessPolicy) -> bool {
        match (&self.record, self.fetched_at) {
            (None, _) => true,
            (Some(_), Some(fetched_at)) => staleness.is_stale(fetched_at),
            (Some(_), None) => false,
        }
    }

    fn lookup(&self, field: &str) -> Option<&Value> {
        self.record.as_ref().and_then(|record| record.get(field))
    }

    /// Whether the held record answers the current target. Supplied records
    /// and records fetched before the last widening do not.
    fn is_current(&self) -> bool {
        self.fetched_target.as_ref() == Some(&self.target)
    }
}

/// Shared, lazily populated record for one remote entity.
pub struct LazyRecord {
    key: EntityKey,
    schema: &'static Schema,
    config: RecordConfig,
    fetcher: Arc<dyn Fetcher>,
    state: Mutex<RecordState>,
    /// Fields declared without the state lock, merged on next access
    declared: parking_lot::Mutex<Vec<&'static str>>,
}

impl fmt::Debug for LazyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRecord")
            .field("key", &self.key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for records that start with requested fields or embedded data.
pub struct LazyRecordBuilder {
    key: EntityKey,
    config: RecordConfig,
    fetcher: Arc<dyn Fetcher>,
    initial_fields: Vec<String>,
    record: Option<Record>,
}

impl LazyRecordBuilder {
    /// Optional fields to request with the first fetch. Core field names are
    /// accepted and ignored; unknown names fail the build.
    #[must_use]
    pub fn initial_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Seed the record with already fetched data.
    #[must_use]
    pub fn record(mut self, record: Option<Record>) -> Self {
        self.record = record;
        self
    }

    pub fn build(self) -> Result<LazyRecord> {
        let schema = Schema::for_kind(self.key.kind());
        let mut fields = FieldSet::new();
        for name in &self.initial_fields {
            match schema.classify(name) {
                Some(FieldClass::Optional(field)) => {
                    fields.insert(field);
                }
                Some(FieldClass::Core) => {}
                None => {
                    return Err(ArmoryError::UnknownField {
                        kind: self.key.kind(),
                        field: name.clone(),
                    });
                }
            }
        }

        let target = RequestTarget::build(
            &self.config.base_url,
            &self.key,
            self.config.locale.as_ref(),
            &fields,
        )?;
        let last_modified = self
            .record
            .as_ref()
            .and_then(|record| record.get("lastModified"))
            .and_then(Value::as_u64);

        Ok(LazyRecord {
            key: self.key,
            schema,
            config: self.config,
            fetcher: self.fetcher,
            state: Mutex::new(RecordState {
                record: self.record,
                provenance: Provenance::Supplied,
                fields,
                target,
                fetched_target: None,
                last_modified,
                fetched_at: None,
            }),
            declared: parking_lot::Mutex::new(Vec::new()),
        })
    }
}

impl LazyRecord {
    pub fn new(key: EntityKey, config: RecordConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Self::builder(key, config, fetcher).build()
    }

    pub fn builder(
        key: EntityKey,
        config: RecordConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> LazyRecordBuilder {
        LazyRecordBuilder {
            key,
            config,
            fetcher,
            initial_fields: Vec::new(),
            record: None,
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.key.kind()
    }

    pub fn region(&self) -> Region {
        self.key.region()
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    /// Read a field, fetching or widening the request as needed.
    ///
    /// A field that is still absent after that is a
    /// [`ArmoryError::ShapeAnomaly`].
    pub async fn get_field(&self, name: &str) -> Result<Value> {
        let mut state = self.lock_state().await;
        match self.resolve(&mut state, name).await? {
            Some(value) => Ok(value),
            None => Err(ArmoryError::shape(
                self.kind(),
                name,
                format!("absent from response for {}", state.target),
            )),
        }
    }

    /// Like [`get_field`](Self::get_field), but a field the server
    /// legitimately leaves out (an unguilded character's `guild`) is `None`.
    pub async fn get_field_opt(&self, name: &str) -> Result<Option<Value>> {
        let mut state = self.lock_state().await;
        self.resolve(&mut state, name).await
    }

    /// Read and decode a field.
    pub async fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.get_field(name).await?;
        self.decode(name, value)
    }

    /// Read and decode a field that may be absent. JSON `null` is absent too.
    pub async fn get_opt_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get_field_opt(name).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.decode(name, value).map(Some),
        }
    }

    /// Declare an optional field ahead of the next fetch. Returns `false` if
    /// it was already requested. Does not fetch.
    pub async fn add_field(&self, name: &str) -> Result<bool> {
        let field = match self.schema.classify(name) {
            Some(FieldClass::Optional(field)) => field,
            _ => return Err(self.unknown(name)),
        };
        let mut state = self.lock_state().await;
        self.widen(&mut state, field)
    }

    /// Declare optional fields without waiting for the record.
    ///
    /// Names are checked immediately: unknown names fail, core names are
    /// ignored. The fields join the requested set before the next read.
    pub fn declare_fields<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Vec::new();
        for name in names {
            match self.schema.classify(name.as_ref()) {
                Some(FieldClass::Optional(field)) => fields.push(field),
                Some(FieldClass::Core) => {}
                None => return Err(self.unknown(name.as_ref())),
            }
        }
        self.declared.lock().extend(fields);
        Ok(())
    }

    /// Refetch from the current target and replace the whole record.
    pub async fn force_refresh(&self) -> Result<()> {
        let mut state = self.lock_state().await;
        self.fetch_into(&mut state).await
    }

    /// Copy of the current record, fetching it first if none is held.
    pub async fn snapshot(&self) -> Result<Record> {
        let mut state = self.lock_state().await;
        if state.needs_fetch(self.config.staleness) {
            self.fetch_into(&mut state).await?;
        }
        Ok(state.record.clone().unwrap_or_default())
    }

    pub async fn requested_fields(&self) -> FieldSet {
        self.lock_state().await.fields.clone()
    }

    pub async fn request_target(&self) -> RequestTarget {
        self.lock_state().await.target.clone()
    }

    /// `lastModified` marker of the most recent response that carried one.
    pub async fn last_modified(&self) -> Option<u64> {
        self.lock_state().await.last_modified
    }

    pub async fn is_loaded(&self) -> bool {
        self.lock_state().await.record.is_some()
    }

    pub async fn provenance(&self) -> Option<Provenance> {
        let state = self.lock_state().await;
        state.record.as_ref().map(|_| state.provenance)
    }

    async fn lock_state(&self) -> MutexGuard<'_, RecordState> {
        let mut state = self.state.lock().await;
        let declared = std::mem::take(&mut *self.declared.lock());
        for field in declared {
            if let Err(e) = self.widen(&mut state, field) {
                warn!(key = %self.key, field, error = %e, "declared field dropped");
            }
        }
        state
    }

    async fn resolve(&self, state: &mut RecordState, name: &str) -> Result<Option<Value>> {
        let class = self.schema.classify(name).ok_or_else(|| self.unknown(name))?;

        if state.needs_fetch(self.config.staleness) {
            if state.record.is_some() {
                debug!(key = %self.key, "record is stale, refreshing");
            }
            self.fetch_into(state).await?;
        }

        if let Some(value) = state.lookup(name).cloned() {
            // A present optional field joins the requested set so later
            // refreshes keep returning it.
            if let FieldClass::Optional(field) = class {
                self.widen(state, field)?;
            }
            return Ok(Some(value));
        }

        let widened = match class {
            FieldClass::Optional(field) => self.widen(state, field)?,
            FieldClass::Core => false,
        };
        if !state.is_current() {
            debug!(key = %self.key, field = name, widened, "field missing, refetching");
            self.fetch_into(state).await?;
            return Ok(state.lookup(name).cloned());
        }

        Ok(None)
    }

    fn widen(&self, state: &mut RecordState, field: &'static str) -> Result<bool> {
        if state.fields.contains(field) {
            return Ok(false);
        }
        let mut fields = state.fields.clone();
        fields.insert(field);
        let target = RequestTarget::build(
            &self.config.base_url,
            &self.key,
            self.config.locale.as_ref(),
            &fields,
        )?;
        debug!(key = %self.key, field, %target, "requested fields widened");
        state.fields = fields;
        state.target = target;
        Ok(true)
    }

    async fn fetch_into(&self, state: &mut RecordState) -> Result<()> {
        debug!(key = %self.key, target = %state.target, "fetching record");
        let body = self.fetcher.fetch(&state.target).await.inspect_err(|e| {
            warn!(key = %self.key, error = %e, "fetch failed");
        })?;
        let record = self.unwrap_response(body, &state.target)?;

        if let Some(marker) = record.get("lastModified").and_then(Value::as_u64) {
            state.last_modified = Some(marker);
        }
        state.record = Some(record);
        state.fetched_target = Some(state.target.clone());
        state.provenance = Provenance::Fetched;
        state.fetched_at = Some(Instant::now());
        Ok(())
    }

    fn unwrap_response(&self, body: Value, target: &RequestTarget) -> Result<Record> {
        let body = match body {
            Value::Object(record) => record,
            other => {
                return Err(FetchError::new(
                    target.as_str(),
                    FetchFailure::MalformedBody(format!("expected a JSON object, got {other}")),
                )
                .into());
            }
        };

        if self.kind() != EntityKind::Realm {
            return Ok(body);
        }

        // Realm status wraps the single requested realm in a list.
        match body.get("realms") {
            Some(Value::Array(realms)) => match realms.first() {
                Some(Value::Object(realm)) => Ok(realm.clone()),
                _ => Err(ArmoryError::shape(
                    EntityKind::Realm,
                    "realms",
                    format!("no realm in response for {target}"),
                )),
            },
            _ => Ok(body),
        }
    }

    fn decode<T: DeserializeOwned>(&self, name: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| ArmoryError::shape(self.kind(), name, e.to_string()))
    }

    fn unknown(&self, name: &str) -> ArmoryError {
        ArmoryError::UnknownField {
            kind: self.kind(),
            field: name.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    const CHARACTER_PATH: &str = "/api/wow/character/draenor/jon";

    fn character(fetcher: &Arc<StaticFetcher>) -> LazyRecord {
        LazyRecord::new(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(fetcher) as Arc<dyn Fetcher>,
        )
        .expect("Record should build")
    }

    fn profile() -> Value {
        json!({
            "lastModified": 1_357_000_000_000_u64,
            "name": "Jon",
            "realm": "Draenor",
            "class": 8,
            "race": 1,
            "level": 85
        })
    }

    fn fetcher_with(body: Value) -> Arc<StaticFetcher> {
        let fetcher = Arc::new(StaticFetcher::new());
        fetcher.respond(CHARACTER_PATH, body);
        fetcher
    }

    #[tokio::test]
    async fn test_nothing_is_fetched_until_read() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);
        assert!(!record.is_loaded().await);
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_core_field_fetches_once() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);

        assert_eq!(record.get_field("name").await.unwrap(), json!("Jon"));
        assert_eq!(record.get_field("level").await.unwrap(), json!(85));
        assert_eq!(fetcher.fetch_count(), 1);
        assert!(record.requested_fields().await.is_empty());
        assert_eq!(record.last_modified().await, Some(1_357_000_000_000));
        assert_eq!(record.provenance().await, Some(Provenance::Fetched));
    }

    #[tokio::test]
    async fn test_optional_field_widens_and_refetches_once() {
        let fetcher = fetcher_with(profile());
        fetcher.respond(
            "https://eu.battle.net/api/wow/character/draenor/jon?fields=guild",
            json!({"name": "Jon", "guild": {"name": "Foo", "realm": "Draenor"}}),
        );
        let record = character(&fetcher);

        record.get_field("name").await.unwrap();
        let guild = record.get_field("guild").await.expect("Guild should resolve");
        assert_eq!(guild["name"], json!("Foo"));
        assert_eq!(fetcher.fetch_count(), 2);
        assert_eq!(record.requested_fields().await.as_slice(), &["guild"]);
        assert!(record.request_target().await.as_str().ends_with("fields=guild"));

        // Already held: no further fetch.
        record.get_field("guild").await.unwrap();
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_field_fails_without_fetching() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);

        let err = record.get_field("members").await.expect_err("Test operation should fail");
        assert!(matches!(err, ArmoryError::UnknownField { kind: EntityKind::Character, .. }));
        assert_eq!(fetcher.fetch_count(), 0);
        assert!(record.add_field("nonsense").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_core_field_is_shape_anomaly() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);

        let err = record.get_field("battlegroup").await.expect_err("Test operation should fail");
        assert!(matches!(err, ArmoryError::ShapeAnomaly { .. }));
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_optional_field_absent_after_widening() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);

        assert_eq!(record.get_field_opt("guild").await.unwrap(), None);
        assert_eq!(fetcher.fetch_count(), 2);
        assert!(matches!(
            record.get_field("guild").await,
            Err(ArmoryError::ShapeAnomaly { .. })
        ));
        // Already requested, so no third fetch.
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_widened_fields_survive_refresh() {
        let fetcher = fetcher_with(profile());
        fetcher.respond(
            "https://eu.battle.net/api/wow/character/draenor/jon?fields=titles",
            json!({"name": "Jon", "titles": []}),
        );
        let record = character(&fetcher);

        record.get_field("titles").await.unwrap();
        record.get_field_opt("pvp").await.unwrap();
        record.force_refresh().await.unwrap();

        let requests = fetcher.requests();
        assert!(requests[2].ends_with("fields=titles,pvp"));
        assert!(requests[3].ends_with("fields=titles,pvp"));
    }

    #[tokio::test]
    async fn test_force_refresh_replaces_whole_record() {
        let fetcher = fetcher_with(json!({"name": "Jon", "level": 84, "stale": true}));
        let record = character(&fetcher);
        assert_eq!(record.get_field("level").await.unwrap(), json!(84));

        fetcher.respond(CHARACTER_PATH, json!({"name": "Jon", "level": 85}));
        record.force_refresh().await.unwrap();

        let snapshot = record.snapshot().await.unwrap();
        assert_eq!(snapshot.get("level"), Some(&json!(85)));
        assert!(!snapshot.contains_key("stale"));
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_supplied_record_serves_reads_without_fetching() {
        let fetcher = fetcher_with(profile());
        let embedded = json!({"name": "Jon", "level": 85, "realm": "Draenor"});
        let record = LazyRecord::builder(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .record(embedded.as_object().cloned())
        .build()
        .unwrap();

        assert_eq!(record.get_field("level").await.unwrap(), json!(85));
        assert_eq!(fetcher.fetch_count(), 0);
        assert_eq!(record.provenance().await, Some(Provenance::Supplied));

        // Embedded data lacks the class, so the full profile is fetched once.
        assert_eq!(record.get_field("class").await.unwrap(), json!(8));
        assert_eq!(fetcher.fetch_count(), 1);
        assert_eq!(record.provenance().await, Some(Provenance::Fetched));
    }

    #[tokio::test]
    async fn test_supplied_optional_field_joins_requested_set() {
        let fetcher = fetcher_with(profile());
        let embedded = json!({"name": "Jon", "guild": {"name": "Foo"}});
        let record = LazyRecord::builder(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .record(embedded.as_object().cloned())
        .build()
        .unwrap();

        record.get_field("guild").await.unwrap();
        assert_eq!(fetcher.fetch_count(), 0);
        assert_eq!(record.requested_fields().await.as_slice(), &["guild"]);
    }

    #[tokio::test]
    async fn test_initial_fields_shape_first_target() {
        let fetcher = fetcher_with(profile());
        let locale = Locale::parse("en_GB").unwrap();
        let record = LazyRecord::builder(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU).unwrap().with_locale(Some(locale)),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .initial_fields(["stats", "name", "talents"])
        .build()
        .unwrap();

        assert_eq!(
            record.request_target().await.as_str(),
            "https://eu.battle.net/api/wow/character/draenor/jon?locale=en_GB&fields=stats,talents"
        );

        let err = LazyRecord::builder(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .initial_fields(["members"])
        .build()
        .expect_err("Guild fields are unknown to characters");
        assert!(matches!(err, ArmoryError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_add_field_rebuilds_target_without_fetching() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);

        assert!(record.add_field("mounts").await.unwrap());
        assert!(!record.add_field("mounts").await.unwrap());
        assert!(record.request_target().await.as_str().ends_with("?fields=mounts"));
        assert_eq!(fetcher.fetch_count(), 0);
        assert!(record.add_field("name").await.is_err());
    }

    #[tokio::test]
    async fn test_field_declared_after_load_is_fetched() {
        let fetcher = fetcher_with(profile());
        fetcher.respond(
            "https://eu.battle.net/api/wow/character/draenor/jon?fields=mounts",
            json!({"name": "Jon", "mounts": [458, 459]}),
        );
        let record = character(&fetcher);

        record.get_field("name").await.unwrap();
        assert!(record.add_field("mounts").await.unwrap());
        assert_eq!(record.get_field("mounts").await.unwrap(), json!([458, 459]));
        assert_eq!(fetcher.fetch_count(), 2);
        assert!(fetcher.last_request().unwrap().ends_with("?fields=mounts"));
    }

    #[tokio::test]
    async fn test_declared_fields_join_before_next_read() {
        let fetcher = fetcher_with(profile());
        fetcher.respond(
            "https://eu.battle.net/api/wow/character/draenor/jon?fields=titles,pets",
            json!({"name": "Jon", "titles": [], "pets": []}),
        );
        let record = character(&fetcher);
        record.get_field("name").await.unwrap();

        assert!(matches!(
            record.declare_fields(["titles", "members"]),
            Err(ArmoryError::UnknownField { .. })
        ));
        record.declare_fields(["titles", "level", "pets"]).unwrap();
        assert_eq!(record.requested_fields().await.as_slice(), &["titles", "pets"]);
        assert_eq!(fetcher.fetch_count(), 1);

        assert_eq!(record.get_field("pets").await.unwrap(), json!([]));
        assert_eq!(fetcher.fetch_count(), 2);
        assert!(fetcher.last_request().unwrap().ends_with("?fields=titles,pets"));
    }

    #[tokio::test]
    async fn test_failed_widening_is_retried_on_next_read() {
        const WITH_GUILD: &str = "https://eu.battle.net/api/wow/character/draenor/jon?fields=guild";
        let fetcher = fetcher_with(profile());
        fetcher.fail(WITH_GUILD, FetchFailure::Unreachable("down".to_string()));
        let record = character(&fetcher);

        record.get_field("name").await.unwrap();
        let err = record.get_field("guild").await.expect_err("Test operation should fail");
        assert!(err.is_fetch());
        assert_eq!(fetcher.fetch_count(), 2);

        fetcher.respond(WITH_GUILD, json!({"name": "Jon", "guild": {"name": "Foo"}}));
        let guild = record.get_field("guild").await.expect("Guild should resolve");
        assert_eq!(guild["name"], json!("Foo"));
        assert_eq!(fetcher.fetch_count(), 3);
        assert_eq!(fetcher.last_request().unwrap(), WITH_GUILD);

        // Held record now answers the current target.
        record.get_field("guild").await.unwrap();
        assert_eq!(fetcher.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_realm_response_is_unwrapped() {
        let fetcher = Arc::new(StaticFetcher::new());
        fetcher.respond(
            "/api/wow/realm/status",
            json!({"realms": [{"name": "Draenor", "slug": "draenor", "status": true}]}),
        );
        let record = LazyRecord::new(
            EntityKey::realm(Region::EU, "Draenor"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .unwrap();

        assert_eq!(record.get_field("slug").await.unwrap(), json!("draenor"));
        assert!(record.get_as::<bool>("status").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_realm_list_is_shape_anomaly() {
        let fetcher = Arc::new(StaticFetcher::new());
        fetcher.respond("/api/wow/realm/status", json!({"realms": []}));
        let record = LazyRecord::new(
            EntityKey::realm(Region::EU, "Nowhere"),
            RecordConfig::for_region(Region::EU).unwrap(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .unwrap();

        assert!(matches!(
            record.get_field("name").await,
            Err(ArmoryError::ShapeAnomaly { kind: EntityKind::Realm, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let fetcher = Arc::new(StaticFetcher::new());
        fetcher.fail(
            CHARACTER_PATH,
            FetchFailure::Status {
                code: 404,
                reason: Some("Character not found.".to_string()),
            },
        );
        let record = character(&fetcher);

        let err = record.get_field("name").await.expect_err("Test operation should fail");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("Character not found."));
        assert!(!record.is_loaded().await);
    }

    #[tokio::test]
    async fn test_non_object_body_is_malformed() {
        let fetcher = fetcher_with(json!(["not", "a", "record"]));
        let record = character(&fetcher);
        let err = record.get_field("name").await.expect_err("Test operation should fail");
        assert!(matches!(
            err,
            ArmoryError::Fetch(FetchError {
                failure: FetchFailure::MalformedBody(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_shape_anomaly() {
        let fetcher = fetcher_with(profile());
        let record = character(&fetcher);
        assert!(matches!(
            record.get_as::<String>("level").await,
            Err(ArmoryError::ShapeAnomaly { .. })
        ));
        assert_eq!(record.get_opt_as::<u32>("level").await.unwrap(), Some(85));
    }

    #[tokio::test]
    async fn test_staleness_policy_refreshes_in_place() {
        let fetcher = fetcher_with(profile());
        let record = LazyRecord::new(
            EntityKey::character(Region::EU, "Draenor", "Jon"),
            RecordConfig::for_region(Region::EU)
                .unwrap()
                .with_staleness(StalenessPolicy::RefreshAfter(Duration::ZERO)),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        )
        .unwrap();

        record.get_field("name").await.unwrap();
        record.get_field("name").await.unwrap();
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_widening_is_not_lost() {
        let fetcher = fetcher_with(profile());
        let record = Arc::new(character(&fetcher));

        let reads = ["guild", "titles", "pvp", "mounts"].map(|field| {
            let record = Arc::clone(&record);
            tokio::spawn(async move { record.get_field_opt(field).await })
        });
        for read in futures::future::join_all(reads).await {
            read.expect("Task should not panic").expect("Read should succeed");
        }

        let fields = record.requested_fields().await;
        assert_eq!(fields.len(), 4);
        for field in ["guild", "titles", "pvp", "mounts"] {
            assert!(fields.contains(field));
        }
    }

    proptest! {
        #[test]
        fn prop_requested_fields_only_grow(picks in proptest::collection::vec(0usize..20, 1..12)) {
            let names = [
                "name", "level", "guild", "stats", "feed", "talents", "items", "reputation",
                "titles", "professions", "appearance", "companions", "mounts", "pets",
                "achievements", "progression", "pvp", "quests", "bogus", "class",
            ];
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let fetcher = fetcher_with(profile());
                let record = character(&fetcher);
                let mut previous = record.requested_fields().await;
                for pick in picks {
                    let _ = record.get_field_opt(names[pick]).await;
                    let current = record.requested_fields().await;
                    prop_assert!(current.is_superset(&previous));
                    previous = current;
                }
                Ok(())
            })?;
        }
    }
}
