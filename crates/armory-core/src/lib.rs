//! Lazy resolution and identity caching for the WoW community API.
//!
//! This crate holds the transport-independent core shared by every entity
//! the API exposes:
//!
//! - [`LazyRecord`]: a per-entity record that fetches on first read, widens
//!   the `fields=` request parameter when an optional field is asked for, and
//!   never drops a field it has requested.
//! - [`ObjectCache`]: a session-wide map from [`EntityKey`] to one shared
//!   `LazyRecord`, so field accumulation is visible to every holder.
//! - [`RequestTarget`]: deterministic request URLs derived from identity,
//!   locale and requested fields.
//! - [`realm_slug`]: idempotent realm name canonicalization.
//!
//! # Data flow
//!
//! ```text
//! lookup(region, realm, name)
//!        │
//!        ▼
//!   EntityKey (normalized) ──► ObjectCache ──hit──► Arc<LazyRecord>
//!                                   │ miss
//!                                   ▼
//!                          LazyRecord::new ──► cached, returned
//!
//! record.get_field("guild")
//!        │
//!        ├─ no record ──► Fetcher::fetch(target)
//!        ├─ present   ──► value
//!        └─ missing optional ──► widen fields, rebuild target, refetch once
//! ```
//!
//! # Errors
//!
//! All operations return [`ArmoryError`]. Nothing is retried: fetch failures,
//! unknown fields and shape anomalies are surfaced to the immediate caller.
//!
//! # Transport
//!
//! [`Fetcher`] abstracts the provider. The `armory-client` crate implements it
//! over HTTP; [`StaticFetcher`] serves canned responses.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod record;
pub mod region;
pub mod schema;
pub mod slug;
pub mod target;

pub use cache::{CacheStats, ObjectCache};
pub use error::{ArmoryError, FetchError, FetchFailure, Result};
pub use fetch::{Fetcher, StaticFetcher};
pub use identity::{DataResource, EntityId, EntityKey, EntityKind, TeamSize};
pub use record::{LazyRecord, LazyRecordBuilder, Provenance, Record, RecordConfig, StalenessPolicy};
pub use region::{Locale, Region};
pub use schema::{CharacterField, FieldClass, FieldSet, GuildField, Schema};
pub use slug::realm_slug;
pub use target::RequestTarget;
