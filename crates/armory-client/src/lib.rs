//! # armory-client
//!
//! Typed client for the World of Warcraft community API.
//!
//! An [`Armory`] session owns the configuration, an HTTP transport and the
//! object cache. Entity lookups return cheap handles that fetch on first
//! read:
//!
//! ```rust,no_run
//! use armory_client::{Armory, ClientConfig, LookupOptions, Region};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let armory = Armory::new(ClientConfig::new(Region::EU).with_realm("Aggra (Português)"))?;
//!
//! // One request for the basic profile.
//! let character = armory.character("Jon")?;
//! println!("level {}", character.level().await?);
//!
//! // `guild` is an optional section: one more request with `fields=guild`.
//! if let Some(guild) = character.guild().await? {
//!     // The roster shares records with every other lookup in the session.
//!     for member in guild.members().await? {
//!         println!("{} {}", member.rank, member.character.name().await?);
//!     }
//! }
//!
//! // Preselect optional sections to avoid the extra request.
//! let guild = armory.guild_with("Foo", LookupOptions::new().fields(["members"]))?;
//! # let _ = guild;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`ClientConfig`] can be built in code or read from `ARMORY_*`
//! environment variables with [`ClientConfig::from_env`]. The locale must be
//! one the region serves; lookups in another region drop it.
//!
//! ## Errors
//!
//! Lookups and accessors return [`armory_core::ArmoryError`]. Opening a
//! session may also fail while building the HTTP client, see
//! [`ClientError`].

pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod media;
pub mod money;
pub mod session;
pub mod transport;

pub use armory_core::{
    ArmoryError, CacheStats, CharacterField, FetchError, FetchFailure, Fetcher, GuildField,
    Locale, Region, StalenessPolicy, StaticFetcher, TeamSize, realm_slug,
};
pub use config::ClientConfig;
pub use entities::{
    Achievement, ArenaTeam, Character, Entity, Guild, Item, ItemSet, Quest, Realm,
};
pub use error::{ClientError, Result};
pub use game::{
    Class, Faction, Gender, IconSize, ItemQuality, Population, PvpZoneStatus, Race, RealmType,
    Standing,
};
pub use money::Money;
pub use session::{Armory, LookupOptions};
pub use transport::{HttpFetcher, ensure_crypto_provider};
