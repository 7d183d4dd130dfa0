//! Typed handles over shared lazy records.
//!
//! An entity is a session plus the [`LazyRecord`] cached for its identity.
//! Accessors are async because the first read of a field may fetch it.
//! Handles are cheap to clone and two handles for the same identity share
//! one record, so a field resolved through one is visible through the other.

macro_rules! entity {
    (@common $name:ident) => {
        impl $name {
            /// Session this handle was looked up through.
            pub fn session(&self) -> &$crate::session::Armory {
                &self.session
            }
        }

        impl $crate::entities::Entity for $name {
            fn record(&self) -> &::std::sync::Arc<::armory_core::LazyRecord> {
                &self.record
            }
        }
    };

    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            session: $crate::session::Armory,
            record: ::std::sync::Arc<::armory_core::LazyRecord>,
        }

        impl $name {
            pub(crate) fn new(
                session: $crate::session::Armory,
                record: ::std::sync::Arc<::armory_core::LazyRecord>,
            ) -> Self {
                Self { session, record }
            }
        }

        entity!(@common $name);
    };

    // Entities addressed by a numeric id keep it beside the record.
    ($(#[$meta:meta])* $name:ident(id)) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            session: $crate::session::Armory,
            record: ::std::sync::Arc<::armory_core::LazyRecord>,
            id: u64,
        }

        impl $name {
            pub(crate) fn new(
                session: $crate::session::Armory,
                record: ::std::sync::Arc<::armory_core::LazyRecord>,
                id: u64,
            ) -> Self {
                Self { session, record, id }
            }

            /// Id the entity was looked up by. Never fetches.
            pub fn id(&self) -> u64 {
                self.id
            }
        }

        entity!(@common $name);
    };
}

mod achievement;
mod arena;
mod character;
mod data;
mod guild;
mod item;
mod quest;
mod realm;

pub use achievement::{Achievement, Criterion};
pub use arena::{ArenaTeam, ArenaTeamMember};
pub use character::{
    Appearance, ArenaTeamSummary, Character, Glyph, Pet, Profession, Professions,
    RatedBattleground, Reputation, TalentSpec, TalentTree, Title,
};
pub use data::{Battlegroup, ClassInfo, RaceInfo};
pub use guild::{Guild, GuildEmblem, GuildMember};
pub use item::{
    BonusStat, Damage, Item, ItemSet, ItemSource, ItemSpell, RequiredAbility, SetBonus, SocketInfo,
    SpellInfo, WeaponInfo,
};
pub use quest::Quest;
pub use realm::{PvpZone, Realm};

use armory_core::{EntityKey, LazyRecord, Region};
use std::sync::Arc;

/// Access shared by every entity handle.
pub trait Entity {
    fn record(&self) -> &Arc<LazyRecord>;

    fn key(&self) -> &EntityKey {
        self.record().key()
    }

    fn region(&self) -> Region {
        self.key().region()
    }

    /// Whether both handles read through the same cached record.
    fn is_same<E: Entity + ?Sized>(&self, other: &E) -> bool {
        Arc::ptr_eq(self.record(), other.record())
    }
}
