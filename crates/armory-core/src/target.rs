//! Request target construction.
//!
//! A target is a pure function of the API base, entity identity, locale and
//! requested optional fields:
//!
//! ```text
//! <base>/character/<realm>/<name>?locale=<locale>&fields=<f1>,<f2>
//! <base>/realm/status?realms=<slug>&locale=<locale>
//! ```
//!
//! `locale` is omitted when unset and `fields` when no optional field has
//! been requested. Fields appear in the order they were added.

use std::fmt;
use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::error::{ArmoryError, Result};
use crate::identity::{EntityId, EntityKey, EntityKind};
use crate::region::Locale;
use crate::schema::FieldSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTarget {
    url: Url,
}

impl RequestTarget {
    pub fn build(
        base: &Url,
        key: &EntityKey,
        locale: Option<&Locale>,
        fields: &FieldSet,
    ) -> Result<Self> {
        let mut url = base.clone();
        let realm = move || {
            key.realm_slug().ok_or_else(|| {
                ArmoryError::InvalidIdentifier(format!("{key} has no realm"))
            })
        };

        let mut query: Vec<(&str, String)> = Vec::with_capacity(3);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ArmoryError::InvalidConfiguration(format!("API base URL {base} cannot carry a path"))
            })?;
            segments.pop_if_empty();

            match (key.kind(), key.id()) {
                (EntityKind::Realm, EntityId::Name(slug)) => {
                    segments.extend(["realm", "status"]);
                    query.push(("realms", escape(slug)));
                }
                (EntityKind::Guild, EntityId::Name(name)) => {
                    segments.extend(["guild", realm()?, name.as_str()]);
                }
                (EntityKind::Character, EntityId::Name(name)) => {
                    segments.extend(["character", realm()?, name.as_str()]);
                }
                (EntityKind::ArenaTeam, EntityId::Team { size, name }) => {
                    segments.extend(["arena", realm()?, size.as_str(), name.as_str()]);
                }
                (EntityKind::Item, EntityId::Numeric(id)) => {
                    segments.extend(["item", id.to_string().as_str()]);
                }
                (EntityKind::ItemSet, EntityId::Numeric(id)) => {
                    segments.extend(["item", "set", id.to_string().as_str()]);
                }
                (EntityKind::Quest, EntityId::Numeric(id)) => {
                    segments.extend(["quest", id.to_string().as_str()]);
                }
                (EntityKind::Achievement, EntityId::Numeric(id)) => {
                    segments.extend(["achievement", id.to_string().as_str()]);
                }
                (EntityKind::Data, EntityId::Data(resource)) => {
                    segments.extend(resource.segments());
                }
                (kind, id) => {
                    return Err(ArmoryError::InvalidIdentifier(format!(
                        "{kind} cannot be addressed by '{id}'"
                    )));
                }
            }
        }

        if let Some(locale) = locale {
            query.push(("locale", escape(locale.as_str())));
        }
        if !fields.is_empty() {
            query.push(("fields", fields.query_value()));
        }

        // Built by hand: form encoding would escape the comma separator of
        // `fields`, whose names come from the schema and need no escaping.
        if query.is_empty() {
            url.set_query(None);
        } else {
            let query = query
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

fn escape(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::{DataResource, TeamSize};
    use crate::region::Region;
    use pretty_assertions::assert_eq;

    fn eu_base() -> Url {
        Url::parse(Region::EU.api_base()).unwrap()
    }

    fn fields(names: &[&'static str]) -> FieldSet {
        let mut set = FieldSet::new();
        for name in names {
            set.insert(*name);
        }
        set
    }

    #[test]
    fn test_character_target_with_fields() {
        let key = EntityKey::character(Region::EU, "Aggra (Português)", "Jon");
        let locale = Locale::parse("en_gb").unwrap();
        let target = RequestTarget::build(&eu_base(), &key, Some(&locale), &fields(&["guild", "titles"]))
            .expect("Target should build");
        assert_eq!(
            target.as_str(),
            "https://eu.battle.net/api/wow/character/aggra-portugues/jon?locale=en_GB&fields=guild,titles"
        );
    }

    #[test]
    fn test_no_fields_no_locale_has_no_query() {
        let key = EntityKey::guild(Region::EU, "Bar", "Foo");
        let target = RequestTarget::build(&eu_base(), &key, None, &FieldSet::new()).unwrap();
        assert_eq!(target.as_str(), "https://eu.battle.net/api/wow/guild/bar/foo");
    }

    #[test]
    fn test_fields_without_locale() {
        let key = EntityKey::guild(Region::EU, "Bar", "Foo");
        let target = RequestTarget::build(&eu_base(), &key, None, &fields(&["members"])).unwrap();
        assert_eq!(
            target.as_str(),
            "https://eu.battle.net/api/wow/guild/bar/foo?fields=members"
        );
    }

    #[test]
    fn test_realm_target_uses_status_query() {
        let key = EntityKey::realm(Region::EU, "Twisting Nether");
        let locale = Locale::parse("de_DE").unwrap();
        let target = RequestTarget::build(&eu_base(), &key, Some(&locale), &FieldSet::new()).unwrap();
        assert_eq!(
            target.as_str(),
            "https://eu.battle.net/api/wow/realm/status?realms=twisting-nether&locale=de_DE"
        );
    }

    #[test]
    fn test_numeric_and_data_paths() {
        let base = Url::parse(Region::US.api_base()).unwrap();
        let cases = [
            (EntityKey::item(Region::US, 19019), "item/19019"),
            (EntityKey::item_set(Region::US, 1060), "item/set/1060"),
            (EntityKey::quest(Region::US, 13146), "quest/13146"),
            (EntityKey::achievement(Region::US, 2144), "achievement/2144"),
            (
                EntityKey::data(Region::US, DataResource::CharacterRaces),
                "data/character/races",
            ),
            (
                EntityKey::data(Region::US, DataResource::Battlegroups),
                "data/battlegroups/",
            ),
            (
                EntityKey::arena_team(Region::US, "Draenor", TeamSize::TwoVsTwo, "Foo"),
                "arena/draenor/2v2/foo",
            ),
        ];
        for (key, path) in cases {
            let target = RequestTarget::build(&base, &key, None, &FieldSet::new()).unwrap();
            assert_eq!(target.as_str(), format!("https://us.battle.net/api/wow/{path}"));
        }
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:8080/api/wow").unwrap();
        let key = EntityKey::quest(Region::US, 1);
        let target = RequestTarget::build(&base, &key, None, &FieldSet::new()).unwrap();
        assert_eq!(target.as_str(), "http://127.0.0.1:8080/api/wow/quest/1");
    }

    #[test]
    fn test_names_are_percent_encoded() {
        let key = EntityKey::guild(Region::EU, "Draenor", "Les Ours");
        let target = RequestTarget::build(&eu_base(), &key, None, &FieldSet::new()).unwrap();
        assert_eq!(target.as_str(), "https://eu.battle.net/api/wow/guild/draenor/les%20ours");
    }

    #[test]
    fn test_realm_query_value_is_escaped() {
        let key = EntityKey::realm(Region::EU, "Tom & Jerry");
        let locale = Locale::parse("en_GB").unwrap();
        let target = RequestTarget::build(&eu_base(), &key, Some(&locale), &FieldSet::new()).unwrap();
        assert_eq!(
            target.as_str(),
            "https://eu.battle.net/api/wow/realm/status?realms=tom-%26-jerry&locale=en_GB"
        );
        let pairs: Vec<(String, String)> = target.url().query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("realms".to_string(), "tom-&-jerry".to_string()));
        assert_eq!(pairs.len(), 2);

        let key = EntityKey::realm(Region::EU, "a#b");
        let target = RequestTarget::build(&eu_base(), &key, None, &FieldSet::new()).unwrap();
        assert_eq!(target.url().fragment(), None);
        assert!(target.as_str().ends_with("?realms=a%23b"));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let key = EntityKey::character(Region::EU, "Draenor", "Jon");
        let set = fields(&["pvp", "guild"]);
        let first = RequestTarget::build(&eu_base(), &key, None, &set).unwrap();
        let second = RequestTarget::build(&eu_base(), &key, None, &set.clone()).unwrap();
        assert_eq!(first, second);
        assert!(first.as_str().ends_with("fields=pvp,guild"));
    }

    #[test]
    fn test_cannot_be_a_base_url_is_rejected() {
        let base = Url::parse("mailto:armory@example.com").unwrap();
        let key = EntityKey::quest(Region::US, 1);
        assert!(matches!(
            RequestTarget::build(&base, &key, None, &FieldSet::new()),
            Err(ArmoryError::InvalidConfiguration(_))
        ));
    }
}
