//! Region and locale definitions for the community API.
//!
//! Every region except China serves the API from `{region}.battle.net`.
//! China uses `www.battlenet.com.cn`. Each region accepts a fixed set of
//! locales; anything else is rejected when a session is configured.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ArmoryError, Result};

/// API region.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States
    #[default]
    US,
    /// Europe
    EU,
    /// Korea
    KR,
    /// Taiwan
    TW,
    /// China (uses `.com.cn` domains)
    CN,
}

impl Region {
    pub const ALL: [Self; 5] = [Self::US, Self::EU, Self::KR, Self::TW, Self::CN];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::US => "us",
            Self::EU => "eu",
            Self::KR => "kr",
            Self::TW => "tw",
            Self::CN => "cn",
        }
    }

    /// Base URL of the community API, with trailing slash.
    pub fn api_base(self) -> &'static str {
        match self {
            Self::US => "https://us.battle.net/api/wow/",
            Self::EU => "https://eu.battle.net/api/wow/",
            Self::KR => "https://kr.battle.net/api/wow/",
            Self::TW => "https://tw.battle.net/api/wow/",
            Self::CN => "https://www.battlenet.com.cn/api/wow/",
        }
    }

    /// Locales the region serves, in the region's preferred order.
    pub fn locales(self) -> &'static [&'static str] {
        match self {
            Self::US => &["en_US", "es_MX"],
            Self::EU => &["en_GB", "es_ES", "fr_FR", "ru_RU", "de_DE"],
            Self::KR => &["ko_KR"],
            Self::TW => &["zh_TW"],
            Self::CN => &["zh_CN"],
        }
    }

    pub fn supports(self, locale: &Locale) -> bool {
        self.locales().contains(&locale.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str() == wanted)
            .ok_or_else(|| ArmoryError::InvalidRegion(s.to_string()))
    }
}

/// A `language_TERRITORY` locale code such as `en_GB`.
///
/// Parsing normalizes case, so `en_gb` and `EN_GB` both become `en_GB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ArmoryError::InvalidLocale {
            locale: s.to_string(),
            reason: reason.to_string(),
        };

        let (language, territory) = s
            .trim()
            .split_once('_')
            .ok_or_else(|| invalid("expected language_TERRITORY"))?;
        let well_formed = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic());
        if !well_formed(language) || !well_formed(territory) {
            return Err(invalid("expected two-letter language and territory codes"));
        }

        Ok(Self(format!(
            "{}_{}",
            language.to_ascii_lowercase(),
            territory.to_ascii_uppercase()
        )))
    }

    /// Parse and check that `region` serves the locale.
    pub fn for_region(s: &str, region: Region) -> Result<Self> {
        let locale = Self::parse(s)?;
        if region.supports(&locale) {
            Ok(locale)
        } else {
            Err(ArmoryError::InvalidLocale {
                locale: locale.0,
                reason: format!(
                    "region {region} only serves {}",
                    region.locales().join(", ")
                ),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = ArmoryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_region_api_bases() {
        assert_eq!(Region::EU.api_base(), "https://eu.battle.net/api/wow/");
        assert_eq!(Region::US.api_base(), "https://us.battle.net/api/wow/");
        assert_eq!(
            Region::CN.api_base(),
            "https://www.battlenet.com.cn/api/wow/"
        );
    }

    #[test]
    fn test_region_parse_is_case_insensitive() {
        assert_eq!("EU".parse::<Region>().expect("Region should parse"), Region::EU);
        assert_eq!(" tw ".parse::<Region>().expect("Region should parse"), Region::TW);
        assert!(matches!(
            "sea".parse::<Region>(),
            Err(ArmoryError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_region_display_round_trips_through_from_str() {
        for region in Region::ALL {
            assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn test_locale_case_normalization() {
        assert_eq!(Locale::parse("en_gb").unwrap().as_str(), "en_GB");
        assert_eq!(Locale::parse("EN_US").unwrap().as_str(), "en_US");
        assert_eq!(Locale::parse("de_DE").unwrap().as_str(), "de_DE");
    }

    #[test]
    fn test_locale_rejects_malformed_codes() {
        for bad in ["", "english", "en-GB", "eng_GB", "e1_GB"] {
            assert!(
                matches!(Locale::parse(bad), Err(ArmoryError::InvalidLocale { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_locale_must_be_served_by_region() {
        assert!(Locale::for_region("fr_fr", Region::EU).is_ok());
        let err = Locale::for_region("en_US", Region::EU).expect_err("en_US is not an EU locale");
        assert!(err.to_string().contains("en_GB"));
    }

    #[test]
    fn test_locale_serde_normalizes() {
        let locale: Locale = serde_json::from_str("\"ru_ru\"").expect("Locale should deserialize");
        assert_eq!(locale.as_str(), "ru_RU");
        assert!(serde_json::from_str::<Locale>("\"russian\"").is_err());
    }
}
