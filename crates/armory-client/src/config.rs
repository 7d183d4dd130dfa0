//! Configuration for API sessions

use armory_core::{ArmoryError, Locale, Region, Result, StalenessPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("armory-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Region lookups default to
    pub region: Region,

    /// Response locale; must be served by `region`. `None` leaves the choice
    /// to the server.
    pub locale: Option<String>,

    /// Realm used by lookups that do not name one
    pub realm: Option<String>,

    /// Replaces the per-region API base for every region
    pub api_base_url: Option<String>,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Request timeout
    pub request_timeout: Duration,

    pub user_agent: String,

    /// When cached records are refetched on read
    pub staleness: StalenessPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: Region::US,
            locale: None,
            realm: None,
            api_base_url: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            staleness: StalenessPolicy::Never,
        }
    }
}

impl ClientConfig {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_staleness(mut self, staleness: StalenessPolicy) -> Self {
        self.staleness = staleness;
        self
    }

    /// Create configuration from `ARMORY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create configuration from a variable lookup. Unset variables keep their
    /// defaults and unparseable numbers fall back to them.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seconds = |name: &str, fallback: Duration| {
            var(name)
                .and_then(|s| s.trim().parse().ok())
                .map_or(fallback, Duration::from_secs)
        };

        Ok(Self {
            region: var("ARMORY_REGION")
                .map(|s| s.parse::<Region>())
                .transpose()?
                .unwrap_or(defaults.region),
            locale: var("ARMORY_LOCALE").filter(|s| !s.is_empty()),
            realm: var("ARMORY_REALM").filter(|s| !s.is_empty()),
            api_base_url: var("ARMORY_API_BASE_URL").filter(|s| !s.is_empty()),
            connect_timeout: seconds("ARMORY_CONNECT_TIMEOUT", defaults.connect_timeout),
            request_timeout: seconds("ARMORY_REQUEST_TIMEOUT", defaults.request_timeout),
            user_agent: var("ARMORY_USER_AGENT").unwrap_or(defaults.user_agent),
            staleness: var("ARMORY_REFRESH_AFTER")
                .and_then(|s| s.trim().parse().ok())
                .map_or(defaults.staleness, |secs| {
                    StalenessPolicy::RefreshAfter(Duration::from_secs(secs))
                }),
        })
    }

    /// Reject a locale the region does not serve, an unusable base URL and
    /// zero timeouts.
    pub fn validate(&self) -> Result<()> {
        self.session_locale()?;
        if self.api_base_url.is_some() {
            self.base_url(self.region)?;
        }
        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ArmoryError::InvalidConfiguration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.realm.as_deref().is_some_and(|realm| realm.trim().is_empty()) {
            return Err(ArmoryError::InvalidConfiguration(
                "default realm must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured locale, parsed and checked against the region.
    pub fn session_locale(&self) -> Result<Option<Locale>> {
        self.locale
            .as_deref()
            .map(|locale| Locale::for_region(locale, self.region))
            .transpose()
    }

    /// API base for `region`, honoring the override.
    pub fn base_url(&self, region: Region) -> Result<Url> {
        let raw = self.api_base_url.as_deref().unwrap_or(region.api_base());
        let url = Url::parse(raw)
            .map_err(|e| ArmoryError::InvalidConfiguration(format!("API base URL '{raw}': {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ArmoryError::InvalidConfiguration(format!(
                "API base URL '{raw}' must be an http(s) URL"
            )));
        }
        Ok(url)
    }
}
