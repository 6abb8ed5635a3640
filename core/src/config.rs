//! Redirect policy.
//!
//! `RedirectOverrides` is the partial configuration a caller supplies;
//! `RedirectConfig::merged` lays it over the defaults one field at a time.
//! An explicit status-code list replaces the default list outright.

use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_REDIRECT_LIMIT: u32 = 10;
pub const DEFAULT_REDIRECT_STATUS_CODES: [u16; 5] = [300, 301, 302, 303, 307];

/// Effective redirect policy of a client. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    pub follow_redirects: bool,
    pub redirect_limit: u32,
    pub redirect_status_codes: Vec<u16>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            redirect_status_codes: DEFAULT_REDIRECT_STATUS_CODES.to_vec(),
        }
    }
}

/// Caller-supplied policy fields; omitted fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedirectOverrides {
    pub follow_redirects: Option<bool>,
    pub redirect_limit: Option<u32>,
    pub redirect_status_codes: Option<Vec<u16>>,
}

impl RedirectOverrides {
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    pub fn redirect_limit(mut self, limit: u32) -> Self {
        self.redirect_limit = Some(limit);
        self
    }

    pub fn redirect_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.redirect_status_codes = Some(codes.into_iter().collect());
        self
    }
}

impl RedirectConfig {
    pub fn merged(overrides: RedirectOverrides) -> Self {
        let defaults = Self::default();
        Self {
            follow_redirects: overrides.follow_redirects.unwrap_or(defaults.follow_redirects),
            redirect_limit: overrides.redirect_limit.unwrap_or(defaults.redirect_limit),
            redirect_status_codes: overrides
                .redirect_status_codes
                .unwrap_or(defaults.redirect_status_codes),
        }
    }

    /// Parses a JSON overrides document such as
    /// `{"redirectLimit": 3, "redirectStatusCodes": [301, 308]}`.
    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        let overrides: RedirectOverrides =
            serde_json::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self::merged(overrides))
    }

    pub fn should_redirect(&self, status: u16) -> bool {
        self.follow_redirects && self.redirect_status_codes.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = RedirectConfig::default();
        assert!(config.follow_redirects);
        assert_eq!(config.redirect_limit, 10);
        assert_eq!(config.redirect_status_codes, vec![300, 301, 302, 303, 307]);
    }

    #[test]
    fn empty_overrides_yield_defaults() {
        assert_eq!(RedirectConfig::merged(RedirectOverrides::default()), RedirectConfig::default());
    }

    #[test]
    fn explicit_status_codes_replace_defaults() {
        let config = RedirectConfig::merged(RedirectOverrides::default().redirect_status_codes([308]));
        assert_eq!(config.redirect_status_codes, vec![308]);
        assert!(config.should_redirect(308));
        assert!(!config.should_redirect(301));
        assert_eq!(config.redirect_limit, 10);
    }

    #[test]
    fn identical_overrides_merge_identically() {
        let overrides = RedirectOverrides::default().redirect_limit(2).follow_redirects(true);
        assert_eq!(
            RedirectConfig::merged(overrides.clone()),
            RedirectConfig::merged(overrides)
        );
    }

    #[test]
    fn follow_disabled_never_redirects() {
        let config = RedirectConfig::merged(RedirectOverrides::default().follow_redirects(false));
        for status in DEFAULT_REDIRECT_STATUS_CODES {
            assert!(!config.should_redirect(status));
        }
    }

    #[test]
    fn from_json_reads_camel_case_fields() {
        let config = RedirectConfig::from_json(r#"{"redirectLimit":3,"redirectStatusCodes":[301]}"#).unwrap();
        assert_eq!(config.redirect_limit, 3);
        assert_eq!(config.redirect_status_codes, vec![301]);
        assert!(config.follow_redirects);
    }

    #[test]
    fn from_json_rejects_negative_limit() {
        let err = RedirectConfig::from_json(r#"{"redirectLimit":-1}"#).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        assert!(RedirectConfig::from_json(r#"{"maxRedirects":3}"#).is_err());
    }
}
