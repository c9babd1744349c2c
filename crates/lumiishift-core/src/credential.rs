use std::fmt;

use thiserror::Error;

use crate::config::Config;

/// Environment variable holding the Together.ai API key.
pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API key is empty")]
    Empty,

    #[error("No API key found. Set TOGETHER_API_KEY or add \"api_key\" to the config file")]
    Missing,
}

/// Where a credential came from, shown in the UI header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Flag,
    Env,
    Config,
    Prompt,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Flag => "flag",
            KeySource::Env => "env",
            KeySource::Config => "config",
            KeySource::Prompt => "prompt",
        }
    }
}

/// Opaque, non-empty bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Never print the token itself
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Resolve a credential: explicit value first, then the environment, then
/// the config file. Blank values are skipped.
pub fn resolve(explicit: Option<&str>, config: &Config) -> Result<(Credential, KeySource), CredentialError> {
    let env_value = std::env::var(API_KEY_ENV).ok();
    resolve_from(explicit, env_value.as_deref(), config)
}

fn resolve_from(
    explicit: Option<&str>,
    env_value: Option<&str>,
    config: &Config,
) -> Result<(Credential, KeySource), CredentialError> {
    let candidates = [
        (explicit, KeySource::Flag),
        (env_value, KeySource::Env),
        (config.api_key.as_deref(), KeySource::Config),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| {
            value
                .and_then(|v| Credential::new(v).ok())
                .map(|credential| (credential, source))
        })
        .ok_or(CredentialError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_rejects_blank() {
        assert_eq!(Credential::new(""), Err(CredentialError::Empty));
        assert_eq!(Credential::new("   "), Err(CredentialError::Empty));
        assert_eq!(Credential::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("sk-secret").unwrap();
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn test_resolve_priority() {
        let config = Config {
            api_key: Some("from-config".to_string()),
            ..Config::new()
        };

        let (credential, source) = resolve_from(Some("from-flag"), Some("from-env"), &config).unwrap();
        assert_eq!(credential.expose(), "from-flag");
        assert_eq!(source, KeySource::Flag);

        let (credential, source) = resolve_from(None, Some("from-env"), &config).unwrap();
        assert_eq!(credential.expose(), "from-env");
        assert_eq!(source, KeySource::Env);

        let (credential, source) = resolve_from(None, None, &config).unwrap();
        assert_eq!(credential.expose(), "from-config");
        assert_eq!(source, KeySource::Config);
    }

    #[test]
    fn test_resolve_skips_blank_values() {
        let config = Config {
            api_key: Some("from-config".to_string()),
            ..Config::new()
        };
        let (_, source) = resolve_from(Some(""), Some("  "), &config).unwrap();
        assert_eq!(source, KeySource::Config);
    }

    #[test]
    fn test_resolve_missing() {
        assert_eq!(
            resolve_from(None, None, &Config::new()).unwrap_err(),
            CredentialError::Missing
        );
    }
}
