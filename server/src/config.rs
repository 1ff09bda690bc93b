use std::str::FromStr;
use thiserror::Error;

/// What to do with canvas or chat events from a connection that has not
/// claimed a display name yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnclaimedPolicy {
    /// Drop the event.
    Reject,
    /// Process it; chat lines carry no author.
    Anonymous,
}

impl FromStr for UnclaimedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "anonymous" => Ok(Self::Anonymous),
            _ => Err(ConfigError::InvalidPolicy(s.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("UNCLAIMED_POLICY must be `reject` or `anonymous`, got {0:?}")]
    InvalidPolicy(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub unclaimed_policy: UnclaimedPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            allowed_origins: Vec::new(),
            unclaimed_policy: UnclaimedPolicy::Reject,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(policy) = lookup("UNCLAIMED_POLICY") {
            config.unclaimed_policy = policy.parse()?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn it_uses_defaults_without_env() {
        let config = ServerConfig::from_lookup(|_| None).expect("");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.unclaimed_policy, UnclaimedPolicy::Reject);
    }

    #[test]
    fn it_reads_env() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "3000"),
            (
                "ALLOWED_ORIGINS",
                "http://localhost:4200, https://board.example.com,",
            ),
            ("UNCLAIMED_POLICY", "Anonymous"),
        ]))
        .expect("");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:4200", "https://board.example.com"]
        );
        assert_eq!(config.unclaimed_policy, UnclaimedPolicy::Anonymous);
    }

    #[test]
    fn it_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("UNCLAIMED_POLICY", "maybe")])),
            Err(ConfigError::InvalidPolicy(_))
        ));
    }
}
