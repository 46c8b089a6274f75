use std::{net::SocketAddr, str::FromStr};

use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "secret";
// One year
const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

// Runtime settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub cors_origin: String,
    pub seed_demo_users: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl_secs: 60 * 60,
            bcrypt_cost: 8,
            cors_origin: "http://localhost:3000".to_string(),
            seed_demo_users: false,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and overlays the process environment on the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, falling back to the built-in default secret");
                defaults.jwt_secret
            }
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let access_token_ttl_secs = parse_or(
            &lookup,
            "ACCESS_TOKEN_TTL_SECS",
            defaults.access_token_ttl_secs,
        )?;
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&access_token_ttl_secs) {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_TTL_SECS",
                value: access_token_ttl_secs.to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            jwt_secret,
            access_token_ttl_secs,
            bcrypt_cost,
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            seed_demo_users: parse_or(&lookup, "SEED_DEMO_USERS", defaults.seed_demo_users)?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: raw,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.access_token_ttl_secs, 3600);
        assert_eq!(config.bcrypt_cost, 8);
        assert_eq!(config.jwt_secret, "secret");
        assert!(!config.seed_demo_users);
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("JWT_SECRET", "hunter2"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("SEED_DEMO_USERS", "true"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_secret, "hunter2");
        assert_eq!(config.access_token_ttl_secs, 60);
        assert!(config.seed_demo_users);
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config_from(&[("BCRYPT_COST", "99")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
    }

    #[test]
    fn access_token_ttl_must_be_positive_and_bounded() {
        for bad in ["0", "31536001", "18446744073709551615"] {
            let err = config_from(&[("ACCESS_TOKEN_TTL_SECS", bad)]).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { key: "ACCESS_TOKEN_TTL_SECS", .. }
            ));
        }

        let config = config_from(&[("ACCESS_TOKEN_TTL_SECS", "31536000")]).unwrap();
        assert_eq!(config.access_token_ttl_secs, 31_536_000);
    }
}
