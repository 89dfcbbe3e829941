use std::env;
use std::num::NonZeroU32;
use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

// Requests per minute per client IP on token issuance.
const DEFAULT_JWT_RATE_LIMIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(29);

const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "https://taslix.netlify.app",
    "https://taslix.web.app",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("JWT_SECRET must be set when APP_PRODUCTION is enabled")]
    DefaultSecretInProduction,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    /// Production mode: cookies are `Secure` and `SameSite=None`.
    pub production: bool,
    pub token_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub jwt_rate_limit: NonZeroU32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = match lookup("APP_PRODUCTION") {
            Some(value) => parse_bool("APP_PRODUCTION", &value)?,
            None => false,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        if production && jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::DefaultSecretInProduction);
        }

        let cors_origins: Vec<String> = match lookup("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ConfigError::Invalid {
                key: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        let token_ttl_days = parse_or("TOKEN_TTL_DAYS", lookup("TOKEN_TTL_DAYS"), 50)?;
        if !(1..=3650).contains(&token_ttl_days) {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_DAYS",
                value: token_ttl_days.to_string(),
            });
        }

        Ok(AppConfig {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", lookup("PORT"), 9000)?,
            db_path: lookup("DB_PATH").unwrap_or_else(|| "./data/taslix.db".to_string()),
            jwt_secret,
            production,
            token_ttl_days,
            cors_origins,
            jwt_rate_limit: parse_or(
                "JWT_RATE_LIMIT",
                lookup("JWT_RATE_LIMIT"),
                DEFAULT_JWT_RATE_LIMIT,
            )?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert!(!config.production);
        assert_eq!(config.token_ttl_days, 50);
        assert_eq!(config.jwt_rate_limit.get(), 30);
        assert!(config.uses_default_secret());
        assert_eq!(config.cors_origins.len(), 4);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8081"),
            ("JWT_SECRET", "s3cret"),
            ("APP_PRODUCTION", "true"),
            ("TOKEN_TTL_DAYS", "7"),
            ("CORS_ORIGINS", "https://a.example/, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert!(config.production);
        assert_eq!(config.token_ttl_days, 7);
        assert!(!config.uses_default_secret());
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_production_requires_real_secret() {
        let err = config_from(&[("APP_PRODUCTION", "1")]).unwrap_err();
        assert_eq!(err, ConfigError::DefaultSecretInProduction);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("PORT", "ninety")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_RATE_LIMIT", "0")]),
            Err(ConfigError::Invalid { key: "JWT_RATE_LIMIT", .. })
        ));
        assert!(matches!(
            config_from(&[("APP_PRODUCTION", "maybe")]),
            Err(ConfigError::Invalid { key: "APP_PRODUCTION", .. })
        ));
        assert!(matches!(
            config_from(&[("TOKEN_TTL_DAYS", "0")]),
            Err(ConfigError::Invalid { key: "TOKEN_TTL_DAYS", .. })
        ));
        assert!(matches!(
            config_from(&[("CORS_ORIGINS", "https://ok.example,localhost:3000")]),
            Err(ConfigError::Invalid { key: "CORS_ORIGINS", .. })
        ));
    }
}
