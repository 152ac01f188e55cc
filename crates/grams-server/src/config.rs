use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;

/// Secrets that only exist for local development.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    /// Read `GRAMS_*` variables from the environment (after `.env` is loaded).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("GRAMS_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("GRAMS_JWT_SECRET is unset or a placeholder; tokens are forgeable");
        }

        let db_path = var("GRAMS_DB_PATH").unwrap_or_else(|| "grams.db".into());
        let host = var("GRAMS_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("GRAMS_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("GRAMS_PORT must be a port number")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.jwt_secret, "dev-secret-change-me");
        assert_eq!(config.db_path, PathBuf::from("grams.db"));
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn variables_override_defaults() {
        let config = config(&[
            ("GRAMS_JWT_SECRET", "s3cret"),
            ("GRAMS_DB_PATH", "/tmp/g.db"),
            ("GRAMS_HOST", "127.0.0.1"),
            ("GRAMS_PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.db_path, PathBuf::from("/tmp/g.db"));
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bad_port_fails_startup() {
        assert!(config(&[("GRAMS_PORT", "http")]).is_err());
        assert!(config(&[("GRAMS_HOST", "not a host")]).is_err());
    }
}
