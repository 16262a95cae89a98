//! Runtime configuration, read from the environment after `.env` is loaded.

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SIGN_IN_URL: &str = "/sign-in";
pub const DEFAULT_BUCKET: &str = "uploads";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_BLOG_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GENERATION_SECS: u64 = 30;
pub const DEFAULT_WHATSAPP_NUMBER: &str = "919876543210";

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub blog_model: String,
    pub max_duration: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub session_jwt_secret: String,
    pub sign_in_url: String,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub whatsapp_number: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).with_context(|| format!("Missing {key} in environment"));

        let port = match get("PORT") {
            Some(port) => port.parse::<u16>().with_context(|| format!("PORT must be a port number, got {port}"))?,
            None => DEFAULT_PORT,
        };
        let max_secs = match get("GENERATION_MAX_DURATION_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .with_context(|| format!("GENERATION_MAX_DURATION_SECS must be whole seconds, got {secs}"))?,
            None => DEFAULT_GENERATION_SECS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            nats_url: get("NATS_URL"),
            session_jwt_secret: required("SESSION_JWT_SECRET")?,
            sign_in_url: get("SIGN_IN_URL").unwrap_or_else(|| DEFAULT_SIGN_IN_URL.to_string()),
            storage: StorageConfig {
                url: required("STORAGE_URL")?,
                service_key: required("STORAGE_SERVICE_KEY")?,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            generation: GenerationConfig {
                api_key: required("GEMINI_API_KEY")?,
                base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| crate::ai::DEFAULT_BASE_URL.to_string()),
                chat_model: get("GEMINI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                blog_model: get("GEMINI_BLOG_MODEL").unwrap_or_else(|| DEFAULT_BLOG_MODEL.to_string()),
                max_duration: Duration::from_secs(max_secs),
            },
            whatsapp_number: get("WHATSAPP_NUMBER").unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn minimal() -> HashMap<String, String> {
        env(&[
            ("DATABASE_URL", "postgres://localhost/entities"),
            ("SESSION_JWT_SECRET", "secret"),
            ("STORAGE_URL", "https://abc.supabase.co"),
            ("STORAGE_SERVICE_KEY", "service"),
            ("GEMINI_API_KEY", "key"),
        ])
    }

    #[test]
    fn test_defaults() {
        let vars = minimal();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.sign_in_url, "/sign-in");
        assert_eq!(config.storage.bucket, "uploads");
        assert_eq!(config.generation.max_duration, Duration::from_secs(30));
        assert_eq!(config.whatsapp_number, "919876543210");
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_missing_required() {
        let mut vars = minimal();
        vars.remove("SESSION_JWT_SECRET");
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("SESSION_JWT_SECRET"));
    }

    #[test]
    fn test_bad_port() {
        let mut vars = minimal();
        vars.insert("PORT".into(), "eighty".into());
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
    }
}
