use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("Cannot read seed file {path}: {reason}")]
    Seed { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub images: ImageConfig,
    pub channel_buffer: usize,
    pub partner: Option<PartnerAccount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    pub products_image_path: String,
    pub base_url: String,
    pub upload_chunk_size: usize,
}

/// Account the local auth flow signs in with.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let partner = match (lookup("NILO_PARTNER_EMAIL"), lookup("NILO_PARTNER_PASSWORD")) {
            (Some(email), Some(password)) => Some(PartnerAccount {
                display_name: lookup("NILO_PARTNER_NAME").unwrap_or_else(|| email.clone()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            store: StoreConfig {
                seed_file: lookup("NILO_SEED_FILE").map(PathBuf::from),
            },
            images: ImageConfig {
                products_image_path: var("NILO_PRODUCTS_IMAGE_PATH", "products_images"),
                base_url: var("NILO_IMAGE_BASE_URL", "memory://images"),
                upload_chunk_size: positive("NILO_UPLOAD_CHUNK_SIZE", var("NILO_UPLOAD_CHUNK_SIZE", "65536"))?,
            },
            channel_buffer: positive("NILO_CHANNEL_BUFFER", var("NILO_CHANNEL_BUFFER", "32"))?,
            partner,
        })
    }
}

fn positive(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.store.seed_file, None);
        assert_eq!(config.images.products_image_path, "products_images");
        assert_eq!(config.images.upload_chunk_size, 65536);
        assert_eq!(config.channel_buffer, 32);
        assert_eq!(config.partner, None);
    }

    #[test]
    fn partner_requires_email_and_password() {
        let config = AppConfig::from_lookup(lookup(&[("NILO_PARTNER_EMAIL", "ana@nilo.test")])).unwrap();
        assert_eq!(config.partner, None);

        let config = AppConfig::from_lookup(lookup(&[
            ("NILO_PARTNER_EMAIL", "ana@nilo.test"),
            ("NILO_PARTNER_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.partner.map(|p| p.display_name), Some("ana@nilo.test".to_string()));
    }

    #[test]
    fn zero_or_garbage_sizes_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("NILO_UPLOAD_CHUNK_SIZE", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid { key: "NILO_UPLOAD_CHUNK_SIZE", value: "0".to_string() }
        );
        assert!(AppConfig::from_lookup(lookup(&[("NILO_CHANNEL_BUFFER", "lots")])).is_err());
    }
}
