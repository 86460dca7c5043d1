use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, LoadError};

pub const DEFAULT_COLLECTION: &str = "real-time";
const ENV_PREFIX: &str = "SENTIWATCH_";

/// Every setting name, shared by the config file, the `SENTIWATCH_*`
/// environment variables (upper-cased) and the keychain entries.
pub const SETTING_NAMES: &[&str] = &[
    "bucket_name",
    "sentiment_key",
    "topic_key",
    "object_store_url",
    "access_key_id",
    "secret_access_key",
    "document_store_url",
    "collection",
];

/// Lowest-precedence source of settings, usually the OS keychain.
pub trait SecretSource {
    fn secret(&self, name: &str) -> Result<Option<String>, String>;
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, name: &str) -> Result<Option<String>, String> {
        Ok(self.get(name).cloned())
    }
}

/// Explicitly supplied settings: a JSON config file, overlaid with CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bucket_name: Option<String>,
    pub sentiment_key: Option<String>,
    pub topic_key: Option<String>,
    pub object_store_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub document_store_url: Option<String>,
    pub collection: Option<String>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file_error = |reason: String| ConfigError::File {
            path: path.display().to_string(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| file_error(e.to_string()))
    }

    /// Default config file location, `~/.sentiwatch/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        crate::db::sentiwatch_data_dir().map(|dir| dir.join("config.json"))
    }

    /// Fields set in `over` win; everything else is kept from `self`.
    pub fn overlay(self, over: Settings) -> Settings {
        Settings {
            bucket_name: over.bucket_name.or(self.bucket_name),
            sentiment_key: over.sentiment_key.or(self.sentiment_key),
            topic_key: over.topic_key.or(self.topic_key),
            object_store_url: over.object_store_url.or(self.object_store_url),
            access_key_id: over.access_key_id.or(self.access_key_id),
            secret_access_key: over.secret_access_key.or(self.secret_access_key),
            document_store_url: over.document_store_url.or(self.document_store_url),
            collection: over.collection.or(self.collection),
        }
    }

    fn get(&self, name: &str) -> Option<&String> {
        match name {
            "bucket_name" => self.bucket_name.as_ref(),
            "sentiment_key" => self.sentiment_key.as_ref(),
            "topic_key" => self.topic_key.as_ref(),
            "object_store_url" => self.object_store_url.as_ref(),
            "access_key_id" => self.access_key_id.as_ref(),
            "secret_access_key" => self.secret_access_key.as_ref(),
            "document_store_url" => self.document_store_url.as_ref(),
            "collection" => self.collection.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for AccessCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    /// `http(s)://` endpoint, `file://` URL, or a plain directory path.
    /// HTTP endpoints must accept unauthenticated or basic-auth GETs.
    pub endpoint: String,
    pub credentials: Option<AccessCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStoreConfig {
    /// `sqlite://<path>` or a plain path to the SQLite file.
    pub url: String,
}

impl DocumentStoreConfig {
    /// Path of the SQLite file. Any other URL scheme names a backend this
    /// build cannot reach.
    pub fn path(&self) -> Result<PathBuf, LoadError> {
        if let Some(path) = self.url.strip_prefix("sqlite://") {
            return Ok(PathBuf::from(path));
        }
        match self.url.split_once("://") {
            // Only the scheme is reported; the rest may carry credentials.
            Some((scheme, _)) => Err(LoadError::Connectivity(format!(
                "Unsupported document store scheme '{}'",
                scheme
            ))),
            None => Ok(PathBuf::from(&self.url)),
        }
    }
}

/// Fully resolved configuration, built once at process start and passed
/// explicitly to the dashboard and its loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bucket: String,
    pub sentiment_key: String,
    pub topic_key: Option<String>,
    pub collection: String,
    pub object_store: ObjectStoreConfig,
    pub document_store: DocumentStoreConfig,
}

struct Resolver<'a, E> {
    explicit: &'a Settings,
    env: E,
    secrets: &'a dyn SecretSource,
}

impl<E: Fn(&str) -> Option<String>> Resolver<'_, E> {
    /// explicit > environment > secret store. Empty values count as unset.
    fn lookup(&self, name: &'static str) -> Result<Option<String>, String> {
        if let Some(value) = self.explicit.get(name).filter(|v| !v.is_empty()) {
            return Ok(Some(value.clone()));
        }
        let var = format!("{}{}", ENV_PREFIX, name.to_uppercase());
        if let Some(value) = (self.env)(&var).filter(|v| !v.is_empty()) {
            debug!(setting = name, "Setting resolved from environment");
            return Ok(Some(value));
        }
        let secret = self.secrets.secret(name)?;
        Ok(secret.filter(|v| !v.is_empty()))
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.lookup(name)
            .map_err(ConfigError::SecretStore)?
            .ok_or(ConfigError::Missing(name))
    }

    fn optional(&self, name: &'static str) -> Option<String> {
        match self.lookup(name) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, setting = name, "Secret store read failed, treating setting as unset");
                None
            }
        }
    }
}

impl AppConfig {
    /// Resolve every setting with precedence explicit > `env` > `secrets`.
    pub fn resolve<E>(
        explicit: &Settings,
        env: E,
        secrets: &dyn SecretSource,
    ) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let r = Resolver {
            explicit,
            env,
            secrets,
        };

        let bucket = r.required("bucket_name")?;
        let sentiment_key = r.required("sentiment_key")?;
        let topic_key = r.optional("topic_key");
        let collection = r
            .optional("collection")
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        let endpoint = r.required("object_store_url")?;

        let credentials = match (r.optional("access_key_id"), r.optional("secret_access_key")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AccessCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    name: "secret_access_key",
                    reason: "access_key_id is set without a secret".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    name: "access_key_id",
                    reason: "secret_access_key is set without a key id".to_string(),
                })
            }
        };

        let document_store = DocumentStoreConfig {
            url: r.required("document_store_url")?,
        };

        Ok(AppConfig {
            bucket,
            sentiment_key,
            topic_key,
            collection,
            object_store: ObjectStoreConfig {
                endpoint,
                credentials,
            },
            document_store,
        })
    }

    /// Resolve against the process environment and the OS keychain.
    pub fn from_environment(explicit: &Settings) -> Result<Self, ConfigError> {
        Self::resolve(
            explicit,
            |var| std::env::var(var).ok(),
            &crate::keychain::Keychain,
        )
    }
}
