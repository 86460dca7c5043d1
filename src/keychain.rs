use tracing::debug;

use crate::config::{SecretSource, SETTING_NAMES};

const SERVICE: &str = "dev.sentiwatch";

fn validate_name(name: &str) -> Result<(), String> {
    if SETTING_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(format!(
            "Invalid secret name: '{}'. Must be one of: {}",
            name,
            SETTING_NAMES.join(", ")
        ))
    }
}

/// Read a setting from the OS keychain. Returns None if not set.
pub fn keychain_get(name: &str) -> Result<Option<String>, String> {
    validate_name(name)?;
    let entry = keyring::Entry::new(SERVICE, name)
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;
    match entry.get_password() {
        Ok(value) => {
            debug!(name, "Setting read from keychain");
            Ok(Some(value))
        }
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(format!("Failed to read from keychain: {}", e)),
    }
}

/// The OS keychain as the lowest-precedence configuration source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keychain;

impl SecretSource for Keychain {
    fn secret(&self, name: &str) -> Result<Option<String>, String> {
        keychain_get(name)
    }
}
