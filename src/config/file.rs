//! JSON persistence for [`Configuration`] values.
//!
//! Enum fields are stored by label, so a file reads like the module's own
//! datasheet:
//!
//! ```json
//! { "address": 0, "baud_rate": "9600", "parity": "8N1", "air_data_rate": "2.4k", ... }
//! ```

use super::Configuration;
use crate::error::E220Error;
use std::fs;
use std::path::Path;

/// Read a configuration from a JSON file.
pub fn load_json(path: impl AsRef<Path>) -> Result<Configuration, E220Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| E220Error::ConfigFile(format!("{}: {e}", path.display())))?;
    let cfg = serde_json::from_str(&text)
        .map_err(|e| E220Error::ConfigFile(format!("{}: {e}", path.display())))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(cfg)
}

/// Write a configuration as pretty-printed JSON.
pub fn save_json(path: impl AsRef<Path>, cfg: &Configuration) -> Result<(), E220Error> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(cfg)
        .map_err(|e| E220Error::ConfigFile(e.to_string()))?;
    fs::write(path, text)
        .map_err(|e| E220Error::ConfigFile(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AirDataRate, TransmissionMethod};

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radio.json");
        let cfg = Configuration::builder()
            .address(0x1234)
            .air_data_rate(AirDataRate::Kbps19_2)
            .transmission_method(TransmissionMethod::Fixed)
            .build();

        save_json(&path, &cfg).unwrap();
        let loaded = load_json(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_rejects_unknown_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut value = serde_json::to_value(Configuration::default()).unwrap();
        value["baud_rate"] = serde_json::Value::from("250000");
        fs::write(&path, value.to_string()).unwrap();

        let err = load_json(&path).unwrap_err();
        assert!(matches!(err, E220Error::ConfigFile(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_json("/nonexistent/e220.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/e220.json"));
    }

    #[test]
    fn test_key_defaults_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nokey.json");
        let mut value = serde_json::to_value(Configuration::default()).unwrap();
        value.as_object_mut().unwrap().remove("encryption_key");
        fs::write(&path, value.to_string()).unwrap();

        let loaded = load_json(&path).unwrap();
        assert_eq!(loaded.encryption_key().value(), 0);
    }
}
