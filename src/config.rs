//! Configuration management for KNotion anchoring

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::highlight::MarkerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub marker: MarkerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON file holding saved annotations
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            marker: MarkerConfig::default(),
            store: StoreConfig {
                path: PathBuf::from("annotations.json"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a config from any variable source; unset variables keep their
    /// defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let marker = defaults.marker;

        Ok(Config {
            marker: MarkerConfig {
                tag: lookup("KNOTION_MARKER_TAG")
                    .map(|tag| tag.to_ascii_lowercase())
                    .unwrap_or(marker.tag),
                class: lookup("KNOTION_MARKER_CLASS").unwrap_or(marker.class),
                color: lookup("KNOTION_HIGHLIGHT_COLOR").unwrap_or(marker.color),
                include_inline_styles: match lookup("KNOTION_INLINE_STYLES") {
                    Some(value) => parse_bool("KNOTION_INLINE_STYLES", value)?,
                    None => marker.include_inline_styles,
                },
                tooltip_offset_y: match lookup("KNOTION_TOOLTIP_OFFSET_Y") {
                    Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                        var: "KNOTION_TOOLTIP_OFFSET_Y",
                        value,
                    })?,
                    None => marker.tooltip_offset_y,
                },
                ..marker
            },
            store: StoreConfig {
                path: lookup("KNOTION_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.store.path),
            },
        })
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.marker.tag, "mark");
        assert!(config.marker.include_inline_styles);
        assert_eq!(config.store.path, PathBuf::from("annotations.json"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("KNOTION_MARKER_TAG", "SPAN"),
            ("KNOTION_INLINE_STYLES", "off"),
            ("KNOTION_TOOLTIP_OFFSET_Y", "12.5"),
            ("KNOTION_STORE_PATH", "/tmp/notes.json"),
        ]))
        .unwrap();

        assert_eq!(config.marker.tag, "span");
        assert!(!config.marker.include_inline_styles);
        assert_eq!(config.marker.tooltip_offset_y, 12.5);
        assert_eq!(config.marker.id_attribute, "data-highlight-id");
        assert_eq!(config.store.path, PathBuf::from("/tmp/notes.json"));
    }

    #[test]
    fn test_invalid_values() {
        let result = Config::from_lookup(lookup(&[("KNOTION_INLINE_STYLES", "maybe")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                var: "KNOTION_INLINE_STYLES",
                ..
            })
        ));

        let result = Config::from_lookup(lookup(&[("KNOTION_TOOLTIP_OFFSET_Y", "high")]));
        assert!(result.is_err());
    }
}
