use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::reader::DEFAULT_MEDIA_TYPE;
use crate::registry::DEFAULT_LOCATOR_PREFIX;
use crate::request::DEFAULT_PLACEHOLDER_URL;

/// Transport used for requests that are not object URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Every pass-through request fails.
    #[default]
    Offline,
    /// `file://` URLs are served from disk.
    File,
}

/// Global configuration loaded from `~/.config/blobshim/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Scheme tag of minted object URLs; a sequence number is appended.
    pub locator_prefix: String,
    /// URL intercepted requests are re-pointed at.
    pub placeholder_url: String,
    /// Media type written into data URLs for untyped sources.
    pub default_media_type: String,
    /// Pass-through transport: "offline" (default) or "file".
    #[serde(default)]
    pub transport: Option<TransportKind>,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            locator_prefix: DEFAULT_LOCATOR_PREFIX.to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            default_media_type: DEFAULT_MEDIA_TYPE.to_string(),
            transport: None,
        }
    }
}

impl ShimConfig {
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.unwrap_or_default()
    }

    /// Reject values that would make interception ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.locator_prefix.is_empty() {
            bail!("locator_prefix must not be empty");
        }
        if self.placeholder_url.starts_with(&self.locator_prefix) {
            bail!(
                "placeholder_url {} must not use the locator prefix {}",
                self.placeholder_url,
                self.locator_prefix
            );
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blobshim")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ShimConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ShimConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ShimConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ShimConfig::default();
        assert_eq!(cfg.locator_prefix, "blob:rn-polyfill-");
        assert_eq!(cfg.placeholder_url, "about:blank");
        assert_eq!(cfg.default_media_type, "application/octet-stream");
        assert_eq!(cfg.transport_kind(), TransportKind::Offline);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ShimConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ShimConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.locator_prefix, cfg.locator_prefix);
        assert_eq!(parsed.placeholder_url, cfg.placeholder_url);
        assert_eq!(parsed.default_media_type, cfg.default_media_type);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            locator_prefix = "blob:assets-"
            placeholder_url = "about:blank"
            default_media_type = "model/gltf-binary"
            transport = "file"
        "#;
        let cfg: ShimConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.locator_prefix, "blob:assets-");
        assert_eq!(cfg.default_media_type, "model/gltf-binary");
        assert_eq!(cfg.transport_kind(), TransportKind::File);
    }

    #[test]
    fn validate_rejects_bad_prefixes() {
        let mut cfg = ShimConfig::default();
        cfg.locator_prefix.clear();
        assert!(cfg.validate().is_err());

        let cfg = ShimConfig {
            placeholder_url: "blob:rn-polyfill-x".to_string(),
            ..ShimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
