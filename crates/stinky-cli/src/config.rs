use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StinkyConfig {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub notes: NotesSection,
    #[serde(default)]
    pub cipher: CipherSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotesSection {
    #[serde(default)]
    pub default_privacy: Privacy,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CipherSection {
    #[serde(default)]
    pub mode: CipherMode,
    #[serde(default)]
    pub encrypt_pro_by_default: bool,
}

/// Visibility applied when a command does not say.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    #[default]
    Private,
    Public,
}

impl Privacy {
    pub fn is_private(self) -> bool {
        matches!(self, Privacy::Private)
    }
}

/// How encrypted notes are keyed.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CipherMode {
    /// A password chosen for each note
    #[default]
    PerNote,
    /// One master passphrase for all Pro content
    Master,
}

impl StinkyConfig {
    pub fn new(
        data_dir: &Path,
        default_privacy: Privacy,
        mode: CipherMode,
        encrypt_pro_by_default: bool,
    ) -> Self {
        Self {
            storage: StorageSection {
                data_dir: Some(data_dir.to_string_lossy().to_string()),
            },
            notes: NotesSection { default_privacy },
            cipher: CipherSection {
                mode,
                encrypt_pro_by_default,
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

/// Read the config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<StinkyConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(StinkyConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<StinkyConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &StinkyConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("stinky"));
        }
    }
    Ok(home_dir()?.join(".config").join("stinky"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("stinky"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("stinky"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: StinkyConfig = toml::from_str("").unwrap();
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.notes.default_privacy, Privacy::Private);
        assert_eq!(config.cipher.mode, CipherMode::PerNote);
        assert!(!config.cipher.encrypt_pro_by_default);
    }

    #[test]
    fn test_parse_full_config() {
        let config: StinkyConfig = toml::from_str(
            r#"
            [storage]
            data_dir = "/srv/stinky"

            [notes]
            default_privacy = "public"

            [cipher]
            mode = "master"
            encrypt_pro_by_default = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir.as_deref(), Some("/srv/stinky"));
        assert_eq!(config.notes.default_privacy, Privacy::Public);
        assert_eq!(config.cipher.mode, CipherMode::Master);
        assert!(config.cipher.encrypt_pro_by_default);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = StinkyConfig::new(
            Path::new("/data/stinky"),
            Privacy::Public,
            CipherMode::PerNote,
            false,
        );

        write_config(&path, &config).unwrap();
        let read = read_config(&path).unwrap();
        assert_eq!(read.storage.data_dir.as_deref(), Some("/data/stinky"));
        assert_eq!(read.notes.default_privacy, Privacy::Public);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.storage.data_dir.is_none());
    }
}
