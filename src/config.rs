use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `rackmap.toml`, all optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RackmapConfig {
    /// Path of the database file; defaults next to the data directory
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("rackmap.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".rackmap").join("rackmap.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RackmapConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RackmapConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RackmapConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rackmap.toml");

        let config = RackmapConfig {
            database: Some("warehouse.db".to_string()),
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("warehouse.db"));
    }

    #[test]
    fn test_write_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rackmap.toml");

        write_config(&path, &RackmapConfig::default(), false).unwrap();
        assert!(write_config(&path, &RackmapConfig::default(), false).is_err());
        assert!(write_config(&path, &RackmapConfig::default(), true).is_ok());
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = default_database_path_in(dir.path());

        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }
}
