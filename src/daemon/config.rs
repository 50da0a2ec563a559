use std::{
    io::ErrorKind,
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_KEY";
pub const KEY_ENV_ALIAS: &str = "SUPABASE_ANON_KEY";
pub const ENGINEER_ENV: &str = "ENGINEER_ID";

/// Layout of the configuration file. Every value may also come from the environment.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
struct ConfigFile {
    supabase_url: Option<String>,
    supabase_key: Option<String>,
    engineer_id: Option<String>,
}

/// Everything the daemon needs to know before the first tick. Loaded once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub store_url: String,
    pub store_key: String,
    pub engineer_id: Arc<str>,
}

impl TrackerConfig {
    /// Reads `path` (a missing file is fine) and applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let file = read_config_file(path)?;
        Self::resolve(file, |name| std::env::var(name).ok())
            .with_context(|| format!("Incomplete configuration, checked {path:?} and environment"))
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |names: &[&str], from_file: Option<String>| {
            names
                .iter()
                .find_map(|&name| env(name))
                .or(from_file)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(store_url) = pick(&[URL_ENV], file.supabase_url) else {
            bail!("Missing store url: set `supabase_url` or {URL_ENV}");
        };
        let Some(store_key) = pick(&[KEY_ENV, KEY_ENV_ALIAS], file.supabase_key) else {
            bail!("Missing store key: set `supabase_key` or {KEY_ENV}");
        };
        let Some(engineer_id) = pick(&[ENGINEER_ENV], file.engineer_id) else {
            bail!("Missing engineer id: set `engineer_id` or {ENGINEER_ENV}");
        };

        Ok(Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            store_key,
            engineer_id: engineer_id.into(),
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {path:?}")),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read configuration file {path:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn full_file() -> ConfigFile {
        ConfigFile {
            supabase_url: Some("https://store.example.com/".into()),
            supabase_key: Some("file-key".into()),
            engineer_id: Some("eng-1".into()),
        }
    }

    #[test]
    fn file_values_are_used() -> Result<()> {
        let config = TrackerConfig::resolve(full_file(), env_of(&[]))?;
        assert_eq!(
            config,
            TrackerConfig {
                store_url: "https://store.example.com".into(),
                store_key: "file-key".into(),
                engineer_id: "eng-1".into(),
            }
        );
        Ok(())
    }

    #[test]
    fn environment_overrides_file() -> Result<()> {
        let env = env_of(&[(KEY_ENV_ALIAS, "anon-key"), (ENGINEER_ENV, "eng-9")]);
        let config = TrackerConfig::resolve(full_file(), env)?;
        assert_eq!(config.store_key, "anon-key");
        assert_eq!(&*config.engineer_id, "eng-9");
        assert_eq!(config.store_url, "https://store.example.com");
        Ok(())
    }

    #[test]
    fn missing_or_blank_values_are_errors() {
        let file = ConfigFile {
            engineer_id: Some("   ".into()),
            ..full_file()
        };
        let err = TrackerConfig::resolve(file, env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("engineer id"));

        let err = TrackerConfig::resolve(ConfigFile::default(), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("store url"));
    }

    #[test]
    fn reads_json_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "supabase_url": "https://x.example.com", "supabase_key": "k", "engineer_id": "e" }"#,
        )?;

        assert_eq!(read_config_file(&path)?, ConfigFile {
            supabase_url: Some("https://x.example.com".into()),
            supabase_key: Some("k".into()),
            engineer_id: Some("e".into()),
        });
        Ok(())
    }

    #[test]
    fn missing_file_is_empty_but_malformed_file_fails() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(
            read_config_file(&dir.path().join("absent.json"))?,
            ConfigFile::default()
        );

        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "supabase_url = 'toml?'")?;
        assert!(read_config_file(&path).is_err());
        Ok(())
    }
}
