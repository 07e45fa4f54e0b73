use std::path::Path;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::historytrends::ExportKind;
use crate::metadata::MetadataBackendKind;
use crate::util;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub run_id: String,
    #[serde(default = "default_convert_kind")]
    pub convert_kind: ExportKind,
    #[serde(default = "default_utc_offset")]
    pub convert_utc_offset: String,
    #[serde(default = "default_metadata_backend")]
    pub metadata_backend: MetadataBackendKind,
}

impl Config {
    pub fn convert_zone(&self) -> Result<FixedOffset> {
        util::parse_utc_offset(&self.convert_utc_offset)
            .with_context(|| format!("config key convert_utc_offset: {:?}", self.convert_utc_offset))
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p).with_context(|| format!("reading config {}", p.display()))?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes)?;
    if config.run_id.trim().is_empty() {
        config.run_id = generate_run_id();
    }
    config.convert_zone()?;

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig { config, config_hash })
}

fn default_convert_kind() -> ExportKind {
    ExportKind::Archived
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_metadata_backend() -> MetadataBackendKind {
    MetadataBackendKind::Jsonl
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}

fn generate_run_id() -> String {
    let now = chrono::Utc::now();
    format!("{}_{}", now.format("%Y%m%dT%H%M%SZ"), rand_suffix())
}

fn rand_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{:08x}", nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn embedded_default_loads() {
        let loaded = load_config(None).expect("config");
        assert_eq!(loaded.config.convert_kind, ExportKind::Archived);
        assert_eq!(loaded.config.metadata_backend, MetadataBackendKind::Jsonl);
        assert_eq!(loaded.config.convert_zone().expect("zone"), FixedOffset::east_opt(0).unwrap());
        assert!(!loaded.config.run_id.is_empty());
        assert_eq!(loaded.config_hash.len(), 64);
    }

    #[test]
    fn file_overrides_and_missing_keys_default() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cfg.yml");
        std::fs::write(&path, "run_id: fixed\nconvert_kind: analysis\nconvert_utc_offset: \"-06:00\"\n")
            .expect("write");
        let loaded = load_config(Some(&path)).expect("config");
        assert_eq!(loaded.config.run_id, "fixed");
        assert_eq!(loaded.config.convert_kind, ExportKind::Analysis);
        assert_eq!(loaded.config.metadata_backend, MetadataBackendKind::Jsonl);
        assert_eq!(
            loaded.config.convert_zone().expect("zone"),
            FixedOffset::west_opt(6 * 3600).unwrap()
        );
    }

    #[test]
    fn rejects_bad_offset() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("cfg.yml");
        std::fs::write(&path, "convert_utc_offset: \"6 hours\"\n").expect("write");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn hash_tracks_config_bytes() {
        assert_ne!(hash_bytes(b"run_id: a\n"), hash_bytes(b"run_id: b\n"));
    }
}
