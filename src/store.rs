use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};

use crate::model::AppConfig;

const STORE_DIR: &str = ".mbo";
const CONFIG_FILE: &str = "config.json";
const STORAGE_FILE: &str = "storage.json";

/// String key/value storage with the semantics of browser local storage.
///
/// Multi-key writes and removals are applied as one unit.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;

    fn remove_many(&self, keys: &[&str]) -> Result<()>;

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.remove_many(&[key])
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Key/value storage persisted as one JSON object file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(err) => {
                // A corrupted file reads as empty and is replaced.
                tracing::warn!(path = %self.path.display(), error = %err, "purging corrupted storage file");
                let empty = BTreeMap::new();
                if let Err(purge_err) = self.write_all(&empty) {
                    tracing::warn!(error = %format!("{:#}", purge_err), "purge storage file");
                }
                Ok(empty)
            }
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(map).context("serialize storage")?;
        write_atomic(&self.path, &bytes).with_context(|| format!("write {}", self.path.display()))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _held = self
            .guard
            .lock()
            .map_err(|_| anyhow!("file storage lock poisoned"))?;
        let mut map = self.read_all()?;
        f(&mut map);
        self.write_all(&map)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _held = self
            .guard
            .lock()
            .map_err(|_| anyhow!("file storage lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), value.clone());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

/// The `.mbo` directory holding console configuration and persisted session storage.
#[derive(Clone, Debug)]
pub struct ConsoleHome {
    root: PathBuf,
}

impl ConsoleHome {
    pub fn console_dir(base: &Path) -> PathBuf {
        base.join(STORE_DIR)
    }

    pub fn open(base: &Path) -> Result<Self> {
        let root = Self::console_dir(base);
        if !root.is_dir() {
            return Err(anyhow!(
                "No {} directory found at {} (run `mbo init --url ...`)",
                STORE_DIR,
                root.display()
            ));
        }
        Ok(Self { root })
    }

    pub fn init(base: &Path, cfg: &AppConfig, force: bool) -> Result<Self> {
        let root = Self::console_dir(base);
        if root.exists() && !force {
            return Err(anyhow!(
                "{} already exists at {} (use --force to re-init)",
                STORE_DIR,
                root.display()
            ));
        }
        fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

        let home = Self { root };
        home.write_config(cfg)?;
        Ok(home)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn read_config(&self) -> Result<AppConfig> {
        let bytes = fs::read(self.root.join(CONFIG_FILE)).context("read config.json")?;
        let cfg: AppConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
        if cfg.version != 1 {
            anyhow::bail!("unsupported console config version {}", cfg.version);
        }
        Ok(cfg)
    }

    pub fn write_config(&self, cfg: &AppConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
        write_atomic(&self.root.join(CONFIG_FILE), &bytes).context("write config.json")?;
        Ok(())
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.root.join(STORAGE_FILE))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
