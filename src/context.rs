use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Logged-in user's email; also keys the user's WhatsApp gateway instance.
pub const USER_EMAIL: &str = "user_email";
/// Account identifier folded into import fingerprints.
pub const ACCOUNT_ID: &str = "account_id";

pub const KNOWN_KEYS: &[&str] = &[USER_EMAIL, ACCOUNT_ID];

/// Per-user session values passed explicitly to commands instead of being
/// read from ambient global state. Persisted as a flat JSON object.
#[derive(Debug, Clone)]
pub struct SessionContext {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl SessionContext {
    /// Load from `path`; a missing file yields an empty context.
    pub fn load(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let old = self.values.remove(key);
        self.save()?;
        Ok(old)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.values.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        Ok(())
    }
}
