//! Project configuration file.
//!
//! The salt must outlive a single run: reusing it across re-encryptions is
//! what keeps remember-me keys valid. It is kept in a small JSON file next to
//! the project, `.pagelock.json` by default:
//!
//! ```json
//! { "salt": "00112233445566778899aabbccddeeff" }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::salt::Salt;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".pagelock.json";

/// Persistence seam for the salt. The codec validates what comes out but
/// does not care where it is kept.
pub trait SaltStore {
    fn load_salt(&self) -> Result<Option<String>>;
    fn store_salt(&mut self, salt: &Salt) -> Result<()>;
}

/// Contents of the config file. Keys this crate does not know about are
/// kept and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A [`SaltStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `.pagelock.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. A missing file is an empty config.
    pub fn read(&self) -> Result<ProjectConfig> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(ProjectConfig::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn write(&self, config: &ProjectConfig) -> Result<()> {
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), "wrote config file");
        Ok(())
    }
}

impl SaltStore for JsonConfigStore {
    fn load_salt(&self) -> Result<Option<String>> {
        Ok(self.read()?.salt)
    }

    fn store_salt(&mut self, salt: &Salt) -> Result<()> {
        let mut config = self.read()?;
        if config.salt.as_deref() == Some(salt.as_str()) {
            return Ok(());
        }
        config.salt = Some(salt.to_string());
        self.write(&config)
    }
}
