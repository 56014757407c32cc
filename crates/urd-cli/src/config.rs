//! Where urd keeps its store, and how that is configured.
//!
//! Sources, later ones winning: built-in default, `~/.config/urd/config.toml`,
//! the file given with `--config`, then `URD_*` environment variables.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON store file. A leading `~/` is expanded to the home directory.
    pub store_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store_path", &self.store_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            store_path: data_dir.join("urd.json"),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::from_figment(&Self::figment(config_path))
    }

    /// The layered providers, without extracting.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("URD_"))
    }

    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let mut config: Self = figment.extract()?;
        config.store_path = expand_home(&config.store_path, dirs::home_dir().as_deref());
        Ok(config)
    }

    /// `<store>.lock`, the advisory lock file guarding the store.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.store_path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("urd"))
}

/// Platform data directory for urd; `~/.local/share/urd` on Linux.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("urd"))
}
