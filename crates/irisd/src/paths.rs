use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "IRISD_CONFIG_DIR";
pub const ENV_CACHE_DIR: &str = "IRISD_CACHE_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Iris";
const APPLICATION: &str = "irisd";

const CONFIG_FILE: &str = "config.toml";
const FALLBACK_IMAGE: &str = "fallback.png";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;

        Ok(Self {
            config_dir: resolve_directory(
                env::var_os(ENV_CONFIG_DIR),
                project_dirs.config_dir(),
            ),
            cache_dir: resolve_directory(env::var_os(ENV_CACHE_DIR), project_dirs.cache_dir()),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Where the static disc is written when no GPU surface is available.
    pub fn fallback_image(&self) -> PathBuf {
        self.cache_dir.join(FALLBACK_IMAGE)
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "failed to create cache directory {}",
                self.cache_dir.display()
            )
        })
    }
}

/// Empty overrides are ignored so `IRISD_CACHE_DIR=` falls back to the default.
fn resolve_directory(override_value: Option<OsString>, default: &Path) -> PathBuf {
    match override_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => default.to_path_buf(),
    }
}
