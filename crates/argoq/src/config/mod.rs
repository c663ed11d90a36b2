use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};

pub const COLUMN_CACHE_TTL_ENV: &str = "ARGOQ_COLUMN_CACHE_TTL_SECS";
pub const DEFAULT_COLUMN_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
}

pub fn resolve_runtime_paths(home_dir: &Path, cwd: &Path) -> Result<RuntimePaths> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    Ok(RuntimePaths {
        home_dir: normalize_lexical(home_dir),
        cwd: normalize_lexical(cwd),
    })
}

impl RuntimePaths {
    /// Resolves a user-supplied path such as `--catalog-db`: `~` expands to
    /// the home directory, relative paths hang off the working directory.
    pub fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        let expanded = expand_tilde(path, &self.home_dir)?;
        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            self.cwd.join(expanded)
        };

        Ok(normalize_lexical(&resolved))
    }
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

/// Knobs for the column catalog cache. Only long-lived embedders that keep a
/// `CachedColumnCatalog` across many compiles benefit; a single CLI run
/// introspects once and skips the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    pub column_cache_ttl: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            column_cache_ttl: DEFAULT_COLUMN_CACHE_TTL,
        }
    }
}

impl CatalogSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(COLUMN_CACHE_TTL_ENV).ok().as_deref())
    }

    /// Unparseable values fall back to the default TTL.
    #[must_use]
    pub fn from_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match raw.parse::<u64>() {
            Ok(seconds) => Self {
                column_cache_ttl: Duration::from_secs(seconds),
            },
            Err(error) => {
                tracing::warn!(
                    variable = COLUMN_CACHE_TTL_ENV,
                    value = raw,
                    %error,
                    "ignoring invalid cache ttl"
                );
                Self::default()
            }
        }
    }
}
