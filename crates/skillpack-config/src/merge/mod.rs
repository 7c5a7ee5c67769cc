//! Configuration layering, fallback logic, and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use skillpack_core::error::SkillError;
use std::collections::HashMap;
use tracing::debug;

use crate::toml::{parse_skillpack_toml, validate_config, SkillpackToml};
use crate::{ConfigResult, CONFIG_FILE_NAME};

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project skillpack.toml file
    Project(Utf8PathBuf),
    /// Explicit --config path
    Explicit(Utf8PathBuf),
    /// No file found, built-in defaults
    Defaults,
}

impl ConfigSource {
    /// Directory relative paths in the config are resolved against
    pub fn base_dir<'a>(&'a self, cwd: &'a Utf8Path) -> &'a Utf8Path {
        match self {
            ConfigSource::Global(path) | ConfigSource::Project(path) | ConfigSource::Explicit(path) => {
                path.parent().unwrap_or(cwd)
            },
            ConfigSource::Defaults => cwd,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Working directory the loader searches from
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Load the effective configuration.
    ///
    /// Layers, lowest priority first: global config, project (or explicit)
    /// config, `SKILLPACK_*` environment variables, CLI overrides.
    pub async fn load(
        &self,
        explicit: Option<&Utf8Path>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<(SkillpackToml, ConfigSource)> {
        let global = self.load_global_table().await?;

        let (project, source) = match explicit {
            Some(path) => {
                let path = if path.is_absolute() { path.to_path_buf() } else { self.cwd.join(path) };
                if !path.exists() {
                    return Err(SkillError::ConfigValidation {
                        field: "config".to_string(),
                        reason: format!("{} does not exist", path),
                    });
                }
                (Some(read_table(&path).await?), ConfigSource::Explicit(path))
            },
            None => match self.resolve_config_path(CONFIG_FILE_NAME) {
                Some(path) => (Some(read_table(&path).await?), ConfigSource::Project(path)),
                None => match &global {
                    Some((_, path)) => (None, ConfigSource::Global(path.clone())),
                    None => (None, ConfigSource::Defaults),
                },
            },
        };

        let mut merged = global.map(|(table, _)| table).unwrap_or_default();
        if let Some(project) = project {
            ConfigLayering::merge_tables(&mut merged, project);
        }

        let mut config: SkillpackToml = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| SkillError::TomlParse {
                message: format!("Invalid configuration: {}", e),
            })?;

        ConfigLayering::apply_env_overrides(&mut config, &ConfigLayering::collect_env_overrides())?;
        ConfigLayering::apply_cli_overrides(&mut config, cli_overrides)?;
        validate_config(&config)?;

        debug!(?source, "Loaded configuration");
        Ok((config, source))
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(filename);
            if config_path.is_file() {
                return Some(config_path);
            }
            current = dir.parent();
        }

        None
    }

    /// Path of the global configuration file (`~/.skillpack/config.toml`)
    pub fn global_config_path() -> Option<Utf8PathBuf> {
        let home_dir = dirs::home_dir()?;
        let home_dir = Utf8PathBuf::try_from(home_dir).ok()?;
        Some(home_dir.join(".skillpack").join("config.toml"))
    }

    async fn load_global_table(&self) -> ConfigResult<Option<(toml::Table, Utf8PathBuf)>> {
        match Self::global_config_path() {
            Some(path) if path.is_file() => Ok(Some((read_table(&path).await?, path))),
            _ => Ok(None),
        }
    }
}

/// Read a config file as a raw table, validating it on its own first
async fn read_table(path: &Utf8Path) -> ConfigResult<toml::Table> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SkillError::io(format!("Failed to read {}", path), e))?;

    parse_skillpack_toml(&content).map_err(|e| match e {
        SkillError::TomlParse { message } => SkillError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        other => other,
    })?;

    content.parse::<toml::Table>().map_err(|e| SkillError::TomlParse {
        message: format!("In file {}: {}", path, e),
    })
}

impl ConfigLayering {
    /// Merge `overlay` into `base`; nested tables merge key by key, other
    /// values in `overlay` win.
    pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
        for (key, value) in overlay {
            match (base.get_mut(&key), value) {
                (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                    Self::merge_tables(existing, incoming);
                },
                (_, value) => {
                    base.insert(key, value);
                },
            }
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(
        config: &mut SkillpackToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "SKILLPACK_REPO_URL" => {
                    config.repository.url = Some(value.clone());
                },
                "SKILLPACK_REPO_DIR" => {
                    config.repository.dir = Utf8PathBuf::from(value);
                },
                "SKILLPACK_CACHE_DIR" => {
                    config.cache.dir = Some(Utf8PathBuf::from(value));
                },
                "SKILLPACK_MAX_ARCHIVE_BYTES" => {
                    config.cache.max_archive_bytes = parse_number(key, value)?;
                },
                "SKILLPACK_BUILD_TIMEOUT_SECS" => {
                    config.cache.build_timeout_secs = parse_number(key, value)?;
                },
                "SKILLPACK_BASE_URL" => {
                    config.server.base_url = value.clone();
                },
                "SKILLPACK_INSTALL_DIR" => {
                    config.server.install_dir = value.clone();
                },
                "SKILLPACK_REFRESH_SECS" => {
                    config.refresh.interval_secs = parse_number(key, value)?;
                },
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    pub fn apply_cli_overrides(
        config: &mut SkillpackToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "root" => {
                    config.repository.dir = Utf8PathBuf::from(value);
                },
                "cache_dir" => {
                    config.cache.dir = Some(Utf8PathBuf::from(value));
                },
                _ => {
                    // Unknown CLI override, ignore
                },
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("SKILLPACK_"))
            .collect()
    }
}

fn parse_number(field: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse().map_err(|e| SkillError::ConfigValidation {
        field: field.to_string(),
        reason: format!("'{}' is not a number: {}", value, e),
    })
}
