//! skillpack.toml configuration parsing and serialization

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use skillpack_core::error::SkillError;
use std::time::Duration;

use crate::ConfigResult;

/// Complete skillpack.toml configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillpackToml {
    /// Where skills live and where they are synced from
    pub repository: RepositorySection,

    /// Archive cache settings
    pub cache: CacheSection,

    /// Download URLs and install hints
    pub server: ServerSection,

    /// Periodic refresh job
    pub refresh: RefreshSection,
}

/// Skill repository section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySection {
    /// Git remote to clone/pull. No remote means the directory is used as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Local checkout whose subdirectories are skills
    pub dir: Utf8PathBuf,
}

/// Archive cache section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Cache directory. Defaults to `<repository.dir>/.skill-cache`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<Utf8PathBuf>,

    /// Ceiling on uncompressed bytes added to one archive
    pub max_archive_bytes: u64,

    /// Ceiling on wall-clock time spent building one archive
    pub build_timeout_secs: u64,
}

/// Download surface section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Prefix for `/download/<key>` URLs
    pub base_url: String,

    /// Default install directory used in install instructions
    pub install_dir: String,
}

/// Refresh job section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    /// Seconds between sync + rescan runs
    pub interval_secs: u64,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            url: None,
            dir: Utf8PathBuf::from("skills"),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: None,
            max_archive_bytes: 512 * 1024 * 1024,
            build_timeout_secs: 120,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            install_dir: "~/.claude/skills".to_string(),
        }
    }
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self { interval_secs: 3600 }
    }
}

impl SkillpackToml {
    /// Repository directory, resolved against `base` when relative
    pub fn repository_dir(&self, base: &Utf8Path) -> Utf8PathBuf {
        absolutize(base, &self.repository.dir)
    }

    /// Cache directory, resolved against `base` when relative
    pub fn cache_dir(&self, base: &Utf8Path) -> Utf8PathBuf {
        match &self.cache.dir {
            Some(dir) => absolutize(base, dir),
            None => self.repository_dir(base).join(".skill-cache"),
        }
    }

    /// Archive build timeout
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.cache.build_timeout_secs)
    }

    /// Refresh interval
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

fn absolutize(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Parse TOML string to SkillpackToml configuration
pub fn parse_skillpack_toml(content: &str) -> ConfigResult<SkillpackToml> {
    let config: SkillpackToml = toml::from_str(content).map_err(|e| SkillError::TomlParse {
        message: format!("TOML parsing error: {}", e),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize SkillpackToml to TOML string
pub fn serialize_skillpack_toml(config: &SkillpackToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| SkillError::TomlParse {
        message: format!("TOML serialization error: {}", e),
    })
}

/// Validate configuration values
pub fn validate_config(config: &SkillpackToml) -> ConfigResult<()> {
    if config.repository.dir.as_str().is_empty() {
        return Err(SkillError::ConfigValidation {
            field: "repository.dir".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    if let Some(url) = &config.repository.url {
        if url.trim().is_empty() {
            return Err(SkillError::ConfigValidation {
                field: "repository.url".to_string(),
                reason: "must not be blank; remove the key to disable syncing".to_string(),
            });
        }
    }

    if config.cache.max_archive_bytes == 0 {
        return Err(SkillError::ConfigValidation {
            field: "cache.max_archive_bytes".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.cache.build_timeout_secs == 0 {
        return Err(SkillError::ConfigValidation {
            field: "cache.build_timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.refresh.interval_secs == 0 {
        return Err(SkillError::ConfigValidation {
            field: "refresh.interval_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if !config.server.base_url.starts_with("http://") && !config.server.base_url.starts_with("https://") {
        return Err(SkillError::ConfigValidation {
            field: "server.base_url".to_string(),
            reason: format!("'{}' is not an http(s) URL", config.server.base_url),
        });
    }

    Ok(())
}

/// Load and parse skillpack.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<SkillpackToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SkillError::io(format!("Failed to read {}", path), e))?;

    parse_skillpack_toml(&content).map_err(|e| match e {
        SkillError::TomlParse { message } => SkillError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        SkillError::ConfigValidation { field, reason } => SkillError::ConfigValidation {
            field,
            reason: format!("{} (in {})", reason, path),
        },
        other => other,
    })
}
