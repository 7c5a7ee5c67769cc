//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the shared `CommandContext`.

use camino::Utf8PathBuf;
use skillpack_config::{ConfigLoader, ConfigSource, SkillpackToml};
use skillpack_core::error::{SkillError, SkillResult};
use skillpack_core::{Catalog, Package};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub mod check;
pub mod info;
pub mod list;
pub mod pack;
pub mod sync;
pub mod tree;


use crate::hub::SkillHub;
use crate::output::OutputHandler;
use crate::{Commands, GlobalArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: PathBuf,
    pub output: OutputHandler,
    pub config: SkillpackToml,
    pub config_source: ConfigSource,
    pub hub: Arc<SkillHub>,
}

impl CommandContext {
    /// Load configuration and set up the hub
    pub async fn new(global: &GlobalArgs) -> SkillResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| SkillError::Io {
            message: "Failed to get current directory".to_string(),
            source: e,
        })?;
        let cwd_utf8 = Utf8PathBuf::from_path_buf(cwd.clone()).map_err(|path| SkillError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;

        let mut overrides = HashMap::new();
        if let Some(root) = &global.root {
            overrides.insert("root".to_string(), cwd_utf8.join(root).into_string());
        }

        let loader = ConfigLoader::new(cwd_utf8.clone());
        let (config, source) = loader.load(global.config.as_deref(), &overrides).await?;

        Ok(Self::from_parts(cwd_utf8, config, source, global.json))
    }

    /// Build a context from already-loaded configuration
    pub fn from_parts(cwd: Utf8PathBuf, config: SkillpackToml, source: ConfigSource, json: bool) -> Self {
        let base = source.base_dir(&cwd).to_path_buf();
        let hub = Arc::new(SkillHub::new(&config, &base));

        Self {
            cwd: cwd.into_std_path_buf(),
            output: OutputHandler::new(json),
            config,
            config_source: source,
            hub,
        }
    }

    /// Scan the repository and return the fresh snapshot
    pub async fn catalog(&self) -> SkillResult<Arc<Catalog>> {
        self.hub.rescan().await
    }

    /// Look up `id`, failing with a not-found error and a spelling hint
    pub fn require_skill<'c>(&self, catalog: &'c Catalog, id: &str) -> SkillResult<&'c Package> {
        if let Some(package) = catalog.get(id) {
            return Ok(package);
        }
        if !self.output.is_json() {
            if let Some(suggestion) = suggest_similar_skill(id, catalog.ids()) {
                self.output.info(&format!("Did you mean '{}'?", suggestion));
            }
        }
        Err(SkillError::not_found(id))
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> SkillResult<()> {
    match command {
        Commands::List { keyword } => {
            info!("Listing skills (keyword: {:?})", keyword);
            list::execute(keyword, ctx).await
        },
        Commands::Info { id } => {
            info!("Showing skill: {}", id);
            info::execute(id, ctx).await
        },
        Commands::Tree { id } => {
            info!("Printing dependency tree: {}", id);
            tree::execute_tree(id, ctx).await
        },
        Commands::Deps { id } => {
            info!("Printing flattened dependencies: {}", id);
            tree::execute_deps(id, ctx).await
        },
        Commands::Pack { key, output } => {
            info!("Packing archive: {}", key);
            pack::execute_pack(key, output, ctx).await
        },
        Commands::Unpack { archive, dest, overwrite } => {
            info!("Unpacking {} into {}", archive.display(), dest.display());
            pack::execute_unpack(archive, dest, overwrite, ctx).await
        },
        Commands::Check => {
            info!("Checking catalog");
            check::execute(ctx).await
        },
        Commands::Sync => {
            info!("Syncing repository");
            sync::execute_sync(ctx).await
        },
        Commands::Clean => {
            info!("Cleaning archive cache");
            clean_cache(ctx).await
        },
        Commands::Watch { interval, runs } => {
            info!("Watching repository (interval: {:?}, runs: {:?})", interval, runs);
            sync::execute_watch(interval, runs, ctx).await
        },
        Commands::Version => show_version(ctx).await,
    }
}

async fn clean_cache(ctx: &CommandContext) -> SkillResult<()> {
    let cache = ctx.hub.cache();
    let removed = cache.entries()?.len();
    cache.invalidate()?;

    if ctx.output.is_json() {
        return ctx.output.json(&serde_json::json!({
            "cache_dir": cache.dir(),
            "removed": removed,
        }));
    }
    ctx.output.success(&format!("Removed {} cached archive(s) from {}", removed, cache.dir().display()));
    Ok(())
}

async fn show_version(ctx: &CommandContext) -> SkillResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.line(&format!("skillpack v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.info(&format!("Commit: {}", env!("GIT_HASH")));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));
    ctx.output.info(&format!("Config: {}", describe_source(&ctx.config_source)));

    Ok(())
}

fn describe_source(source: &ConfigSource) -> String {
    match source {
        ConfigSource::Global(path) => format!("{} (global)", path),
        ConfigSource::Project(path) => format!("{} (project)", path),
        ConfigSource::Explicit(path) => format!("{} (--config)", path),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    }
}

/// Closest skill id within edit distance 2
pub fn suggest_similar_skill<'a>(input: &str, ids: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for id in ids {
        let distance = edit_distance(input, id);
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(id);
        }
    }

    best_match.map(str::to_string)
}

/// Calculate edit distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row of the Levenshtein matrix
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}

/// Resolve `path` against the working directory
pub(crate) fn absolutize(cwd: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
