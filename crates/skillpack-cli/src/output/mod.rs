//! Terminal output formatting.
//!
//! Human-readable lines go through `OutputHandler`; with `--json` commands
//! print one JSON document to stdout instead.

pub mod colors;
pub mod errors;

use serde::Serialize;
use skillpack_core::error::{SkillError, SkillResult};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
    json: bool,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new(json: bool) -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
            json,
        }
    }

    /// Whether machine-readable output was requested
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print a plain line (command results)
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print a `label: value` pair with the label highlighted
    pub fn field(&self, label: &str, value: &str) {
        println!("{} {}", self.colors.bold(&format!("{}:", label)), value);
    }

    /// Print `value` as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> SkillResult<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(|e| SkillError::Io {
            message: "Failed to serialize output".to_string(),
            source: e.into(),
        })?;
        println!("{}", rendered);
        Ok(())
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new(false)
    }
}
