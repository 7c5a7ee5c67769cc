//! Error message formatting with actionable suggestions.

use super::colors::ColorSupport;
use skillpack_core::error::SkillError;
use std::error::Error;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self {
            colors: ColorSupport::disabled(),
        }
    }

    /// Format an error with its suggestion and source chain
    pub fn format_error(&self, error: &SkillError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_suggestion() {
        let formatted = ErrorFormatter::plain().format_error(&SkillError::not_found("devops-flow"));

        assert!(formatted.starts_with("error: Skill 'devops-flow' not found\n"));
        assert!(formatted.contains("\nhelp: "));
    }

    #[test]
    fn test_format_source_chain() {
        let err = SkillError::io(
            "Failed to read skillpack.toml".to_string(),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        );
        let formatted = ErrorFormatter::plain().format_error(&err);

        assert!(formatted.contains("caused by: permission denied"));
    }
}
