//! Pre-flight checks before starting work that needs the language model.
//!
//! Catches a missing API key up front instead of on the first request,
//! where it would only show up as fallback notes.

use crate::config::Settings;
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs the model API key.
    Serve,
    /// One-off processing needs the model API key.
    Process,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Process => {
            settings.llm.api_key()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "LECTUREMIND_PREFLIGHT_UNSET_KEY".to_string();
        assert!(check(Operation::Serve, &settings).is_err());
        assert!(check(Operation::Process, &settings).is_err());
    }
}
