//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after configuration is resolved. Logs go to
//! stderr so they never interleave with replies on stdout.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::core::error::{ParleyError, Result};

/// Check that `level` is a plain level (`"error"` through `"trace"`, `"off"`)
/// or a valid `EnvFilter` directive such as `"parley=debug,reqwest=warn"`.
pub fn check_level(level: &str) -> Result<()> {
    let level = level.trim();
    if level.is_empty() {
        return Err(ParleyError::Logger("log level must not be empty".into()));
    }
    if level.parse::<LevelFilter>().is_ok() {
        return Ok(());
    }
    EnvFilter::try_new(level)
        .map(|_| ())
        .map_err(|e| ParleyError::Logger(format!("unrecognised log level '{level}': {e}")))
}

/// Pick the filter from `level` and `RUST_LOG`.
///
/// With `prefer_level`, `level` wins and `RUST_LOG` is only a fallback for an
/// invalid `level`. Otherwise `RUST_LOG` wins when it parses.
fn select_filter(level: &str, prefer_level: bool) -> Result<EnvFilter> {
    let from_level = || {
        check_level(level)?;
        EnvFilter::try_new(level.trim())
            .map_err(|e| ParleyError::Logger(format!("invalid log level '{level}': {e}")))
    };

    if prefer_level {
        from_level().or_else(|level_err| {
            EnvFilter::try_from_default_env().map_err(|env_err| {
                ParleyError::Logger(format!("{level_err}; RUST_LOG parse failed: {env_err}"))
            })
        })
    } else {
        EnvFilter::try_from_default_env().or_else(|_| from_level())
    }
}

/// Initialise the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(level: &str, prefer_level: bool) -> Result<()> {
    let filter = select_filter(level, prefer_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| ParleyError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels_and_directives_are_accepted() {
        for level in ["error", "warn", "INFO", "debug", "trace", "off", "parley=debug,reqwest=warn"] {
            assert!(check_level(level).is_ok(), "expected '{level}' to be valid");
        }
    }

    #[test]
    fn test_bad_levels_are_rejected() {
        assert!(matches!(check_level(""), Err(ParleyError::Logger(_))));
        assert!(check_level("   ").is_err());
        assert!(check_level("parley=loud").is_err());
    }

    #[test]
    fn test_preferred_level_wins() {
        assert!(select_filter("debug", true).is_ok());
    }

    #[test]
    fn test_init_succeeds_or_already_installed() {
        match init("warn", true) {
            Ok(()) => {}
            Err(ParleyError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
