//! Centralized path resolution for openboot
//!
//! # Environment Variables
//!
//! - `OPENBOOT_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/openboot`)
//! - `OPENBOOT_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `OPENBOOT_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/openboot` (if set)
//! 3. `~/.config/openboot`
//!
//! For state_dir():
//! 1. `OPENBOOT_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/openboot` (if set)
//! 3. `~/.local/state/openboot`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "OPENBOOT_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "OPENBOOT_STATE_DIR";

const APP_DIR: &str = "openboot";

/// Get the openboot config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the openboot state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_DIR);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_DIR);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Settings file (`config.toml` in the config directory)
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Install ledger (`install_state.json` in the state directory)
pub fn install_state_file() -> Result<PathBuf> {
    Ok(state_dir()?.join("install_state.json"))
}

/// Snapshot written by `openboot snapshot` and read by `openboot clean`
pub fn local_snapshot_file() -> Result<PathBuf> {
    Ok(state_dir()?.join("snapshot.json"))
}

/// Home directory, used as the root for shell configuration probes
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine home directory")
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch the process environment.
    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Run `f` with `key` set to `value`, restoring the previous value after.
    ///
    /// Callers must hold [`env_lock`].
    pub(crate) fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: env_lock serializes every test that reads or writes env vars
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: as above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    /// Run `f` with `key` unset, restoring the previous value after.
    ///
    /// Callers must hold [`env_lock`].
    pub(crate) fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: env_lock serializes every test that reads or writes env vars
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: as above
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        let _guard = env_lock();
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            let result = config_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/config/path"));
        });
    }

    #[test]
    fn test_config_dir_env_override_with_tilde() {
        let _guard = env_lock();
        let home = dirs::home_dir().unwrap();
        let expected = home.join("dotfiles").join("openboot-tilde-test");
        with_env_var(ENV_CONFIG_DIR, "~/dotfiles/openboot-tilde-test", || {
            let result = config_dir().unwrap();
            assert_eq!(result, expected);
        });
    }

    #[test]
    fn test_xdg_config_home() {
        let _guard = env_lock();
        without_env_var(ENV_CONFIG_DIR, || {
            with_env_var("XDG_CONFIG_HOME", "/tmp/xdg-config-test", || {
                let result = config_dir().unwrap();
                assert_eq!(result, PathBuf::from("/tmp/xdg-config-test/openboot"));
                assert_eq!(
                    settings_file().unwrap(),
                    PathBuf::from("/tmp/xdg-config-test/openboot/config.toml")
                );
            });
        });
    }

    #[test]
    fn test_state_dir_env_override() {
        let _guard = env_lock();
        with_env_var(ENV_STATE_DIR, "/custom/state/path", || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/custom/state/path"));
            assert_eq!(
                install_state_file().unwrap(),
                PathBuf::from("/custom/state/path/install_state.json")
            );
            assert_eq!(
                local_snapshot_file().unwrap(),
                PathBuf::from("/custom/state/path/snapshot.json")
            );
        });
    }

    #[test]
    fn test_xdg_state_home() {
        let _guard = env_lock();
        without_env_var(ENV_STATE_DIR, || {
            with_env_var("XDG_STATE_HOME", "/tmp/xdg-state-test", || {
                let result = state_dir().unwrap();
                assert_eq!(result, PathBuf::from("/tmp/xdg-state-test/openboot"));
            });
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_default_state_dir_unix() {
        let _guard = env_lock();
        without_env_var(ENV_STATE_DIR, || {
            without_env_var("XDG_STATE_HOME", || {
                let result = state_dir().unwrap();
                let home = dirs::home_dir().unwrap();
                assert_eq!(result, home.join(".local").join("state").join("openboot"));
            });
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        let result = expand("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_with_env_var() {
        let _guard = env_lock();
        with_env_var("OPENBOOT_TEST_VAR", "test_value", || {
            let result = expand("/path/$OPENBOOT_TEST_VAR/file");
            assert_eq!(result, PathBuf::from("/path/test_value/file"));
        });
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }
}
