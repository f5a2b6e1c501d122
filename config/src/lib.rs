//! Load configuration from XDG `config.toml` and a project `.env`, then apply it to the
//! process environment with priority: **existing env > .env > XDG**.

mod env_file;
mod xdg_toml;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(String),
}

/// Where the XDG config for `app_name` lives (`~/.config/<app_name>/config.toml` on Linux).
pub fn xdg_config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    xdg_toml::config_path(app_name)
}

/// Merges `.env` over the XDG `[env]` table without consulting the process environment.
pub fn collect_env(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<HashMap<String, String>, LoadError> {
    let mut merged = xdg_toml::load_env_map(app_name)?;
    merged.extend(env_file::load_env_map(override_dir)?);
    Ok(merged)
}

/// Loads config from XDG `config.toml` and optional project `.env`, then sets environment
/// variables only for keys that are **not** already set.
///
/// * `app_name`: e.g. `"parley"`, used for the XDG path.
/// * `override_dir`: if `Some`, look for `.env` there instead of the current directory.
///
/// Returns the keys that were applied.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let merged = collect_env(app_name, override_dir)?;
    let mut applied = Vec::new();
    for (key, value) in merged {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        applied.push(key);
    }
    applied.sort();
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xdg_with(app: &str, body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
        dir
    }

    #[test]
    fn dotenv_overrides_xdg_in_merge() {
        let xdg = xdg_with("parley", "[env]\nPARLEY_TEST_PRIORITY = \"from_xdg\"\nPARLEY_TEST_XDG_ONLY = \"x\"\n");
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join(".env"), "PARLEY_TEST_PRIORITY=from_dotenv\n").unwrap();

        temp_env::with_var("XDG_CONFIG_HOME", Some(xdg.path()), || {
            let merged = collect_env("parley", Some(project.path())).unwrap();
            assert_eq!(merged.get("PARLEY_TEST_PRIORITY").map(String::as_str), Some("from_dotenv"));
            assert_eq!(merged.get("PARLEY_TEST_XDG_ONLY").map(String::as_str), Some("x"));
        });
    }

    #[test]
    fn existing_env_wins() {
        let xdg = xdg_with("parley", "[env]\nPARLEY_TEST_EXISTING = \"from_xdg\"\n");
        let project = tempfile::tempdir().unwrap();
        temp_env::with_vars(
            [
                ("XDG_CONFIG_HOME", Some(xdg.path().as_os_str())),
                ("PARLEY_TEST_EXISTING", Some("from_env".as_ref())),
            ],
            || {
                let applied = load_and_apply("parley", Some(project.path())).unwrap();
                assert!(applied.is_empty());
                assert_eq!(std::env::var("PARLEY_TEST_EXISTING").as_deref(), Ok("from_env"));
            },
        );
    }

    #[test]
    fn missing_keys_are_applied() {
        let xdg = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join(".env"), "PARLEY_TEST_DOTENV_ONLY=yes\n").unwrap();
        temp_env::with_vars(
            [
                ("XDG_CONFIG_HOME", Some(xdg.path().as_os_str())),
                ("PARLEY_TEST_DOTENV_ONLY", None),
            ],
            || {
                let applied = load_and_apply("parley", Some(project.path())).unwrap();
                assert_eq!(applied, vec!["PARLEY_TEST_DOTENV_ONLY".to_string()]);
                assert_eq!(std::env::var("PARLEY_TEST_DOTENV_ONLY").as_deref(), Ok("yes"));
            },
        );
    }

    #[test]
    fn no_sources_is_ok() {
        let xdg = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(xdg.path()), || {
            assert!(load_and_apply("parley", Some(project.path())).unwrap().is_empty());
        });
    }
}
