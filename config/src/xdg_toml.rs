//! Load the `[env]` table from `$XDG_CONFIG_HOME/<app>/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// Path of the app config file, whether or not it exists. XDG layout on every platform:
/// `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = cross_xdg::BaseDirs::new().map_err(|e| LoadError::XdgPath(e.to_string()))?;
    Ok(base.config_home().join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Returns the `[env]` pairs. Missing file or missing section returns an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &std::path::Path, app: &str, body: &str) {
        let app_dir = root.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn config_path_follows_xdg_config_home() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            assert_eq!(
                config_path("parley").unwrap(),
                dir.path().join("parley").join("config.toml")
            );
        });
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            assert!(load_env_map("parley").unwrap().is_empty());
        });
    }

    #[test]
    fn reads_env_table() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "parley",
            "[env]\nTAVILY_API_KEY = \"tvly-test\"\nPARLEY_MODEL = \"gpt-4o-mini\"\n",
        );
        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            let map = load_env_map("parley").unwrap();
            assert_eq!(map.get("TAVILY_API_KEY").map(String::as_str), Some("tvly-test"));
            assert_eq!(map.get("PARLEY_MODEL").map(String::as_str), Some("gpt-4o-mini"));
        });
    }

    #[test]
    fn file_without_env_section_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "parley", "[other]\nkey = 1\n");
        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            assert!(load_env_map("parley").unwrap().is_empty());
        });
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "parley", "[env\nBROKEN");
        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            assert!(matches!(load_env_map("parley"), Err(LoadError::XdgParse(_))));
        });
    }
}
