//! Config discovery and loading.

use std::path::{Path, PathBuf};

use {
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::PalaverConfig};

/// Config file name, probed in the search locations in order.
const CONFIG_FILENAME: &str = "palaver.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load config from the given path, with env substitution.
pub fn load_config(path: &Path) -> Result<PalaverConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./palaver.toml` (project-local)
/// 2. `~/.config/palaver/palaver.toml` (user-global)
///
/// Falls back to [`PalaverConfig::default`] when no file is found or the
/// file fails to load.
pub fn discover_and_load() -> PalaverConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return PalaverConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            PalaverConfig::default()
        },
    }
}

/// First config file found in the standard locations, if any.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    let global = config_dir()?.join(CONFIG_FILENAME);
    global.exists().then_some(global)
}

/// The user-global config directory (`~/.config/palaver/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "palaver").map(|d| d.config_dir().to_path_buf())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9999\n\n[backend]\ncandidates = [\"only-model\"]\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.backend.candidates, vec!["only-model"]);
    }

    #[test]
    fn unresolved_placeholder_survives_into_the_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"${PALAVER_NO_SUCH_VAR_SET}\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.backend.base_url, "${PALAVER_NO_SUCH_VAR_SET}");
    }

    #[test]
    fn read_error_names_the_path() {
        let err = load_config(Path::new("/nonexistent/palaver.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/palaver.toml"));
    }

    #[test]
    fn parse_error_on_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palaver.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
