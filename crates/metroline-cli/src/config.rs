//! Layout settings for a CLI run.
//!
//! Settings come from the first config file found, falling back to the
//! built-in layout defaults, and `--mode` from the command line overrides
//! whichever layout mode they name.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use metroline::config::{AppConfig, LayoutMode};

use crate::error::CliError;

/// Config file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "metroline/config.toml";

/// Where the layout settings of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// A file named with `--config`; it must exist.
    Explicit(PathBuf),
    /// `metroline/config.toml` under the working directory.
    Local(PathBuf),
    /// `config.toml` in the user's platform config directory.
    User(PathBuf),
    /// No file, built-in defaults.
    Defaults,
}

impl ConfigSource {
    /// Picks the source for a run. An explicit path always wins, even when
    /// the file is missing, so that a typo is reported instead of ignored.
    fn locate(explicit: Option<PathBuf>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::Local(local);
        }

        match ProjectDirs::from("com", "metroline", "metroline") {
            Some(dirs) => {
                let user = dirs.config_dir().join("config.toml");
                if user.is_file() {
                    return Self::User(user);
                }
                debug!(path = user.display().to_string(); "No user configuration");
            }
            None => debug!("No platform config directory"),
        }
        Self::Defaults
    }

    fn read(&self) -> Result<AppConfig, CliError> {
        let path = match self {
            Self::Explicit(path) | Self::Local(path) | Self::User(path) => path,
            Self::Defaults => return Ok(AppConfig::default()),
        };
        if !path.is_file() {
            return Err(CliError::MissingConfig(path.clone()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (--config)", path.display()),
            Self::Local(path) => write!(f, "{} (working directory)", path.display()),
            Self::User(path) => write!(f, "{} (user config)", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Resolves the layout settings for a run.
///
/// The config file is taken from `explicit` if given, otherwise from
/// `metroline/config.toml` or the user's config directory. `mode` replaces
/// the layout mode of the loaded settings. The result is validated after
/// the override is applied.
///
/// # Errors
///
/// Returns [`CliError::MissingConfig`] when the explicit file does not
/// exist and [`CliError::Config`] when a file cannot be parsed or holds
/// invalid layout parameters.
pub fn load_config(
    explicit: Option<impl AsRef<Path>>,
    mode: Option<LayoutMode>,
) -> Result<AppConfig, CliError> {
    let source = ConfigSource::locate(explicit.map(|path| path.as_ref().to_path_buf()));
    let mut config = source.read()?;
    if let Some(mode) = mode {
        config = config.with_mode(mode);
    }

    let layout = config.layout();
    layout
        .validate()
        .map_err(|e| CliError::Config(format!("{source}: {e}")))?;
    info!(
        source:% = source,
        mode:? = layout.mode(),
        cell_size = layout.cell_size(),
        overridden = mode.is_some();
        "Layout settings resolved"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[layout]\nmode = \"linear\"\ncell_size = 50.0\nsnap_search_radius = 2\n",
        )
        .unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.layout().mode(), LayoutMode::Linear);
        assert_eq!(config.layout().cell_size(), 50.0);
        assert_eq!(config.layout().snap_search_radius(), 2);
        assert_eq!(config.layout().line_spacing(), 1.2);
    }

    #[test]
    fn test_mode_override_keeps_file_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nmode = \"linear\"\ncell_size = 50.0\n").unwrap();

        let config = load_config(Some(&path), Some(LayoutMode::Grid)).unwrap();
        assert_eq!(config.layout().mode(), LayoutMode::Grid);
        assert_eq!(config.layout().cell_size(), 50.0);
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(Some(&path), Some(LayoutMode::Linear)),
            Err(CliError::MissingConfig(_))
        ));
    }

    #[test]
    fn test_invalid_values_name_their_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\ncell_size = -1.0\n").unwrap();

        let err = load_config(Some(&path), None).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ref msg) if msg.contains("cell_size") && msg.contains("--config")
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\n").unwrap();
        assert!(matches!(load_config(Some(&path), None), Err(CliError::Config(_))));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ConfigSource::Defaults.to_string(), "built-in defaults");
        let local = ConfigSource::Local(PathBuf::from(LOCAL_CONFIG));
        assert_eq!(local.to_string(), "metroline/config.toml (working directory)");
        assert_eq!(
            ConfigSource::locate(Some(PathBuf::from("x.toml"))),
            ConfigSource::Explicit(PathBuf::from("x.toml"))
        );
    }
}
