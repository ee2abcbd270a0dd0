// Merge settings
// Loaded from ~/.config/jdfmerge/jdfmerge.toml unless a path is given

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings parse error: {0}")]
    Parse(String),

    #[error("invalid settings: {0}")]
    Validation(String),
}

/// Where the batches come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    /// Container archive of batch archives
    pub archive: PathBuf,

    /// Authoritative stop list
    pub reference_stops: PathBuf,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            archive: PathBuf::from("data/JDF.zip"),
            reference_stops: PathBuf::from("data/stops.txt"),
        }
    }
}

/// Where and how the merged dataset is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: PathBuf,

    /// Written to the version table
    pub dataset_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/out"),
            dataset_name: "Autobusy".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub source: SourceSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Default settings file location
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jdfmerge");
        config_dir.join("jdfmerge.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// used, falling back to built-in defaults when that file is absent.
    /// Relative paths in a file resolve against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&contents)?;
        Ok(match path.parent() {
            Some(base) => settings.resolve(base),
            None => settings,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let paths = [
            ("source.archive", &self.source.archive),
            ("source.reference_stops", &self.source.reference_stops),
            ("output.dir", &self.output.dir),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::Validation(format!("{key} must not be empty")));
            }
        }

        if self.output.dataset_name.trim().is_empty() {
            return Err(SettingsError::Validation(
                "output.dataset_name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Make relative paths absolute against `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        for path in [
            &mut self.source.archive,
            &mut self.source.reference_stops,
            &mut self.output.dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output.dataset_name, "Autobusy");
    }

    #[test]
    fn partial_sections() {
        let settings = Settings::from_toml(
            r#"
[output]
dataset_name = "Autobusy 2015"
"#,
        )
        .unwrap();
        assert_eq!(settings.output.dataset_name, "Autobusy 2015");
        assert_eq!(settings.output.dir, PathBuf::from("data/out"));
        assert_eq!(settings.source, SourceSettings::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Settings::from_toml("[source]\nserver = \"ftp.cisjr.cz\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn empty_name_rejected() {
        let err = Settings::from_toml("[output]\ndataset_name = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("dataset_name"));
    }

    #[test]
    fn empty_path_rejected() {
        let err = Settings::from_toml("[source]\narchive = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("source.archive"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let mut settings = Settings::default();
        let absolute = std::env::temp_dir().join("JDF.zip");
        settings.source.archive = absolute.clone();

        let resolved = settings.resolve(Path::new("/srv/jdf"));
        assert_eq!(resolved.source.archive, absolute);
        assert_eq!(resolved.output.dir, Path::new("/srv/jdf").join("data/out"));
    }

    #[test]
    fn load_resolves_against_file_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jdfmerge.toml");
        fs::write(&path, "[source]\narchive = \"in/JDF.zip\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.source.archive, dir.path().join("in/JDF.zip"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("none.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
