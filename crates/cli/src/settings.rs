//! Settings resolution shared by the subcommands, and `jdfmerge validate`.

use std::path::Path;

use jdfmerge_config::{Settings, SettingsError};

use crate::exit_codes::{EXIT_ERROR, EXIT_INVALID_SETTINGS};
use crate::CliError;

fn settings_err(err: SettingsError) -> CliError {
    let hint = match &err {
        SettingsError::Read { .. } => "check the --config path",
        SettingsError::Parse(_) | SettingsError::Validation(_) => {
            "run `jdfmerge validate` after editing the settings file"
        }
    };
    CliError::new(EXIT_INVALID_SETTINGS, err.to_string()).with_hint(hint)
}

/// Load settings from `config` (or the default location).
pub fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    let settings = Settings::load(config).map_err(settings_err)?;
    match config {
        Some(path) => log::debug!("settings loaded from {}", path.display()),
        None => log::debug!("settings from {} or built-in defaults", Settings::config_path().display()),
    }
    Ok(settings)
}

/// Re-check settings after command-line overrides were applied.
pub fn check_overrides(settings: &Settings) -> Result<(), CliError> {
    settings.validate().map_err(|e| CliError::new(EXIT_INVALID_SETTINGS, e.to_string()))
}

pub fn cmd_validate(config: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let rendered = toml::to_string_pretty(&settings)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot render settings: {e}")))?;
    print!("{rendered}");
    eprintln!("settings OK");
    Ok(())
}
