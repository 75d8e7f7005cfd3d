//! Configuration management for uvspec.
//!
//! Settings are read from INI-format files with the following precedence:
//!
//! 1. Local configuration (`./uvspec_config.cfg`)
//! 2. User configuration (`~/.config/uvspec/uvspec_config.cfg`)
//! 3. System configuration (`/etc/uvspec/uvspec_config.cfg`)
//! 4. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```ini
//! [logging]
//! level = info
//!
//! [parser]
//! log_level = error
//!
//! [output]
//! format = table
//! precision = 4
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use uvspec::settings::SettingsManager;
//!
//! let settings = SettingsManager::load()?;
//! println!("Output format: {}", settings.output().format);
//! # Ok::<(), uvspec::settings::ConfigError>(())
//! ```

use configparser::ini::Ini;
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the configuration file looked up in every location.
pub const CONFIG_FILE_NAME: &str = "uvspec_config.cfg";

/// Errors that can occur during configuration loading and processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error when reading configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// INI parsing error
    #[error("INI parsing error: {0}")]
    IniParse(String),
    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    /// The binary was built without any program parser
    #[error("No output parser is compiled in; rebuild with at least one of the features adf, gamess, gaussian, jaguar, orca")]
    NoBackends,
}

/// Rendering used when printing excited-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::InvalidValue(format!(
                "Unknown output format: {} (expected table, csv or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Parses a log level name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub fn parse_level(value: &str) -> Result<LevelFilter, ConfigError> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| ConfigError::InvalidValue(format!("Invalid log level: {}", value)))
}

/// Main configuration structure containing all program settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Logging configuration
    pub logging: LoggingSettings,
    /// Output parser configuration
    pub parser: ParserSettings,
    /// Output rendering configuration
    pub output: OutputSettings,
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level for the program (default: "info")
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Output parser configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Threshold for the parsers' own diagnostics (default: "error")
    pub log_level: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            log_level: "error".to_string(),
        }
    }
}

/// Output rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Rendering format (default: table)
    pub format: OutputFormat,
    /// Decimal places for oscillator strengths (default: 4)
    pub precision: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            precision: 4,
        }
    }
}

/// Configuration manager that handles loading and accessing program settings.
pub struct SettingsManager {
    settings: Settings,
    config_source: String,
    skipped: Vec<String>,
}

impl SettingsManager {
    /// Loads configuration from available configuration files.
    ///
    /// Searches, lowest priority first, the system, user and local
    /// configuration files; a key set in a later file overrides the same key
    /// from an earlier one, and keys a file does not set are inherited. Files
    /// that fail to load are skipped and listed in [`skipped`](Self::skipped).
    pub fn load() -> Result<Self, ConfigError> {
        let candidates = [
            ("system", Self::get_system_config_path()),
            ("user", Self::get_user_config_path()),
            ("local", Some(PathBuf::from(CONFIG_FILE_NAME))),
        ];
        let layers = candidates
            .into_iter()
            .filter_map(|(kind, path)| path.map(|path| (kind, path)));
        Ok(Self::load_layers(layers))
    }

    /// Loads configuration from a single file, on top of the built-in defaults.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::load_config(path)?;
        Ok(Self {
            settings,
            config_source: format!("file ({})", path.display()),
            skipped: Vec::new(),
        })
    }

    /// Returns the source of the loaded configuration.
    pub fn config_source(&self) -> &str {
        &self.config_source
    }

    /// Configuration files that exist but could not be loaded, one message each.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Gets a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the logging settings.
    pub fn logging(&self) -> &LoggingSettings {
        &self.settings.logging
    }

    /// Gets the parser settings.
    pub fn parser(&self) -> &ParserSettings {
        &self.settings.parser
    }

    /// Gets the output settings.
    pub fn output(&self) -> &OutputSettings {
        &self.settings.output
    }

    /// Program log level, falling back to `Info` for unknown names.
    pub fn log_level(&self) -> LevelFilter {
        parse_level(&self.settings.logging.level).unwrap_or(LevelFilter::Info)
    }

    /// Parser diagnostic threshold, falling back to `Error` for unknown names.
    pub fn parser_log_level(&self) -> LevelFilter {
        parse_level(&self.settings.parser.log_level).unwrap_or(LevelFilter::Error)
    }

    /// Applies each existing file in order, lowest priority first.
    ///
    /// A file that fails to read or parse leaves the settings as they were.
    fn load_layers<'a>(layers: impl IntoIterator<Item = (&'a str, PathBuf)>) -> Self {
        let mut settings = Settings::default();
        let mut config_source = "built-in defaults".to_string();
        let mut skipped = Vec::new();

        for (kind, path) in layers {
            if !path.exists() {
                continue;
            }
            let layered = fs::read_to_string(&path)
                .map_err(ConfigError::from)
                .and_then(|content| Self::apply_config(&settings, content));
            match layered {
                Ok(next) => {
                    settings = next;
                    config_source = format!("{} config ({})", kind, path.display());
                    debug!("Loaded {} configuration from: {}", kind, path.display());
                }
                Err(e) => skipped.push(format!(
                    "Failed to load {} config from {}: {}",
                    kind,
                    path.display(),
                    e
                )),
            }
        }

        Self {
            settings,
            config_source,
            skipped,
        }
    }

    /// Loads configuration from a single INI file.
    fn load_config(path: &Path) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_config(content)
    }

    /// Parses INI text into settings; absent keys keep their defaults.
    fn parse_config(content: String) -> Result<Settings, ConfigError> {
        Self::apply_config(&Settings::default(), content)
    }

    /// Returns `base` with every key present in the INI text replaced.
    fn apply_config(base: &Settings, content: String) -> Result<Settings, ConfigError> {
        let mut ini = Ini::new();
        ini.read(content)
            .map_err(|e| ConfigError::IniParse(format!("Failed to parse INI: {}", e)))?;

        let mut settings = base.clone();

        if let Some(logging_map) = ini.get_map_ref().get("logging") {
            Self::parse_logging(logging_map, &mut settings.logging)?;
        }
        if let Some(parser_map) = ini.get_map_ref().get("parser") {
            Self::parse_parser(parser_map, &mut settings.parser)?;
        }
        if let Some(output_map) = ini.get_map_ref().get("output") {
            Self::parse_output(output_map, &mut settings.output)?;
        }

        Ok(settings)
    }

    /// Parses the logging section from INI configuration.
    fn parse_logging(
        section: &HashMap<String, Option<String>>,
        logging: &mut LoggingSettings,
    ) -> Result<(), ConfigError> {
        if let Some(Some(level)) = section.get("level") {
            parse_level(level)?;
            logging.level = level.trim().to_lowercase();
        }
        Ok(())
    }

    /// Parses the parser section from INI configuration.
    fn parse_parser(
        section: &HashMap<String, Option<String>>,
        parser: &mut ParserSettings,
    ) -> Result<(), ConfigError> {
        if let Some(Some(level)) = section.get("log_level") {
            parse_level(level)?;
            parser.log_level = level.trim().to_lowercase();
        }
        Ok(())
    }

    /// Parses the output section from INI configuration.
    fn parse_output(
        section: &HashMap<String, Option<String>>,
        output: &mut OutputSettings,
    ) -> Result<(), ConfigError> {
        if let Some(Some(format)) = section.get("format") {
            output.format = format.parse()?;
        }
        if let Some(Some(precision)) = section.get("precision") {
            output.precision = precision.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("Invalid precision: {}", precision))
            })?;
        }
        Ok(())
    }

    /// Gets the system configuration file path.
    fn get_system_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            Some(PathBuf::from("/etc/uvspec").join(CONFIG_FILE_NAME))
        }
        #[cfg(windows)]
        {
            std::env::var("PROGRAMDATA")
                .ok()
                .map(|pd| PathBuf::from(pd).join("uvspec").join(CONFIG_FILE_NAME))
        }
    }

    /// Gets the user configuration file path.
    fn get_user_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("uvspec")
                    .join(CONFIG_FILE_NAME)
            })
        }
        #[cfg(windows)]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|appdata| PathBuf::from(appdata).join("uvspec").join(CONFIG_FILE_NAME))
        }
    }
}

impl SettingsManager {
    /// Writes a commented configuration template to `path`.
    pub fn create_template(path: &Path) -> Result<(), ConfigError> {
        fs::write(path, Self::generate_template_content())?;
        info!("Created settings template at: {}", path.display());
        Ok(())
    }

    /// Generates the content for a uvspec_config.cfg template file.
    fn generate_template_content() -> String {
        format!(
            r#"# uvspec Configuration File
#
# Configuration files are loaded in hierarchical order with local settings taking precedence:
#
# 1. Current working directory (./{name}) - highest priority
# 2. User config directory (~/.config/uvspec/{name} on Unix, %APPDATA%/uvspec/{name} on Windows)
# 3. System config directory (/etc/uvspec/{name} on Unix, %PROGRAMDATA%/uvspec/{name} on Windows)
# 4. Built-in defaults (fallback)
#
# Any missing sections or values will use the built-in defaults shown below.
# The RUST_LOG environment variable overrides [logging] level.

[logging]
# Log level: off, error, warn, info, debug, trace (default: {level})
level = {level}

[parser]
# Threshold for diagnostics emitted while reading output files (default: {parser_level})
# Raise to warn or debug to see skipped rows and renumbered states
log_level = {parser_level}

[output]
# Output format: table, csv, json (default: {format})
format = {format}

# Decimal places for oscillator strengths (default: {precision})
precision = {precision}
"#,
            name = CONFIG_FILE_NAME,
            level = LoggingSettings::default().level,
            parser_level = ParserSettings::default().log_level,
            format = OutputSettings::default().format,
            precision = OutputSettings::default().precision,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_sections() {
        let content = "[logging]\nlevel = DEBUG\n\n[parser]\nlog_level = warn\n\n[output]\nformat = json\nprecision = 6\n";
        let settings = SettingsManager::parse_config(content.to_string()).unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.parser.log_level, "warn");
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.output.precision, 6);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings = SettingsManager::parse_config("[output]\nformat = csv\n".to_string()).unwrap();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.parser.log_level, "error");
        assert_eq!(settings.output.format, OutputFormat::Csv);
        assert_eq!(settings.output.precision, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_format = SettingsManager::parse_config("[output]\nformat = xml\n".to_string());
        assert!(matches!(bad_format, Err(ConfigError::InvalidValue(_))));

        let bad_level = SettingsManager::parse_config("[parser]\nlog_level = loud\n".to_string());
        assert!(matches!(bad_level, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_template_round_trips_to_defaults() {
        let settings =
            SettingsManager::parse_config(SettingsManager::generate_template_content()).unwrap();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.parser.log_level, "error");
        assert_eq!(settings.output.format, OutputFormat::Table);
        assert_eq!(settings.output.precision, 4);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[logging]\nlevel = warn\n").unwrap();

        let manager = SettingsManager::load_file(&path).unwrap();
        assert_eq!(manager.log_level(), LevelFilter::Warn);
        assert_eq!(manager.parser_log_level(), LevelFilter::Error);
        assert!(manager.config_source().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_local_layer_keeps_user_keys() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.cfg");
        let local = dir.path().join("local.cfg");
        fs::write(
            &user,
            "[logging]\nlevel = debug\n\n[output]\nformat = json\nprecision = 8\n",
        )
        .unwrap();
        fs::write(&local, "[parser]\nlog_level = warn\n[output]\nprecision = 2\n").unwrap();

        let manager = SettingsManager::load_layers([("user", user), ("local", local.clone())]);
        assert_eq!(manager.logging().level, "debug");
        assert_eq!(manager.parser().log_level, "warn");
        assert_eq!(manager.output().format, OutputFormat::Json);
        assert_eq!(manager.output().precision, 2);
        assert!(manager.config_source().contains(&local.display().to_string()));
        assert!(manager.skipped().is_empty());
    }

    #[test]
    fn test_broken_layer_is_skipped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.cfg");
        let local = dir.path().join("local.cfg");
        fs::write(&user, "[output]\nformat = csv\n").unwrap();
        fs::write(&local, "[output]\nformat = csv\nprecision = many\n").unwrap();

        let manager = SettingsManager::load_layers([
            ("system", dir.path().join("missing.cfg")),
            ("user", user.clone()),
            ("local", local),
        ]);
        assert_eq!(manager.output().format, OutputFormat::Csv);
        assert_eq!(manager.output().precision, 4);
        assert!(manager.config_source().contains(&user.display().to_string()));
        assert_eq!(manager.skipped().len(), 1);
        assert!(manager.skipped()[0].contains("local config"));
        assert!(manager.skipped()[0].contains("Invalid precision"));
    }
}
