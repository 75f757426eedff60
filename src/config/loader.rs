//! Settings loading from layered sources.
//!
//! Sources, later ones overriding earlier ones:
//! 1. TOML file (optional on disk; required sections may come from elsewhere)
//! 2. Environment variables, `TOOLKEEPER__SECTION__KEY`; the CORS lists take
//!    comma-separated values

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TOOLKEEPER";

/// Separator for list-valued environment overrides.
pub const LIST_SEPARATOR: &str = ",";

/// Sections that must be present in at least one source.
pub const REQUIRED_SECTIONS: &[&str] = &["app_settings", "connection_strings"];

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("required configuration section '{0}' is missing")]
    MissingSection(&'static str),

    #[error("validation failed: {}", ValidationErrors(.0))]
    Validation(Vec<ValidationError>),
}

struct ValidationErrors<'a>(&'a [ValidationError]);

impl fmt::Display for ValidationErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Builder for loading [`Settings`] exactly once at startup.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    inline: Vec<String>,
    env: Option<config::Map<String, String>>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file. A missing file is skipped.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add an inline TOML document, layered after the file.
    pub fn toml_str(mut self, content: impl Into<String>) -> Self {
        self.inline.push(content.into());
        self
    }

    /// Use the given variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Build, check required sections, deserialize and validate.
    pub fn load(self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            tracing::debug!(path = %path.display(), "Reading settings file");
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
        }

        for content in &self.inline {
            builder = builder.add_source(File::from_str(content, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(LIST_SEPARATOR)
                .with_list_parse_key("cors.allowed_origins")
                .with_list_parse_key("cors.allowed_methods")
                .with_list_parse_key("cors.allowed_headers")
                .source(self.env),
        );

        let config = builder.build()?;

        for section in REQUIRED_SECTIONS {
            if config.get_table(section).is_err() {
                return Err(ConfigError::MissingSection(section));
            }
        }

        let settings: Settings = config.try_deserialize()?;
        validate_settings(&settings).map_err(ConfigError::Validation)?;

        Ok(settings)
    }
}

/// Load settings from a TOML file plus the process environment.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    SettingsLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COMPLETE: &str = r#"
        [app_settings.model_api]
        host = "http://model"
        port = 8000

        [connection_strings]
        default_connection = "postgres://app:secret@db/toolkeeper"
    "#;

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_loads_complete_settings_with_defaults() {
        let settings = SettingsLoader::new().toml_str(COMPLETE).env_vars(no_env()).load().unwrap();

        assert_eq!(settings.app_settings.model_api.host, "http://model");
        assert_eq!(settings.app_settings.model_api.port, 8000);
        assert_eq!(settings.app_settings.model_api.health_path, "health");
        assert_eq!(settings.server.bind_address, "0.0.0.0:8080");
        assert_eq!(settings.cors.allowed_origins, vec!["*"]);
        assert_eq!(settings.logging.file_level, "warn");
        assert_eq!(settings.database.migrations_dir, "migrations");
    }

    #[test]
    fn test_missing_connection_strings_is_fatal() {
        let toml = r#"
            [app_settings.model_api]
            host = "http://model"
            port = 8000
        "#;

        let err = SettingsLoader::new().toml_str(toml).env_vars(no_env()).load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("connection_strings")));
    }

    #[test]
    fn test_missing_app_settings_is_fatal() {
        let toml = r#"
            [connection_strings]
            default_connection = "postgres://db/toolkeeper"
        "#;

        let err = SettingsLoader::new().toml_str(toml).env_vars(no_env()).load().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("app_settings")));
    }

    #[test]
    fn test_missing_required_field_is_fatal() {
        let toml = r#"
            [app_settings.model_api]
            host = "http://model"

            [connection_strings]
            default_connection = "postgres://db/toolkeeper"
        "#;

        let err = SettingsLoader::new().toml_str(toml).env_vars(no_env()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)), "got {err}");
    }

    #[test]
    fn test_environment_overrides_file() {
        let settings = SettingsLoader::new()
            .toml_str(COMPLETE)
            .env_vars([
                ("TOOLKEEPER__APP_SETTINGS__MODEL_API__PORT", "9100"),
                ("TOOLKEEPER__SERVER__BIND_ADDRESS", "127.0.0.1:9000"),
            ])
            .load()
            .unwrap();

        assert_eq!(settings.app_settings.model_api.port, 9100);
        assert_eq!(settings.server.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_environment_overrides_cors_lists() {
        let settings = SettingsLoader::new()
            .toml_str(COMPLETE)
            .env_vars([
                ("TOOLKEEPER__CORS__ALLOWED_ORIGINS", "https://a.example,https://b.example"),
                ("TOOLKEEPER__CORS__ALLOWED_METHODS", "GET,POST"),
            ])
            .load()
            .unwrap();

        assert_eq!(
            settings.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(settings.cors.allowed_methods, vec!["GET".to_string(), "POST".to_string()]);
        assert_eq!(settings.cors.allowed_headers, vec!["*".to_string()]);
    }

    #[test]
    fn test_environment_alone_can_supply_required_sections() {
        let settings = SettingsLoader::new()
            .env_vars([
                ("TOOLKEEPER__APP_SETTINGS__MODEL_API__HOST", "model"),
                ("TOOLKEEPER__APP_SETTINGS__MODEL_API__PORT", "8000"),
                ("TOOLKEEPER__CONNECTION_STRINGS__DEFAULT_CONNECTION", "postgres://db/toolkeeper"),
            ])
            .load()
            .unwrap();

        assert_eq!(settings.app_settings.model_api.host, "model");
        assert_eq!(settings.connection_strings.default_connection, "postgres://db/toolkeeper");
    }

    #[test]
    fn test_semantic_errors_surface_as_validation() {
        let toml = r#"
            [app_settings.model_api]
            host = ""
            port = 8000

            [connection_strings]
            default_connection = "postgres://db/toolkeeper"
        "#;

        let err = SettingsLoader::new().toml_str(toml).env_vars(no_env()).load().unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors[0].field, "app_settings.model_api.host");
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_reads_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(COMPLETE.as_bytes()).unwrap();

        let settings = SettingsLoader::new().file(file.path()).env_vars(no_env()).load().unwrap();
        assert_eq!(settings.app_settings.model_api.port, 8000);
    }

    #[test]
    fn test_missing_file_falls_through_to_required_check() {
        let err = SettingsLoader::new()
            .file("does/not/exist.toml")
            .env_vars(no_env())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(_)));
    }
}
