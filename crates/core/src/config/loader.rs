use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from an optional file with environment overrides.
///
/// Environment variables use the `DIGGER_` prefix with `__` as the section
/// separator, e.g. `DIGGER_DISCOGS__TOKEN` or `DIGGER_OUTPUT__ROOT`.
/// A missing file is fine (everything can come from the environment);
/// an explicitly requested file that does not exist is an error.
pub fn load_config(path: &Path, path_required: bool) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else if path_required {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment
        .merge(Env::prefixed("DIGGER_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[discogs]
token = "tok"

[output]
root = "out"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.discogs.token, "tok");
        assert_eq!(config.output.root.to_str().unwrap(), "out");
    }

    #[test]
    fn test_load_config_missing_file_required() {
        let result = load_config(Path::new("/nonexistent/config.toml"), true);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_missing_file_optional() {
        let config = load_config(Path::new("/nonexistent/config.toml"), false).unwrap();
        assert_eq!(config.discogs.currency, "USD");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[publisher]
poll_interval_secs = 2
processing_timeout_secs = 60
"#
        )
        .unwrap();

        let config = load_config(temp_file.path(), true).unwrap();
        assert_eq!(config.publisher.poll_interval_secs, 2);
        assert_eq!(config.publisher.processing_timeout_secs, 60);
        // Untouched sections keep their defaults.
        assert_eq!(config.publisher.publish_attempts, 2);
    }
}
