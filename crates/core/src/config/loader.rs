//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::Path;

/// Standard locations, checked in order, relative to the working directory.
const CANDIDATES: [&str; 3] = [".imagecraft.toml", "imagecraft.toml", ".config/imagecraft.toml"];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the first standard location
    /// that exists is used, and defaults apply when none does.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }
        Self::load_from(path.map(String::from).or_else(|| find_config_file(Path::new("."))))
    }

    /// Search `dir` instead of the working directory
    pub fn discover_in(dir: &Path) -> Result<Self> {
        Self::load_from(find_config_file(dir))
    }

    fn load_from(config_path: Option<String>) -> Result<Self> {
        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };
        schema
            .validate()
            .map_err(|e| e.with_context(format!("in {}", config_path.as_deref().unwrap_or("defaults"))))?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(dir: &Path) -> Option<String> {
    CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.exists())
        .map(|path| path.to_string_lossy().into_owned())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path, e)).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("Failed to parse config file {}", path))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.filters.sharpen_amount, 0.5);
    }

    #[test]
    fn test_discover_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::discover_in(dir.path()).unwrap();
        assert!(config.path.is_none());
    }

    #[test]
    fn test_discover_prefers_dotfile() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("imagecraft.toml"), "[output]\nformat = \"gif\"\n").unwrap();
        fs::write(dir.path().join(".imagecraft.toml"), "[output]\nformat = \"jpeg\"\n").unwrap();

        let config = Config::discover_in(dir.path()).unwrap();
        assert!(config.path.unwrap().ends_with(".imagecraft.toml"));
        assert_eq!(config.schema.output.format, "jpeg");
    }

    #[test]
    fn test_discover_nested_location() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".config")).unwrap();
        fs::write(dir.path().join(".config/imagecraft.toml"), "[batch]\nparallel = true\n").unwrap();

        let config = Config::discover_in(dir.path()).unwrap();
        assert!(config.schema.batch.parallel);
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = Config::load(Some("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[output\nformat = ").unwrap();

        let err = Config::load(Some(path.to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[output]\nquality = 4.0\n").unwrap();

        let err = Config::load(Some(path.to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.context.is_some());
    }
}
