use crate::enrichment::ClassifierSettings;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML file configuration. All fields are optional; values present in the
/// file override CLI arguments during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub require_date_joined: Option<bool>,
    pub classifier: Option<ClassifierFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierFileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path.as_ref()))
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub require_date_joined: bool,
    pub classifier_base_url: Option<String>,
    pub classifier_model: Option<String>,
    pub classifier_api_key: Option<String>,
    pub classifier_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub require_date_joined: bool,
    pub classifier: ClassifierSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let require_date_joined = file.require_date_joined.unwrap_or(cli.require_date_joined);

        let classifier_file = file.classifier.unwrap_or_default();
        let classifier_defaults = ClassifierSettings::default();
        let classifier = ClassifierSettings {
            base_url: classifier_file
                .base_url
                .or_else(|| cli.classifier_base_url.clone())
                .unwrap_or(classifier_defaults.base_url),
            model: classifier_file
                .model
                .or_else(|| cli.classifier_model.clone())
                .unwrap_or(classifier_defaults.model),
            api_key: classifier_file
                .api_key
                .or_else(|| cli.classifier_api_key.clone()),
            timeout_secs: classifier_file
                .timeout_secs
                .or(cli.classifier_timeout_secs)
                .unwrap_or(classifier_defaults.timeout_secs),
        };

        Ok(Self {
            db_dir,
            require_date_joined,
            classifier,
        })
    }

    pub fn roster_db_path(&self) -> PathBuf {
        self.db_dir.join("roster.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            require_date_joined: true,
            classifier_base_url: Some("http://llm:8080".to_string()),
            classifier_model: Some("custom-model".to_string()),
            classifier_api_key: Some("secret".to_string()),
            classifier_timeout_secs: Some(30),
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert!(config.require_date_joined);
        assert_eq!(config.classifier.base_url, "http://llm:8080");
        assert_eq!(config.classifier.model, "custom-model");
        assert_eq!(config.classifier.api_key.as_deref(), Some("secret"));
        assert_eq!(config.classifier.timeout_secs, 30);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            require_date_joined: false,
            classifier_model: Some("cli-model".to_string()),
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            require_date_joined: Some(true),
            classifier: Some(ClassifierFileConfig {
                model: Some("toml-model".to_string()),
                ..Default::default()
            }),
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir, temp_dir.path());
        assert!(config.require_date_joined);
        assert_eq!(config.classifier.model, "toml-model");
        // Defaults used when neither specifies
        assert_eq!(config.classifier.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_resolve_missing_db_dir_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_roster_db_path() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.roster_db_path(), temp_dir.path().join("roster.db"));
    }

    #[test]
    fn test_file_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "db_dir = \"/data\"\nrequire_date_joined = true\n\n[classifier]\nmodel = \"llama3.1:70b\"\napi_key = \"abc\""
        )
        .unwrap();

        let loaded = FileConfig::load(file.path()).unwrap();
        assert_eq!(loaded.db_dir.as_deref(), Some("/data"));
        assert_eq!(loaded.require_date_joined, Some(true));
        let classifier = loaded.classifier.unwrap();
        assert_eq!(classifier.model.as_deref(), Some("llama3.1:70b"));
        assert_eq!(classifier.api_key.as_deref(), Some("abc"));
        assert!(classifier.base_url.is_none());
    }

    #[test]
    fn test_file_config_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "db_dir = [not valid").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
    }
}
