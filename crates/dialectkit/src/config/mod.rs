//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use tracing::info;

use crate::core::keywords::KeywordRegistry;
use crate::dialect::DatabaseType;
use crate::error::Result;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Install the configured keywords into the process-wide registry.
    /// Returns how many took effect.
    pub fn install_keywords(&self) -> Result<usize> {
        self.install_keywords_into(KeywordRegistry::global())
    }

    /// Install the configured keywords into `registry`.
    pub fn install_keywords_into(&self, registry: &KeywordRegistry) -> Result<usize> {
        let mut installed = 0;
        for k in &self.keywords {
            let db = DatabaseType::from_db_type(&k.dialect)?;
            if registry.add(db, &k.keyword, &k.value, k.priority) {
                installed += 1;
            }
        }
        if installed > 0 {
            info!("Installed {} connection keywords from configuration", installed);
        }
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keywords::KeywordPriority;
    use crate::guess::Culture;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.create_table.batch_separator, "GO");
        assert_eq!(config.create_table.timeout_secs, 30);
        assert_eq!(config.create_table.sample_rows, None);
        assert_eq!(config.bulk_load.date_sample_size, 500);
        assert_eq!(config.bulk_load.culture, Culture::EnUs);
        assert!(!config.bulk_load.allow_unmatched_input_columns);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
create_table:
  batch_separator: ";;"
  sample_rows: 1000
bulk_load:
  timeout_secs: 120
  allow_unmatched_input_columns: true
  culture: en-GB
keywords:
  - dialect: mssql
    keyword: Pooling
    value: "false"
    priority: system_default_high
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.create_table.batch_separator, ";;");
        assert_eq!(config.create_table.sample_rows, Some(1000));
        assert_eq!(config.bulk_load.timeout_secs, 120);
        assert_eq!(config.bulk_load.culture, Culture::EnGb);
        assert_eq!(config.keywords[0].priority, KeywordPriority::SystemDefaultHigh);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(Config::from_yaml("create_table: [").is_err());
        assert!(Config::from_yaml("bulk_load:\n  culture: fr-FR\n").is_err());
        assert!(Config::from_yaml("create_table:\n  batch_separator: ''\n").is_err());
    }

    #[test]
    fn test_install_keywords_respects_priority() {
        let yaml = r#"
keywords:
  - dialect: postgres
    keyword: Timeout
    value: "15"
  - dialect: pg
    keyword: timeout
    value: "5"
    priority: system_default_low
"#;
        let registry = KeywordRegistry::new();
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.install_keywords_into(&registry).unwrap(), 1);

        let keywords = registry.keywords(DatabaseType::Postgres);
        assert_eq!(keywords.get("TIMEOUT").unwrap().value, "15");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialectkit.yaml");
        std::fs::write(&path, "bulk_load:\n  date_sample_size: 50\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.bulk_load.date_sample_size, 50);
    }
}
