//! Configuration validation.

use super::Config;
use crate::dialect::DatabaseType;
use crate::error::{DialectError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Table creation
    let separator = &config.create_table.batch_separator;
    if separator.is_empty() {
        return Err(DialectError::Config(
            "create_table.batch_separator is required".into(),
        ));
    }
    if separator.chars().any(char::is_whitespace) {
        return Err(DialectError::Config(format!(
            "create_table.batch_separator must not contain whitespace, got {:?}",
            separator
        )));
    }
    if config.create_table.timeout_secs == 0 {
        return Err(DialectError::Config(
            "create_table.timeout_secs must be at least 1".into(),
        ));
    }
    if let Some(0) = config.create_table.sample_rows {
        return Err(DialectError::Config(
            "create_table.sample_rows must be at least 1".into(),
        ));
    }

    // Bulk load
    if config.bulk_load.timeout_secs == 0 {
        return Err(DialectError::Config(
            "bulk_load.timeout_secs must be at least 1".into(),
        ));
    }
    if config.bulk_load.date_sample_size == 0 {
        return Err(DialectError::Config(
            "bulk_load.date_sample_size must be at least 1".into(),
        ));
    }

    // Keywords
    for (i, keyword) in config.keywords.iter().enumerate() {
        DatabaseType::from_db_type(&keyword.dialect).map_err(|_| {
            DialectError::Config(format!(
                "keywords[{}].dialect '{}' is not a known dialect",
                i, keyword.dialect
            ))
        })?;
        if keyword.keyword.trim().is_empty() {
            return Err(DialectError::Config(format!(
                "keywords[{}].keyword is required",
                i
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordConfig;
    use crate::core::keywords::KeywordPriority;

    fn keyword(dialect: &str) -> KeywordConfig {
        KeywordConfig {
            dialect: dialect.to_string(),
            keyword: "Pooling".to_string(),
            value: "false".to_string(),
            priority: KeywordPriority::ApiRule,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_separator() {
        let mut config = Config::default();
        config.create_table.batch_separator = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_separator_with_whitespace() {
        let mut config = Config::default();
        config.create_table.batch_separator = "GO GO".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = Config::default();
        config.create_table.timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.bulk_load.timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_sample_sizes() {
        let mut config = Config::default();
        config.create_table.sample_rows = Some(0);
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.bulk_load.date_sample_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_keyword_dialect_aliases() {
        let mut config = Config::default();
        config.keywords = vec![keyword("sqlserver"), keyword("pg")];
        assert!(validate(&config).is_ok());

        config.keywords.push(keyword("db2"));
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, DialectError::Config(ref m) if m.contains("keywords[2]")));
    }
}
