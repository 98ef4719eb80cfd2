//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(MigrateError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MigrateError::Config("source.user is required".into()));
    }
    if config.source.schema.is_empty() {
        return Err(MigrateError::Config("source.schema is required".into()));
    }

    // Target validation
    if config.target.host.is_empty() {
        return Err(MigrateError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(MigrateError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(MigrateError::Config("target.user is required".into()));
    }
    if config.target.schema.is_empty() {
        return Err(MigrateError::Config("target.schema is required".into()));
    }

    // Same server and database is fine (schema-to-schema copy), but source
    // and target must not be the same schema of the same database.
    if config.source.host == config.target.host
        && config.source.port == config.target.port
        && config.source.database == config.target.database
        && config.source.schema == config.target.schema
        && config.migration.prefix.is_empty()
    {
        return Err(MigrateError::Config(
            "source and target cannot be the same schema unless a prefix is set".into(),
        ));
    }

    // Migration validation
    if config.migration.tables.is_empty() {
        return Err(MigrateError::Config(
            "migration.tables must list at least one table".into(),
        ));
    }
    for (i, table) in config.migration.tables.iter().enumerate() {
        if table.is_empty() {
            return Err(MigrateError::Config(format!(
                "migration.tables[{}] is empty",
                i
            )));
        }
        if config.migration.tables[..i].contains(table) {
            return Err(MigrateError::Config(format!(
                "migration.tables lists '{}' more than once",
                table
            )));
        }
    }

    if !config
        .migration
        .prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(MigrateError::Config(format!(
            "migration.prefix '{}' may only contain lowercase letters, digits, and underscores",
            config.migration.prefix
        )));
    }

    if let Some(0) = config.migration.max_connections {
        return Err(MigrateError::Config(
            "migration.max_connections must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MigrationConfig, SourceConfig, TargetConfig};

    fn valid_config() -> Config {
        Config {
            source: SourceConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "demo".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                schema: "bookings".to_string(),
            },
            target: TargetConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "demo".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                schema: "bookings_new".to_string(),
            },
            migration: MigrationConfig {
                tables: vec!["airports_data".to_string(), "flights".to_string()],
                prefix: String::new(),
                max_connections: None,
            },
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_source_host() {
        let mut config = valid_config();
        config.source.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_table_list() {
        let mut config = valid_config();
        config.migration.tables.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_table() {
        let mut config = valid_config();
        config.migration.tables.push("flights".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_same_schema_rejected_without_prefix() {
        let mut config = valid_config();
        config.target.schema = config.source.schema.clone();
        assert!(validate(&config).is_err());

        // A prefix disambiguates object names, so the same schema is allowed.
        config.migration.prefix = "new_".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_prefix() {
        let mut config = valid_config();
        config.migration.prefix = "New-".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_connections() {
        let mut config = valid_config();
        config.migration.max_connections = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_from_yaml_roundtrip() {
        let yaml = r#"
source:
  host: localhost
  database: demo
  user: postgres
  password: postgres
  schema: bookings
target:
  host: localhost
  database: demo
  user: postgres
  password: postgres
  schema: bookings_new
migration:
  tables:
    - airports_data
"#;
        let config = Config::from_yaml(yaml).expect("valid yaml");
        assert_eq!(config.source.port, 5432);
        assert_eq!(config.target.schema, "bookings_new");
        assert_eq!(config.migration.tables, vec!["airports_data"]);
        assert_eq!(config.migration.prefix, "");
    }
}
