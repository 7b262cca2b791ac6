use std::{sync::Arc, time::Duration};

use options_sync_host::{BucketEncoding, StorageAreaName};

use crate::{
    bag::SettingsBag,
    gate::DEFAULT_INSTALL_EVENT_TIMEOUT,
    migrations::{Migration, MigrationList},
};

/// The bucket name used when none is configured.
pub const DEFAULT_STORAGE_NAME: &str = "options";

/// Configuration for an [OptionsSync](crate::OptionsSync).
#[derive(Clone)]
pub struct OptionsSyncConfig {
    /// Name of the bucket holding all the settings. Defaults to `"options"`.
    pub storage_name: String,
    /// Values used for any option that is not stored.
    pub defaults: SettingsBag,
    /// Migrations, applied in this order.
    pub migrations: MigrationList,
    /// Emit informational logs about migrations and saves.
    pub logging: bool,
    /// Storage area holding the bucket.
    pub storage_area: StorageAreaName,
    /// How the bucket is written.
    pub encoding: BucketEncoding,
    /// How long to wait for the installed/updated event before skipping migrations.
    pub install_event_timeout: Duration,
}

impl Default for OptionsSyncConfig {
    fn default() -> Self {
        Self {
            storage_name: DEFAULT_STORAGE_NAME.to_string(),
            defaults: SettingsBag::new(),
            migrations: Vec::new(),
            logging: true,
            storage_area: StorageAreaName::default(),
            encoding: BucketEncoding::default(),
            install_event_timeout: DEFAULT_INSTALL_EVENT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for OptionsSyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let migrations: Vec<&str> = self.migrations.iter().map(|m| m.name()).collect();
        f.debug_struct("OptionsSyncConfig")
            .field("storage_name", &self.storage_name)
            .field("defaults", &self.defaults)
            .field("migrations", &migrations)
            .field("logging", &self.logging)
            .field("storage_area", &self.storage_area)
            .field("encoding", &self.encoding)
            .field("install_event_timeout", &self.install_event_timeout)
            .finish()
    }
}

impl OptionsSyncConfig {
    #[allow(missing_docs)]
    pub fn with_storage_name(mut self, storage_name: impl Into<String>) -> Self {
        self.storage_name = storage_name.into();
        self
    }

    #[allow(missing_docs)]
    pub fn with_defaults(mut self, defaults: SettingsBag) -> Self {
        self.defaults = defaults;
        self
    }

    /// Append a migration after the ones already configured.
    pub fn with_migration(mut self, migration: Arc<dyn Migration>) -> Self {
        self.migrations.push(migration);
        self
    }

    #[allow(missing_docs)]
    pub fn with_migrations(mut self, migrations: MigrationList) -> Self {
        self.migrations = migrations;
        self
    }

    #[allow(missing_docs)]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    #[allow(missing_docs)]
    pub fn with_storage_area(mut self, storage_area: StorageAreaName) -> Self {
        self.storage_area = storage_area;
        self
    }

    #[allow(missing_docs)]
    pub fn with_encoding(mut self, encoding: BucketEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[allow(missing_docs)]
    pub fn with_install_event_timeout(mut self, timeout: Duration) -> Self {
        self.install_event_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    #[test]
    fn defaults_match_documented_values() {
        let config = OptionsSyncConfig::default();

        assert_eq!(config.storage_name, "options");
        assert!(config.defaults.is_empty());
        assert!(config.migrations.is_empty());
        assert!(config.logging);
        assert_eq!(config.storage_area, StorageAreaName::Sync);
        assert_eq!(config.encoding, BucketEncoding::Compressed);
        assert_eq!(config.install_event_timeout, Duration::from_millis(500));
    }

    #[test]
    fn migrations_keep_declared_order() {
        let config = OptionsSyncConfig::default()
            .with_migration(migrations::migration("first", |_, _| Ok(())))
            .with_migration(migrations::remove_unused());

        let names: Vec<&str> = config.migrations.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["first", "remove_unused"]);
        assert!(format!("{config:?}").contains("remove_unused"));
    }
}
