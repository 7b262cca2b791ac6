//! One-time transformations of stored settings.
//!
//! A migration receives the raw stored bag, exactly as persisted and not merged with defaults, so
//! an absent key means "never set". Migrations run in declared order and each one sees the
//! mutations of the previous ones. They may run again on a later install or update, so each step
//! should be safe to re-apply.

use std::sync::Arc;

use thiserror::Error;

use crate::{bag::SettingsBag, defaults};

/// An error raised by a migration. Aborts the remaining migrations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct MigrationError {
    message: String,
}

impl MigrationError {
    /// Create an error with a human readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single migration step.
#[async_trait::async_trait]
pub trait Migration: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Mutate `options` in place. `defaults` is read-only.
    async fn apply(
        &self,
        options: &mut SettingsBag,
        defaults: &SettingsBag,
    ) -> Result<(), MigrationError>;
}

/// The ordered list of migrations given to an accessor.
pub type MigrationList = Vec<Arc<dyn Migration>>;

/// A migration backed by a synchronous closure. Created with [migration].
pub struct FnMigration<F> {
    name: String,
    migrate: F,
}

#[async_trait::async_trait]
impl<F> Migration for FnMigration<F>
where
    F: Fn(&mut SettingsBag, &SettingsBag) -> Result<(), MigrationError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(
        &self,
        options: &mut SettingsBag,
        defaults: &SettingsBag,
    ) -> Result<(), MigrationError> {
        (self.migrate)(options, defaults)
    }
}

/// Wrap a closure as a named migration.
///
/// ```rust
/// use options_sync::migrations::{self, Migration};
///
/// let rename = migrations::migration("rename-size", |options, _defaults| {
///     if let Some(size) = options.remove("size") {
///         options.insert("minSize".to_string(), size);
///     }
///     Ok(())
/// });
/// assert_eq!(rename.name(), "rename-size");
/// ```
pub fn migration<F>(name: impl Into<String>, migrate: F) -> Arc<dyn Migration>
where
    F: Fn(&mut SettingsBag, &SettingsBag) -> Result<(), MigrationError> + Send + Sync + 'static,
{
    Arc::new(FnMigration {
        name: name.into(),
        migrate,
    })
}

/// Deletes every stored option that no longer has a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnused;

#[async_trait::async_trait]
impl Migration for RemoveUnused {
    fn name(&self) -> &str {
        "remove_unused"
    }

    async fn apply(
        &self,
        options: &mut SettingsBag,
        defaults: &SettingsBag,
    ) -> Result<(), MigrationError> {
        defaults::remove_unused(options, defaults);
        Ok(())
    }
}

/// The built-in [RemoveUnused] migration.
pub fn remove_unused() -> Arc<dyn Migration> {
    Arc::new(RemoveUnused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings;

    #[tokio::test]
    async fn closure_migration_mutates_in_place() {
        let rename = migration("rename", |options, _| {
            if let Some(size) = options.remove("size") {
                options.insert("minSize".to_string(), size);
            }
            Ok(())
        });
        let mut options = settings! { "size" => 30 };

        rename.apply(&mut options, &settings! {}).await.unwrap();

        assert_eq!(options, settings! { "minSize" => 30 });
    }

    #[tokio::test]
    async fn closure_migration_reports_errors() {
        let failing = migration("failing", |_, _| Err(MigrationError::new("bad data")));

        let result = failing.apply(&mut settings! {}, &settings! {}).await;

        assert_eq!(result, Err(MigrationError::new("bad data")));
    }

    #[tokio::test]
    async fn remove_unused_uses_defaults() {
        let mut options = settings! { "size" => 30, "sound" => false };

        remove_unused()
            .apply(&mut options, &settings! { "sound" => true })
            .await
            .unwrap();

        assert_eq!(options, settings! { "sound" => false });
    }
}
