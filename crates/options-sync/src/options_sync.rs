use std::sync::Arc;

use options_sync_host::{BucketStore, Lifecycle, StorageBackend, StorageChange};
use tokio::sync::broadcast;

use crate::{
    bag::SettingsBag,
    config::OptionsSyncConfig,
    defaults::{merge_with_defaults, thin_against_defaults},
    error::OptionsError,
    runner::{CompletionToken, MigrationOutcome, MigrationRunner},
};

/// Accessor for one settings bucket.
///
/// Construction starts the migration runner in the background. Every read and write waits for
/// it first, so ordinary traffic never races migrations. Several accessors with different bucket
/// names can coexist, each with its own migrations.
#[derive(Debug)]
pub struct OptionsSync {
    store: BucketStore,
    defaults: Arc<SettingsBag>,
    completion: CompletionToken,
    logging: bool,
}

impl OptionsSync {
    /// Create an accessor and start evaluating its migrations.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(
        config: OptionsSyncConfig,
        storage: Arc<dyn StorageBackend>,
        lifecycle: Arc<dyn Lifecycle>,
    ) -> Self {
        let store = BucketStore::new(
            storage,
            config.storage_area,
            config.storage_name,
            config.encoding,
        );
        let defaults = Arc::new(config.defaults);

        let completion = MigrationRunner {
            store: store.clone(),
            defaults: defaults.clone(),
            migrations: config.migrations,
            lifecycle,
            install_event_timeout: config.install_event_timeout,
            logging: config.logging,
        }
        .spawn();

        Self {
            store,
            defaults,
            completion,
            logging: config.logging,
        }
    }

    /// The bucket name.
    pub fn storage_name(&self) -> &str {
        self.store.key()
    }

    /// The declared defaults.
    pub fn defaults(&self) -> &SettingsBag {
        &self.defaults
    }

    /// Wait until migrations have been run or skipped.
    pub async fn wait_for_migrations(&self) -> Result<MigrationOutcome, OptionsError> {
        self.completion.wait().await
    }

    /// The effective settings: defaults overlaid with what is stored.
    pub async fn get_all(&self) -> Result<SettingsBag, OptionsError> {
        self.completion.wait().await?;

        let stored: SettingsBag = self.store.read().await?;
        Ok(merge_with_defaults(&self.defaults, &stored))
    }

    /// Replace the stored settings. Values equal to their default are not stored.
    pub async fn set_all(&self, options: &SettingsBag) -> Result<(), OptionsError> {
        self.completion.wait().await?;

        let thinned = thin_against_defaults(&self.defaults, options);
        if self.logging {
            log::info!("Saving '{}': {:?}", self.store.key(), thinned);
        }
        self.store.write(&thinned).await?;
        Ok(())
    }

    /// Overlay `partial` on the effective settings and store the result.
    pub async fn set(&self, partial: &SettingsBag) -> Result<(), OptionsError> {
        let mut options = self.get_all().await?;
        options.extend(
            partial
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        self.set_all(&options).await
    }

    /// The effective settings as pretty-printed JSON.
    pub async fn export_json(&self) -> Result<String, OptionsError> {
        let options = self.get_all().await?;
        Ok(serde_json::to_string_pretty(&options)?)
    }

    /// Parse a JSON object of option values and apply it with [OptionsSync::set].
    ///
    /// Nothing is written if `text` is not a flat object of strings, numbers and booleans.
    pub async fn import_json(&self, text: &str) -> Result<(), OptionsError> {
        let imported: SettingsBag =
            serde_json::from_str(text).map_err(OptionsError::InvalidImport)?;
        self.set(&imported).await
    }

    /// Subscribe to changes of this bucket, including writes made by other contexts.
    ///
    /// Only changes made after this call are observed.
    pub fn subscribe(&self) -> OptionsSubscription<'_> {
        OptionsSubscription {
            options: self,
            receiver: self.store.backend().subscribe(),
        }
    }
}

/// A subscription to changes of one bucket. Created with [OptionsSync::subscribe].
pub struct OptionsSubscription<'a> {
    options: &'a OptionsSync,
    receiver: broadcast::Receiver<StorageChange>,
}

impl OptionsSubscription<'_> {
    /// Wait for the next change to the bucket and return the new effective settings.
    ///
    /// Changes to other keys or other storage areas are ignored.
    pub async fn receive(&mut self) -> Result<SettingsBag, OptionsError> {
        loop {
            let change = self.receiver.recv().await?;
            if self.options.store.is_affected_by(&change) {
                return self.options.get_all().await;
            }
        }
    }
}
