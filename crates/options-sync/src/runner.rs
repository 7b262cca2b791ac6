//! Runs migrations once per accessor and gates all other storage traffic on their completion.

use std::{sync::Arc, time::Duration};

use options_sync_host::{BucketStore, Lifecycle};
use tokio::sync::watch;

use crate::{bag::SettingsBag, error::OptionsError, gate, migrations::MigrationList};

/// What the migration runner did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Migrations were not eligible to run: no migrations, not the background context, or not an
    /// install or update.
    Skipped,
    /// Migrations ran and left the stored settings as they were. Nothing was written.
    Unchanged,
    /// Migrations ran and their result was written back.
    Persisted,
}

type Completion = Option<Result<MigrationOutcome, Arc<OptionsError>>>;

/// Resolves once, when migrations have been run or skipped. Clones observe the same result.
#[derive(Debug, Clone)]
pub(crate) struct CompletionToken {
    receiver: watch::Receiver<Completion>,
}

impl CompletionToken {
    pub(crate) async fn wait(&self) -> Result<MigrationOutcome, OptionsError> {
        let mut receiver = self.receiver.clone();
        let completion = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| OptionsError::RunnerStopped)?;

        match completion.as_ref() {
            Some(Ok(outcome)) => Ok(*outcome),
            Some(Err(error)) => Err(OptionsError::MigrationsFailed(error.clone())),
            None => Err(OptionsError::RunnerStopped),
        }
    }
}

pub(crate) struct MigrationRunner {
    pub(crate) store: BucketStore,
    pub(crate) defaults: Arc<SettingsBag>,
    pub(crate) migrations: MigrationList,
    pub(crate) lifecycle: Arc<dyn Lifecycle>,
    pub(crate) install_event_timeout: Duration,
    pub(crate) logging: bool,
}

impl MigrationRunner {
    /// Start the runner on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub(crate) fn spawn(self) -> CompletionToken {
        let (sender, receiver) = watch::channel(None);

        tokio::spawn(async move {
            let result = self.run().await;
            if let Err(error) = &result {
                log::error!("Migrations for '{}' failed: {}", self.store.key(), error);
            }
            // Kept even if every token is gone, so late waiters still see it.
            sender.send_replace(Some(result.map_err(Arc::new)));
        });

        CompletionToken { receiver }
    }

    async fn run(&self) -> Result<MigrationOutcome, OptionsError> {
        let eligible = gate::should_run_migrations(
            self.lifecycle.as_ref(),
            !self.migrations.is_empty(),
            self.install_event_timeout,
        )
        .await;
        if !eligible {
            return Ok(MigrationOutcome::Skipped);
        }

        // Raw stored data: an absent key must stay absent so migrations can tell it was never set.
        let mut options: SettingsBag = self.store.read().await?;
        let snapshot = serde_json::to_string(&options)?;

        if self.logging {
            log::info!(
                "Running {} migrations on '{}'",
                self.migrations.len(),
                self.store.key()
            );
        }

        for migration in &self.migrations {
            migration
                .apply(&mut options, &self.defaults)
                .await
                .map_err(|source| OptionsError::Migration {
                    name: migration.name().to_string(),
                    source,
                })?;
        }

        if serde_json::to_string(&options)? == snapshot {
            if self.logging {
                log::info!("Migrations left '{}' unchanged", self.store.key());
            }
            return Ok(MigrationOutcome::Unchanged);
        }

        self.store.write(&options).await?;
        if self.logging {
            log::info!("Migrated '{}' saved", self.store.key());
        }
        Ok(MigrationOutcome::Persisted)
    }
}
