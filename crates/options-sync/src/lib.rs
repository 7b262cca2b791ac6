#![doc = include_str!("../README.md")]

mod bag;
mod config;
pub mod defaults;
mod error;
pub mod gate;
pub mod migrations;
mod options_sync;
mod runner;

pub use bag::{OptionValue, SettingsBag};
pub use config::{OptionsSyncConfig, DEFAULT_STORAGE_NAME};
pub use defaults::{merge_with_defaults, thin_against_defaults};
pub use error::OptionsError;
pub use migrations::{Migration, MigrationError, MigrationList};
pub use options_sync::{OptionsSubscription, OptionsSync};
pub use options_sync_host as host;
pub use runner::MigrationOutcome;
