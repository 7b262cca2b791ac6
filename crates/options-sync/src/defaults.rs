//! Merging settings against their declared defaults.

use crate::bag::SettingsBag;

/// Returns every key of `defaults`, overridden by `stored`.
///
/// Keys only present in `stored` are kept. Dropping them is opt-in, through the
/// [remove_unused](crate::migrations::remove_unused) migration.
pub fn merge_with_defaults(defaults: &SettingsBag, stored: &SettingsBag) -> SettingsBag {
    let mut effective = defaults.clone();
    effective.extend(
        stored
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    effective
}

/// Returns the keys of `effective` whose value differs from their default, so that default values
/// are never persisted. Keys without a default are always kept.
pub fn thin_against_defaults(defaults: &SettingsBag, effective: &SettingsBag) -> SettingsBag {
    effective
        .iter()
        .filter(|(key, value)| defaults.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Deletes every key of `options` that has no default.
pub fn remove_unused(options: &mut SettingsBag, defaults: &SettingsBag) {
    options.retain(|key, _| defaults.contains_key(key));
}
