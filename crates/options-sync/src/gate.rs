//! Decides whether migrations should run in this process lifetime.

use std::time::Duration;

use options_sync_host::{InstallType, Lifecycle};

/// How long to wait for the installed/updated event before assuming a regular startup.
pub const DEFAULT_INSTALL_EVENT_TIMEOUT: Duration = Duration::from_millis(500);

/// Returns true if migrations should run now.
///
/// Only the background context migrates; other contexts rely on it having migrated the shared
/// storage. Unpacked extensions always migrate, since the host does not reliably fire the
/// installed/updated event for them. Otherwise the event is raced against `timeout`.
pub async fn should_run_migrations(
    lifecycle: &dyn Lifecycle,
    has_migrations: bool,
    timeout: Duration,
) -> bool {
    if !has_migrations {
        return false;
    }

    if !lifecycle.is_background_context() {
        log::debug!("Not in the background context, leaving migrations to it");
        return false;
    }

    if lifecycle.install_type().await == InstallType::Development {
        return true;
    }

    tokio::time::timeout(timeout, lifecycle.installed_or_updated())
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use options_sync_test::ScriptedLifecycle;
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn empty_list_answers_without_waiting() {
        let lifecycle = ScriptedLifecycle::background();
        let start = Instant::now();

        assert!(!should_run_migrations(&lifecycle, false, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_list_never_runs_even_in_development() {
        let lifecycle = ScriptedLifecycle::development();
        assert!(!should_run_migrations(&lifecycle, false, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn content_scripts_never_run() {
        let lifecycle = ScriptedLifecycle::content_script();
        lifecycle.fire_installed();

        assert!(!should_run_migrations(&lifecycle, true, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn development_runs_immediately() {
        let lifecycle = ScriptedLifecycle::development();
        let start = Instant::now();

        assert!(should_run_migrations(&lifecycle, true, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn installed_event_runs() {
        let lifecycle = ScriptedLifecycle::freshly_installed();
        assert!(should_run_migrations(&lifecycle, true, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn event_during_the_race_runs() {
        let lifecycle = Arc::new(ScriptedLifecycle::background());
        let firing = lifecycle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            firing.fire_installed();
        });

        assert!(should_run_migrations(lifecycle.as_ref(), true, DEFAULT_INSTALL_EVENT_TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn steady_state_times_out() {
        let lifecycle = ScriptedLifecycle::background();
        let start = Instant::now();

        assert!(!should_run_migrations(&lifecycle, true, Duration::from_millis(300)).await);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
