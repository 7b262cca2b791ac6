use options_sync_host::{InstallType, Lifecycle};
use tokio::sync::watch;

/// A [Lifecycle] driven by the test.
#[derive(Debug)]
pub struct ScriptedLifecycle {
    background: bool,
    install_type: InstallType,
    installed: watch::Sender<bool>,
}

impl ScriptedLifecycle {
    fn new(background: bool, install_type: InstallType) -> Self {
        let (installed, _) = watch::channel(false);
        Self {
            background,
            install_type,
            installed,
        }
    }

    /// A background context of a normally installed extension. The installed/updated event only
    /// fires when [ScriptedLifecycle::fire_installed] is called.
    pub fn background() -> Self {
        Self::new(true, InstallType::Normal)
    }

    /// A background context of an unpacked extension.
    pub fn development() -> Self {
        Self::new(true, InstallType::Development)
    }

    /// A content script or extension page.
    pub fn content_script() -> Self {
        Self::new(false, InstallType::Normal)
    }

    /// A background context whose installed/updated event has already fired.
    pub fn freshly_installed() -> Self {
        let lifecycle = Self::background();
        lifecycle.fire_installed();
        lifecycle
    }

    /// Fire the installed/updated event.
    pub fn fire_installed(&self) {
        self.installed.send_replace(true);
    }
}

#[async_trait::async_trait]
impl Lifecycle for ScriptedLifecycle {
    fn is_background_context(&self) -> bool {
        self.background
    }

    async fn install_type(&self) -> InstallType {
        self.install_type
    }

    async fn installed_or_updated(&self) {
        let mut receiver = self.installed.subscribe();
        // The sender lives as long as `self`, so this only returns once the event fired.
        let _ = receiver.wait_for(|fired| *fired).await;
    }
}
