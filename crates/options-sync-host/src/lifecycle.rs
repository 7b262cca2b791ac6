use serde::{Deserialize, Serialize};

/// How the extension was installed, as reported by `management.getSelf()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    /// Installed by administrative policy.
    Admin,
    /// Loaded unpacked, in developer mode.
    Development,
    /// Installed normally from a store.
    Normal,
    /// Installed by other software on the machine.
    Sideload,
    /// Anything else, or unknown.
    Other,
}

/// The host environment's view of the running extension.
///
/// The implementation needs to guarantee that [Lifecycle::installed_or_updated] observes an
/// event that fired before the call, as long as it fired in this process lifetime.
#[async_trait::async_trait]
pub trait Lifecycle: Send + Sync {
    /// Returns true when running in the background page or service worker, as opposed to a
    /// content script or an extension page.
    fn is_background_context(&self) -> bool;

    /// Returns how the extension was installed.
    async fn install_type(&self) -> InstallType;

    /// Resolves when the host reports the extension was installed or updated. May never resolve.
    async fn installed_or_updated(&self);
}
