//! Base plugin trait definition.
//!
//! Every processing strategy implements [`Plugin`], which carries its
//! identity and lifecycle hooks.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// All plugins must be `Send + Sync`: a registry is built once and then
/// shared read-only across concurrent requests.
///
/// # Example
///
/// ```rust
/// use docproc::plugins::Plugin;
/// use docproc::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct AuditPlugin {
///     initialized: AtomicBool,
/// }
///
/// impl Plugin for AuditPlugin {
///     fn name(&self) -> &str {
///         "AUDIT_STRATEGY"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.initialized.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.initialized.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique name. Must be non-empty and contain no whitespace.
    fn name(&self) -> &str;

    /// Semantic version of this plugin.
    fn version(&self) -> String;

    /// Called once when the plugin is registered.
    ///
    /// Takes `&self` so it works through `Arc<dyn Plugin>`; use interior
    /// mutability for any state.
    ///
    /// # Errors
    ///
    /// The plugin is not registered if this returns an error.
    fn initialize(&self) -> Result<()>;

    /// Called once when the owning registry shuts down.
    fn shutdown(&self) -> Result<()>;

    /// Optional plugin description for debugging and logging.
    fn description(&self) -> &str {
        ""
    }
}
