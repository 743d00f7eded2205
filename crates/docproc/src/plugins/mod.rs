//! Plugin system.
//!
//! - [`Plugin`] - identity and lifecycle shared by every plugin
//! - [`ProcessingStrategy`] - per-type document processing
//! - [`registry::StrategyRegistry`] - type and name dispatch
//!
//! Strategies are stored as `Arc<dyn ProcessingStrategy>` and the registry is
//! immutable once built, so a single instance can serve concurrent requests.

pub mod registry;
pub mod strategy;
pub mod traits;

pub use registry::StrategyRegistry;
pub use strategy::{DEFAULT_PRIORITY, ProcessingStrategy, StrategyInfo, accepts_document, validate_document};
pub use traits::Plugin;
