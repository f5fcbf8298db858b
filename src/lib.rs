//! Battery and storage-wear health telemetry.
//!
//! [`HealthService`] owns a registry of subscribers and pushes a fresh
//! [`HealthSnapshot`] to all of them on every update. Storage wear records
//! are read from sysfs and never fail: missing attributes read as zero and
//! an empty report means the platform has no storage telemetry.

pub mod collectors;
pub mod config;
pub mod error;
pub mod listeners;
pub mod models;
pub mod monitor;
pub mod service;
pub mod util;

pub use error::{HealthError, HealthResult};
pub use listeners::{ChannelListener, DeathNotice, DeliveryError, Listener, ListenerId, ListenerRegistry};
pub use models::snapshot::HealthSnapshot;
pub use models::storage::{StorageRecord, StorageReport};
pub use service::HealthService;
