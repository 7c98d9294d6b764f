//! Host-implemented seams. The core never performs network or storage I/O itself.

use shieldcore_types::{Platform, TelemetryEvent};
use thiserror::Error;

/// What the host asks its policy service for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyQuery {
    pub app_id: String,
    pub app_version: String,
    pub env: String,
    pub device_platform: Platform,
}

#[derive(Debug, Error)]
#[error("policy fetch failed: {0}")]
pub struct FetchError(pub String);

#[derive(Debug, Error)]
#[error("telemetry submit failed: {0}")]
pub struct SinkError(pub String);

/// Retrieves the raw policy document JSON for a query.
pub trait PolicyFetcher {
    fn fetch(&self, query: &PolicyQuery) -> Result<String, FetchError>;
}

/// Accepts telemetry events for delivery.
pub trait TelemetrySink {
    fn submit(&self, event: &TelemetryEvent) -> Result<(), SinkError>;
}
