//! # x509-metrics
//!
//! Publishes certificate validity as Prometheus gauges.
//!
//! ```text
//! Collector::run  -- every polling interval --> Prober (bounded fan-out)
//!       |                                         |
//!       +---- write lock ---> ExporterMetrics <---+
//!                                  |
//!                  read lock <-- GET /metrics (axum)
//! ```

pub mod collector;
pub mod metrics;
pub mod registry;
pub mod server;

pub use collector::{CollectionSummary, Collector};
pub use metrics::{ExporterMetrics, SharedMetrics, NAMESPACE};
pub use registry::{GaugeVec, CONTENT_TYPE};
