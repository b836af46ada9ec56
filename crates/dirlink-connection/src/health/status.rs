//! Latency-based health classification

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Health of a connection judged by its probe latency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Answered within the healthy threshold
    #[default]
    Healthy,
    /// Answered, but slower than the healthy threshold
    Degraded,
    /// Answered too slowly, or not at all
    Unhealthy,
}

impl HealthStatus {
    /// Classify a latency against the default thresholds
    ///
    /// ```
    /// use dirlink_connection::health::HealthStatus;
    /// use std::time::Duration;
    ///
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(50)), HealthStatus::Healthy);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(200)), HealthStatus::Degraded);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_secs(1)), HealthStatus::Unhealthy);
    /// ```
    pub fn from_latency(latency: Duration) -> Self {
        HealthThresholds::default().classify(latency)
    }

    /// Healthy and degraded connections can still be handed out
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Latency bounds for [`HealthStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Maximum latency in milliseconds considered healthy
    healthy_ms: u64,
    /// Maximum latency in milliseconds considered degraded
    degraded_ms: u64,
}

impl HealthThresholds {
    /// Create thresholds; `degraded_ms` is raised to `healthy_ms` if lower.
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            healthy_ms,
            degraded_ms: degraded_ms.max(healthy_ms),
        }
    }

    pub fn healthy_threshold(&self) -> Duration {
        Duration::from_millis(self.healthy_ms)
    }

    pub fn degraded_threshold(&self) -> Duration {
        Duration::from_millis(self.degraded_ms)
    }

    /// Both bounds are inclusive
    pub fn classify(&self, latency: Duration) -> HealthStatus {
        if latency <= self.healthy_threshold() {
            HealthStatus::Healthy
        } else if latency <= self.degraded_threshold() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl Default for HealthThresholds {
    /// Healthy up to 100ms, degraded up to 500ms
    fn default() -> Self {
        Self::new(100, 500)
    }
}
