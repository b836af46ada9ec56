//! Tests for the health module

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dirlink_core::{Connection, DirError, Result};

/// Connection whose probe takes a fixed time and may fail
struct SlowConnection {
    delay: Duration,
    fail: bool,
    closed: AtomicBool,
}

impl SlowConnection {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            fail: false,
            closed: AtomicBool::new(false),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }
}

#[async_trait]
impl Connection for SlowConnection {
    async fn open(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn probe(&self) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(DirError::Connection("server went away".into()));
        }
        Ok(())
    }
}

mod status_tests {
    use super::*;

    #[test]
    fn test_classify_default_thresholds() {
        assert_eq!(
            HealthStatus::from_latency(Duration::from_millis(50)),
            HealthStatus::Healthy
        );
        assert_eq!(
            HealthStatus::from_latency(Duration::from_millis(200)),
            HealthStatus::Degraded
        );
        let status = HealthStatus::from_latency(Duration::from_millis(1000));
        assert_eq!(status, HealthStatus::Unhealthy);
        assert!(!status.is_usable());
    }

    #[test]
    fn test_classify_bounds_are_inclusive() {
        let thresholds = HealthThresholds::default();
        assert_eq!(
            thresholds.classify(Duration::from_millis(100)),
            HealthStatus::Healthy
        );
        assert_eq!(
            thresholds.classify(Duration::from_millis(101)),
            HealthStatus::Degraded
        );
        assert_eq!(
            thresholds.classify(Duration::from_millis(500)),
            HealthStatus::Degraded
        );
        assert_eq!(
            thresholds.classify(Duration::from_millis(501)),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_thresholds_degraded_at_least_healthy() {
        let thresholds = HealthThresholds::new(200, 100);
        assert_eq!(thresholds.healthy_threshold(), Duration::from_millis(200));
        assert_eq!(thresholds.degraded_threshold(), Duration::from_millis(200));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
        let status: HealthStatus = serde_json::from_str("\"unhealthy\"").unwrap();
        assert_eq!(status, HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::default(), HealthStatus::Healthy);
    }
}

mod ping_tests {
    use super::*;

    #[test]
    fn test_ping_error_display() {
        assert_eq!(PingError::ConnectionClosed.to_string(), "Connection is closed");
        assert_eq!(
            PingError::ProbeFailed("reset".to_string()).to_string(),
            "Probe failed: reset"
        );
        assert_eq!(
            PingError::Timeout(Duration::from_secs(2)).to_string(),
            "Probe timed out after 2s"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_latency_measures_round_trip() {
        let conn = SlowConnection::new(150);
        let latency = probe_latency(&conn, Duration::from_secs(1)).await.unwrap();
        assert!(latency >= Duration::from_millis(150));
        assert!(latency < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_latency_timeout() {
        let conn = SlowConnection::new(5_000);
        let err = probe_latency(&conn, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, PingError::Timeout(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_probe_latency_closed_connection() {
        let conn = SlowConnection::new(0);
        conn.close().await.unwrap();
        let err = probe_latency(&conn, Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, PingError::ConnectionClosed);
    }

    #[tokio::test]
    async fn test_probe_latency_failure() {
        let err = probe_latency(&SlowConnection::failing(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PingError::ProbeFailed(msg) if msg.contains("server went away")));
    }
}

mod validator_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_probe_validator_accepts_degraded() {
        let validator = ProbeValidator::default();
        assert!(validator.validate(&SlowConnection::new(10)).await);
        assert!(validator.validate(&SlowConnection::new(300)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_validator_rejects_unhealthy_and_failed() {
        let validator =
            ProbeValidator::new(Duration::from_secs(1)).with_thresholds(HealthThresholds::new(10, 50));
        assert!(!validator.validate(&SlowConnection::new(80)).await);
        assert!(!validator.validate(&SlowConnection::new(2_000)).await);
        assert!(!validator.validate(&SlowConnection::failing()).await);
    }

    #[tokio::test]
    async fn test_open_state_validator() {
        let conn = SlowConnection::new(0);
        assert!(OpenStateValidator.validate(&conn).await);
        conn.close().await.unwrap();
        assert!(!OpenStateValidator.validate(&conn).await);
    }

    #[tokio::test]
    async fn test_noop_hooks() {
        let conn = SlowConnection::new(0);
        assert!(NoopActivator.activate(&conn).await);
        assert!(NoopPassivator.passivate(&conn).await);
    }
}
