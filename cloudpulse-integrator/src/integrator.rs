//! Orchestrator poll loop
//!
//! Drives the fetch -> evaluate -> notify -> sleep cycle forever. Every
//! external failure is recoverable by skipping work for the current cycle;
//! the loop itself only stops on shutdown. The clock is injectable so tests
//! can move time without waiting, and the sleep is raced against a shutdown
//! channel so stopping does not block on the poll interval.

use crate::config::{Cooldowns, IntegratorConfig, Thresholds};
use crate::cooldown::AlertState;
use crate::evaluate::evaluate;
use crate::models::{BreachReport, MetricSnapshot, Signal};
use crate::sink::IncidentSink;
use crate::source::MetricSource;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Epoch-seconds clock, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// The monitor-and-react engine. Sole owner of the per-signal alert state.
pub struct Integrator<S, K, C> {
    source: S,
    sink: K,
    clock: C,
    thresholds: Thresholds,
    poll_interval: Duration,
    state: AlertState,
}

impl<S, K, C> Integrator<S, K, C>
where
    S: MetricSource,
    K: IncidentSink,
    C: Clock,
{
    pub fn new(
        source: S,
        sink: K,
        clock: C,
        thresholds: Thresholds,
        cooldowns: Cooldowns,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            clock,
            thresholds,
            poll_interval,
            state: AlertState::new(cooldowns),
        }
    }

    pub fn from_config(source: S, sink: K, clock: C, config: &IntegratorConfig) -> Self {
        Self::new(
            source,
            sink,
            clock,
            config.thresholds.clone(),
            config.cooldowns.clone(),
            Duration::from_secs(config.poll_interval_secs),
        )
    }

    /// Cooldown bookkeeping, exposed for inspection in tests.
    pub fn alert_state(&self) -> &AlertState {
        &self.state
    }

    /// Run poll cycles until the shutdown channel fires.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            thresholds = ?self.thresholds,
            "integrator started"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {
                    info!("shutdown requested, stopping poll loop");
                    break;
                }
            }
        }
    }

    /// One full FETCHING -> EVALUATING -> NOTIFYING pass. Never panics and
    /// never propagates an error; a failed or empty fetch skips straight to
    /// the next interval.
    pub async fn run_cycle(&mut self) {
        let snapshot = match self.source.fetch_latest().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!("no metrics in store, skipping cycle");
                return;
            }
            Err(e) => {
                warn!(error = %e, "metrics fetch failed, skipping cycle");
                return;
            }
        };

        debug!(
            timestamp = %snapshot.timestamp,
            cpu = snapshot.cpu,
            memory = snapshot.memory,
            disk = snapshot.disk,
            net_recv_kbps = snapshot.net_recv_kbps,
            net_trans_kbps = snapshot.net_trans_kbps,
            "snapshot fetched"
        );

        for breach in evaluate(&snapshot, &self.thresholds) {
            self.notify(&snapshot, &breach).await;
        }
    }

    /// Handle one breach: either log the suppression or attempt an incident.
    /// The firing is recorded on attempt, so a sink failure still starts the
    /// cooldown window and the endpoint is not hammered while it recovers.
    async fn notify(&mut self, snapshot: &MetricSnapshot, breach: &BreachReport) {
        let now = self.clock.now();

        if self.state.is_suppressed(breach.signal, now) {
            let since = self
                .state
                .seconds_since_fired(breach.signal, now)
                .unwrap_or(0);
            info!(
                signal = %breach.signal,
                value = breach.value,
                seconds_since_fired = since,
                "breach suppressed by cooldown"
            );
            return;
        }

        warn!(
            signal = %breach.signal,
            value = breach.value,
            threshold = breach.threshold,
            timestamp = %snapshot.timestamp,
            "threshold breached, raising incident"
        );

        let (title, description) = incident_text(snapshot, breach);
        if let Err(e) = self.sink.create_incident(&title, &description).await {
            error!(
                signal = %breach.signal,
                value = breach.value,
                error = %e,
                "incident creation failed"
            );
        }
        self.state.record_fired(breach.signal, now);
    }
}

/// Title and description for a breach incident, e.g.
/// `High CPU usage: 95.00%` / `CPU at 95.00% recorded at 2025-06-01 12:00:00 UTC`.
pub fn incident_text(snapshot: &MetricSnapshot, breach: &BreachReport) -> (String, String) {
    let label = breach.signal.label();
    let unit = breach.signal.unit();
    let title = match breach.signal {
        Signal::Cpu | Signal::Memory | Signal::Disk => {
            format!("High {label} usage: {:.2}{unit}", breach.value)
        }
        Signal::NetRecvKbps | Signal::NetTransKbps => {
            format!("High {label}: {:.2}{unit}", breach.value)
        }
    };
    let description = format!(
        "{label} at {:.2}{unit} recorded at {}",
        breach.value,
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    (title, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn incident_text_for_percent_signals() {
        let snapshot = MetricSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            cpu: 95.0,
            memory: 0.0,
            disk: 0.0,
            net_recv_kbps: 0.0,
            net_trans_kbps: 0.0,
        };
        let breach = BreachReport {
            signal: Signal::Cpu,
            value: 95.0,
            threshold: 80.0,
        };
        let (title, description) = incident_text(&snapshot, &breach);
        assert_eq!(title, "High CPU usage: 95.00%");
        assert_eq!(description, "CPU at 95.00% recorded at 2025-06-01 12:00:00 UTC");
    }

    #[test]
    fn incident_text_for_rate_signals() {
        let snapshot = MetricSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            cpu: 0.0,
            memory: 0.0,
            disk: 0.0,
            net_recv_kbps: 6000.0,
            net_trans_kbps: 0.0,
        };
        let breach = BreachReport {
            signal: Signal::NetRecvKbps,
            value: 6000.0,
            threshold: 5000.0,
        };
        let (title, _) = incident_text(&snapshot, &breach);
        assert_eq!(title, "High Network Inbound: 6000.00 KB/s");
    }
}
