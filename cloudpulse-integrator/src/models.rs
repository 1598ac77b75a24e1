use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One monitored numeric series.
///
/// The variant order here is the notification priority order: breaches are
/// reported and notified in this order every cycle, so downstream behavior
/// is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Cpu,
    Memory,
    Disk,
    NetRecvKbps,
    NetTransKbps,
}

impl Signal {
    /// All signals in evaluation priority order.
    pub const ALL: [Signal; 5] = [
        Signal::Cpu,
        Signal::Memory,
        Signal::Disk,
        Signal::NetRecvKbps,
        Signal::NetTransKbps,
    ];

    /// Configuration key for this signal (matches the `[thresholds]` and
    /// `[cooldowns]` table keys).
    pub fn key(&self) -> &'static str {
        match self {
            Signal::Cpu => "cpu",
            Signal::Memory => "memory",
            Signal::Disk => "disk",
            Signal::NetRecvKbps => "net_recv_kbps",
            Signal::NetTransKbps => "net_trans_kbps",
        }
    }

    /// Human-readable label used in incident titles and descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Cpu => "CPU",
            Signal::Memory => "Memory",
            Signal::Disk => "Disk",
            Signal::NetRecvKbps => "Network Inbound",
            Signal::NetTransKbps => "Network Outbound",
        }
    }

    /// Unit suffix for formatted readings.
    pub fn unit(&self) -> &'static str {
        match self {
            Signal::Cpu | Signal::Memory | Signal::Disk => "%",
            Signal::NetRecvKbps | Signal::NetTransKbps => " KB/s",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One timestamped set of readings across all signals, treated as an atomic
/// unit for evaluation. Built once per poll cycle by the metric source and
/// never mutated. Readings missing from the store are reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub net_recv_kbps: f64,
    pub net_trans_kbps: f64,
}

impl MetricSnapshot {
    /// Reading for a single signal.
    pub fn value(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Cpu => self.cpu,
            Signal::Memory => self.memory,
            Signal::Disk => self.disk,
            Signal::NetRecvKbps => self.net_recv_kbps,
            Signal::NetTransKbps => self.net_trans_kbps,
        }
    }
}

/// One detected threshold breach, produced by the evaluator and consumed
/// within the same cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BreachReport {
    pub signal: Signal,
    pub value: f64,
    pub threshold: f64,
}
