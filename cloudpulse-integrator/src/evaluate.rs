//! Threshold evaluator
//!
//! Pure mapping from one snapshot to the breaches it contains. A signal is
//! in breach iff its reading is strictly greater than its limit; equality is
//! not a breach. Output order follows [`Signal::ALL`] so notification order
//! is deterministic.

use crate::config::Thresholds;
use crate::models::{BreachReport, MetricSnapshot, Signal};

pub fn evaluate(snapshot: &MetricSnapshot, thresholds: &Thresholds) -> Vec<BreachReport> {
    Signal::ALL
        .iter()
        .filter_map(|&signal| {
            let value = snapshot.value(signal);
            let threshold = thresholds.limit(signal);
            (value > threshold).then_some(BreachReport {
                signal,
                value,
                threshold,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(cpu: f64, memory: f64, disk: f64, rx: f64, tx: f64) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            cpu,
            memory,
            disk,
            net_recv_kbps: rx,
            net_trans_kbps: tx,
        }
    }

    #[test]
    fn all_within_limits_yields_no_breaches() {
        let snap = snapshot(10.0, 20.0, 30.0, 100.0, 100.0);
        assert!(evaluate(&snap, &Thresholds::default()).is_empty());
    }

    #[test]
    fn equality_is_not_a_breach() {
        let snap = snapshot(80.0, 80.0, 90.0, 5000.0, 3000.0);
        assert!(evaluate(&snap, &Thresholds::default()).is_empty());
    }

    #[test]
    fn any_excess_is_a_breach() {
        let snap = snapshot(80.0 + f64::EPSILON * 128.0, 0.0, 0.0, 0.0, 0.0);
        let breaches = evaluate(&snap, &Thresholds::default());
        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].signal, Signal::Cpu);
    }

    #[test]
    fn breaches_come_out_in_priority_order() {
        let snap = snapshot(95.0, 10.0, 99.0, 9000.0, 10.0);
        let breaches = evaluate(&snap, &Thresholds::default());
        let signals: Vec<Signal> = breaches.iter().map(|b| b.signal).collect();
        assert_eq!(signals, vec![Signal::Cpu, Signal::Disk, Signal::NetRecvKbps]);
    }

    #[test]
    fn breach_carries_value_and_threshold() {
        let snap = snapshot(95.0, 0.0, 0.0, 0.0, 0.0);
        let breaches = evaluate(&snap, &Thresholds::default());
        assert_eq!(breaches[0].value, 95.0);
        assert_eq!(breaches[0].threshold, 80.0);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let snap = snapshot(95.0, 85.0, 10.0, 0.0, 6000.0);
        let thresholds = Thresholds::default();
        let first = evaluate(&snap, &thresholds);
        for _ in 0..10 {
            assert_eq!(evaluate(&snap, &thresholds), first);
        }
    }
}
