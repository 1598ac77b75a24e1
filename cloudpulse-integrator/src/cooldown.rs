//! Cooldown tracker
//!
//! Per-signal last-fired bookkeeping that keeps one breach from turning into
//! an incident storm. Owned exclusively by the orchestrator; state lives only
//! in memory, so a restart resets every cooldown to never-fired.
//!
//! A firing is recorded when notification is *attempted*, not when the
//! ticketing endpoint confirms delivery. During a ticketing outage this may
//! drop incidents, but it also means the endpoint is never flooded with
//! retries once it recovers.

use crate::config::Cooldowns;
use crate::models::Signal;
use std::collections::HashMap;

/// Epoch time of the last attempted firing per signal. Holds an entry for
/// every member of [`Signal::ALL`], matching the threshold and cooldown key
/// sets exactly.
#[derive(Debug)]
pub struct AlertState {
    last_fired: HashMap<Signal, Option<i64>>,
    cooldowns: Cooldowns,
}

impl AlertState {
    pub fn new(cooldowns: Cooldowns) -> Self {
        let last_fired = Signal::ALL.iter().map(|&s| (s, None)).collect();
        Self {
            last_fired,
            cooldowns,
        }
    }

    /// Whether `signal` is still inside its cooldown window at `now`
    /// (epoch seconds). A signal that has never fired is never suppressed.
    pub fn is_suppressed(&self, signal: Signal, now: i64) -> bool {
        match self.last_fired[&signal] {
            Some(last) => now - last < self.cooldowns.seconds(signal) as i64,
            None => false,
        }
    }

    /// Seconds since the last firing, for suppression log lines.
    pub fn seconds_since_fired(&self, signal: Signal, now: i64) -> Option<i64> {
        self.last_fired[&signal].map(|last| now - last)
    }

    /// Epoch time of the last firing attempt, `None` if never fired.
    pub fn last_fired(&self, signal: Signal) -> Option<i64> {
        self.last_fired[&signal]
    }

    /// Record a firing attempt at `now`, unconditionally overwriting any
    /// previous timestamp.
    pub fn record_fired(&mut self, signal: Signal, now: i64) {
        self.last_fired.insert(signal, Some(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_fired_is_never_suppressed() {
        let state = AlertState::new(Cooldowns::default());
        for signal in Signal::ALL {
            assert!(!state.is_suppressed(signal, 0));
            assert!(!state.is_suppressed(signal, i64::MAX));
        }
    }

    #[test]
    fn suppressed_strictly_inside_window() {
        let mut state = AlertState::new(Cooldowns::default());
        state.record_fired(Signal::Cpu, 1000);
        assert!(state.is_suppressed(Signal::Cpu, 1000));
        assert!(state.is_suppressed(Signal::Cpu, 1299));
        // Exactly at T + C the window has elapsed.
        assert!(!state.is_suppressed(Signal::Cpu, 1300));
        assert!(!state.is_suppressed(Signal::Cpu, 1301));
    }

    #[test]
    fn cooldowns_are_per_signal() {
        let mut state = AlertState::new(Cooldowns::default());
        state.record_fired(Signal::Cpu, 1000);
        assert!(state.is_suppressed(Signal::Cpu, 1100));
        assert!(!state.is_suppressed(Signal::Memory, 1100));
    }

    #[test]
    fn disk_uses_its_longer_default_window() {
        let mut state = AlertState::new(Cooldowns::default());
        state.record_fired(Signal::Disk, 0);
        assert!(state.is_suppressed(Signal::Disk, 599));
        assert!(!state.is_suppressed(Signal::Disk, 600));
    }

    #[test]
    fn record_overwrites_previous_firing() {
        let mut state = AlertState::new(Cooldowns::default());
        state.record_fired(Signal::Cpu, 0);
        assert!(!state.is_suppressed(Signal::Cpu, 300));
        state.record_fired(Signal::Cpu, 300);
        assert!(state.is_suppressed(Signal::Cpu, 599));
        assert_eq!(state.seconds_since_fired(Signal::Cpu, 400), Some(100));
    }
}
