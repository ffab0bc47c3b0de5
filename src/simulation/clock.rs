//! Virtual clock
//!
//! Simulation time is a count of minutes since the start of the run. It only
//! moves when the engine processes an event and never moves backward. An
//! optional calendar epoch maps virtual minutes onto wall-clock timestamps
//! for reports.

use super::error::{SimulationError, SimulationResult};
use crate::types::Minutes;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::trace;

/// Monotonic virtual clock
#[derive(Debug, Clone, Serialize)]
pub struct VirtualClock {
    now: Minutes,
    epoch: Option<DateTime<Utc>>,
}

impl VirtualClock {
    /// Clock at minute zero with no calendar mapping
    pub fn new() -> Self {
        Self { now: 0.0, epoch: None }
    }

    /// Clock whose minute zero corresponds to `epoch`
    pub fn with_epoch(epoch: DateTime<Utc>) -> Self {
        Self { now: 0.0, epoch: Some(epoch) }
    }

    /// Current virtual time
    pub fn now(&self) -> Minutes {
        self.now
    }

    /// Calendar epoch, if configured
    pub fn epoch(&self) -> Option<DateTime<Utc>> {
        self.epoch
    }

    /// Move the clock to `time`
    ///
    /// Fails with an invariant violation if `time` lies in the past.
    pub fn advance_to(&mut self, time: Minutes) -> SimulationResult<()> {
        if time < self.now {
            return Err(SimulationError::invariant_violation(format!(
                "clock cannot move backward from {:.3} to {:.3}",
                self.now, time
            )));
        }
        trace!(from = self.now, to = time, "Advancing virtual clock");
        self.now = time;
        Ok(())
    }

    /// Calendar timestamp of a virtual time
    pub fn timestamp_of(&self, time: Minutes) -> Option<DateTime<Utc>> {
        let millis = (time * 60_000.0).round() as i64;
        self.epoch.map(|epoch| epoch + Duration::milliseconds(millis))
    }

    /// Calendar timestamp of the current time
    pub fn current_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp_of(self.now)
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = VirtualClock::new();
        clock.advance_to(10.0).unwrap();
        clock.advance_to(10.0).unwrap();
        assert_eq!(clock.now(), 10.0);

        let err = clock.advance_to(5.0).unwrap_err();
        assert!(matches!(err, SimulationError::InvariantViolation(_)));
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_epoch_mapping() {
        let epoch = Utc.with_ymd_and_hms(2024, 3, 4, 6, 0, 0).unwrap();
        let mut clock = VirtualClock::with_epoch(epoch);
        clock.advance_to(90.5).unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 3, 4, 7, 30, 30).unwrap();
        assert_eq!(clock.current_timestamp(), Some(expected));
        assert!(VirtualClock::new().current_timestamp().is_none());
    }
}
