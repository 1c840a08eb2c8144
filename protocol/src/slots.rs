//! Network time: seconds since the epoch, and forging slots.
//!
//! Transaction timestamps are not Unix time. They count whole seconds since
//! the network epoch (2017-07-09T20:00:00Z on mainnet), which keeps them
//! inside an `i32` for the next several decades. Time is cut into slots of
//! [`SLOT_INTERVAL_SECONDS`]; each slot belongs to one delegate, and a round
//! is [`DELEGATES_PER_ROUND`] consecutive slots.

use chrono::{DateTime, Duration, Utc};

use crate::config::{NetworkConfig, DELEGATES_PER_ROUND, SLOT_INTERVAL_SECONDS};
use crate::transaction::error::TransactionError;

/// Converts between wall-clock instants and epoch seconds and slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochClock {
    epoch: DateTime<Utc>,
    interval: i64,
    delegates: i64,
}

impl EpochClock {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            interval: SLOT_INTERVAL_SECONDS,
            delegates: DELEGATES_PER_ROUND,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.epoch)
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Whole seconds from the epoch to `at`, rounded down.
    pub fn epoch_time(&self, at: DateTime<Utc>) -> i64 {
        (at - self.epoch).num_milliseconds().div_euclid(1000)
    }

    /// Seconds since the epoch, right now.
    pub fn now(&self) -> i64 {
        self.epoch_time(Utc::now())
    }

    /// Current epoch time narrowed to the wire width.
    pub fn timestamp_now(&self) -> Result<i32, TransactionError> {
        narrow_timestamp(self.now())
    }

    /// The wall-clock instant of an epoch timestamp.
    pub fn real_time(&self, epoch_seconds: i64) -> DateTime<Utc> {
        self.epoch + Duration::seconds(epoch_seconds)
    }

    pub fn slot_number(&self, epoch_seconds: i64) -> i64 {
        epoch_seconds.div_euclid(self.interval)
    }

    /// First second of `slot`, in epoch time.
    pub fn slot_time(&self, slot: i64) -> i64 {
        slot * self.interval
    }

    pub fn next_slot(&self, epoch_seconds: i64) -> i64 {
        self.slot_number(epoch_seconds) + 1
    }

    /// The slot one full round after `next_slot`.
    pub fn last_slot(&self, next_slot: i64) -> i64 {
        next_slot + self.delegates
    }
}

impl Default for EpochClock {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}

/// Fit an epoch timestamp into the 4-byte wire field.
pub fn narrow_timestamp(epoch_seconds: i64) -> Result<i32, TransactionError> {
    i32::try_from(epoch_seconds).map_err(|_| TransactionError::SerializationOverflow {
        field: "timestamp",
        value: epoch_seconds as i128,
        max: i32::MAX as i128,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> EpochClock {
        EpochClock::default()
    }

    #[test]
    fn epoch_is_zero() {
        let c = clock();
        assert_eq!(c.epoch_time(c.epoch()), 0);
    }

    #[test]
    fn epoch_time_rounds_down() {
        let c = clock();
        let at = c.epoch() + Duration::milliseconds(10_999);
        assert_eq!(c.epoch_time(at), 10);
        let before = c.epoch() - Duration::milliseconds(1);
        assert_eq!(c.epoch_time(before), -1);
    }

    #[test]
    fn epoch_time_for_known_date() {
        let c = clock();
        let at = Utc.with_ymd_and_hms(2017, 7, 10, 20, 0, 0).unwrap();
        assert_eq!(c.epoch_time(at), 86_400);
        assert_eq!(c.real_time(86_400), at);
    }

    #[test]
    fn slots() {
        let c = clock();
        assert_eq!(c.slot_number(0), 0);
        assert_eq!(c.slot_number(9), 0);
        assert_eq!(c.slot_number(10), 1);
        assert_eq!(c.slot_time(3), 30);
        assert_eq!(c.next_slot(25), 3);
        assert_eq!(c.last_slot(3), 14);
    }

    #[test]
    fn now_is_after_epoch() {
        assert!(clock().now() > 0);
        assert!(clock().timestamp_now().is_ok());
    }

    #[test]
    fn narrow_timestamp_bounds() {
        assert_eq!(narrow_timestamp(i32::MAX as i64).unwrap(), i32::MAX);
        assert_eq!(narrow_timestamp(-5).unwrap(), -5);
        assert!(matches!(
            narrow_timestamp(i32::MAX as i64 + 1),
            Err(TransactionError::SerializationOverflow { field: "timestamp", .. })
        ));
    }
}
