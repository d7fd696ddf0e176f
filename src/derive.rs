//! Derivation algorithms
//!
//! Post-extraction steps that turn raw sensor fields into the values a
//! reading publishes:
//! - particulate merge of two redundant counters
//! - temperature/humidity averaging
//! - gas bitmask gating
//! - absolute timestamp resolution

use crate::codec::VECTOR_ARITY;
use crate::error::ClockFault;
use crate::reading::{Particulate, TempRh};

/// Lower bound of the agreement window between two counters
pub const MERGE_RATIO_MIN: f32 = 0.5;
/// Upper bound of the agreement window between two counters
pub const MERGE_RATIO_MAX: f32 = 2.0;

/// Reconcile two redundant counter readings
///
/// A zero on either side means "no valid reading" and yields zero. Counters
/// that disagree by more than a factor of two yield the smaller value;
/// otherwise the truncated mean.
pub fn merge_count(a: u16, b: u16) -> u16 {
    if a == 0 || b == 0 {
        return 0;
    }
    let ratio = f32::from(a) / f32::from(b);
    if !(MERGE_RATIO_MIN..=MERGE_RATIO_MAX).contains(&ratio) {
        return a.min(b);
    }
    // u32 keeps the sum from wrapping
    ((u32::from(a) + u32::from(b)) / 2) as u16
}

/// [`merge_count`] for float concentrations, without truncation
pub fn merge_concentration(a: f32, b: f32) -> f32 {
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    let ratio = a / b;
    if !(MERGE_RATIO_MIN..=MERGE_RATIO_MAX).contains(&ratio) {
        return a.min(b);
    }
    (a + b) / 2.0
}

/// Merge two counters channel by channel
///
/// Returns `None` when one is integer and the other float.
pub fn merge_particulate(a: &Particulate, b: &Particulate) -> Option<Particulate> {
    match (a, b) {
        (Particulate::Counts(a), Particulate::Counts(b)) => {
            let mut out = [0u16; VECTOR_ARITY];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = merge_count(a[i], b[i]);
            }
            Some(Particulate::Counts(out))
        }
        (Particulate::Concentrations(a), Particulate::Concentrations(b)) => {
            let mut out = [0f32; VECTOR_ARITY];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = merge_concentration(a[i], b[i]);
            }
            Some(Particulate::Concentrations(out))
        }
        _ => None,
    }
}

/// Average temperature and humidity independently
pub fn average_temp_rh(a: &TempRh, b: &TempRh) -> TempRh {
    TempRh {
        temperature: (a.temperature + b.temperature) / 2.0,
        humidity: (a.humidity + b.humidity) / 2.0,
    }
}

/// Keep only the raw values whose bit is set
pub fn expand_gas(bitmask: u16, raw: &[f32; VECTOR_ARITY]) -> [Option<f32>; VECTOR_ARITY] {
    let mut out = [None; VECTOR_ARITY];
    for (i, slot) in out.iter_mut().enumerate() {
        if bitmask & (1 << i) != 0 {
            *slot = Some(raw[i]);
        }
    }
    out
}

/// Absolute sample time of a serial frame: the host receipt time
pub fn resolve_serial_timestamp(host_receipt_unix_sec: u32) -> u32 {
    host_receipt_unix_sec
}

/// Absolute sample time of a radio frame
///
/// The transit delay is the device's send time minus its sample time, both
/// in milliseconds of uptime, floored to whole seconds.
pub fn resolve_radio_timestamp(
    host_receipt_unix_sec: u32,
    device_send_time_ms: u32,
    device_sample_time_ms: u32,
) -> Result<u32, ClockFault> {
    if host_receipt_unix_sec == 0 || device_send_time_ms == 0 || device_sample_time_ms == 0 {
        return Err(ClockFault::Unset);
    }
    let delay_ms = device_send_time_ms
        .checked_sub(device_sample_time_ms)
        .ok_or(ClockFault::SentBeforeSample)?;
    host_receipt_unix_sec
        .checked_sub(delay_ms / 1000)
        .ok_or(ClockFault::BeforeEpoch)
}

/// Absolute time of the device's last reset
///
/// An uptime longer than the absolute sample time would put the reset before
/// the epoch.
pub fn last_reset_unix(unix_sec: u32, device_sample_time_ms: u32) -> Result<u32, ClockFault> {
    unix_sec
        .checked_sub(device_sample_time_ms / 1000)
        .ok_or(ClockFault::BeforeEpoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_merge_zero_is_no_reading() {
        for x in [0u16, 1, 100, u16::MAX] {
            assert_eq!(merge_count(0, x), 0);
            assert_eq!(merge_count(x, 0), 0);
        }
    }

    #[test]
    fn test_merge_agreeing_counters_average() {
        assert_eq!(merge_count(100, 105), 102);
        assert_eq!(merge_count(7, 7), 7);
        // Ratio bounds are inclusive
        assert_eq!(merge_count(10, 20), 15);
        assert_eq!(merge_count(20, 10), 15);
    }

    #[test]
    fn test_merge_disagreeing_counters_take_min() {
        assert_eq!(merge_count(10, 30), 10);
        assert_eq!(merge_count(30, 10), 10);
        assert_eq!(merge_count(1, 1000), 1);
    }

    #[test]
    fn test_merge_large_counters_do_not_wrap() {
        assert_eq!(merge_count(60_000, 62_000), 61_000);
        assert_eq!(merge_count(256, 256), 256);
    }

    #[test]
    fn test_merge_concentration() {
        assert_relative_eq!(merge_concentration(1.0, 1.5), 1.25);
        assert_relative_eq!(merge_concentration(1.0, 3.0), 1.0);
        assert_relative_eq!(merge_concentration(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_merge_particulate_per_channel() {
        let a = Particulate::Counts([0, 100, 10, 30, 5, 5, 5, 5, 5]);
        let b = Particulate::Counts([9, 105, 30, 10, 5, 5, 5, 5, 6]);
        assert_eq!(
            merge_particulate(&a, &b),
            Some(Particulate::Counts([0, 102, 10, 10, 5, 5, 5, 5, 5]))
        );

        let f = Particulate::Concentrations([1.0; 9]);
        assert_eq!(merge_particulate(&a, &f), None);
    }

    #[test]
    fn test_average_temp_rh() {
        let avg = average_temp_rh(&TempRh::new(20.0, 40.0), &TempRh::new(22.0, 50.0));
        assert_relative_eq!(avg.temperature, 21.0);
        assert_relative_eq!(avg.humidity, 45.0);
        // Symmetric
        assert_eq!(
            average_temp_rh(&TempRh::new(22.0, 50.0), &TempRh::new(20.0, 40.0)),
            avg
        );
    }

    #[test]
    fn test_expand_gas() {
        let raw = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let out = expand_gas(0b0_0000_0101, &raw);
        assert_eq!(
            out,
            [Some(1.0), None, Some(3.0), None, None, None, None, None, None]
        );
        assert_eq!(expand_gas(0, &raw), [None; 9]);
        assert!(expand_gas(0x01ff, &raw).iter().all(Option::is_some));
        // Bits above the ninth channel are ignored
        assert_eq!(expand_gas(0xfe00, &raw), [None; 9]);
    }

    #[test]
    fn test_radio_timestamp() {
        assert_eq!(resolve_radio_timestamp(1000, 5000, 4000), Ok(999));
        assert_eq!(resolve_radio_timestamp(1000, 4999, 4000), Ok(1000));
        assert_eq!(resolve_radio_timestamp(1000, 4000, 4000), Ok(1000));
    }

    #[test]
    fn test_radio_timestamp_faults() {
        assert_eq!(
            resolve_radio_timestamp(1000, 3000, 4000),
            Err(ClockFault::SentBeforeSample)
        );
        assert_eq!(resolve_radio_timestamp(0, 5000, 4000), Err(ClockFault::Unset));
        assert_eq!(resolve_radio_timestamp(1000, 0, 4000), Err(ClockFault::Unset));
        assert_eq!(resolve_radio_timestamp(1000, 5000, 0), Err(ClockFault::Unset));
        assert_eq!(
            resolve_radio_timestamp(1, 10_000, 1),
            Err(ClockFault::BeforeEpoch)
        );
    }

    #[test]
    fn test_serial_timestamp_and_reset() {
        assert_eq!(resolve_serial_timestamp(1_700_000_000), 1_700_000_000);
        assert_eq!(last_reset_unix(1_700_000_000, 3_600_999), Ok(1_699_996_400));
        assert_eq!(last_reset_unix(999, 4000), Ok(995));
        assert_eq!(last_reset_unix(4, 4999), Ok(0));
    }

    #[test]
    fn test_reset_before_epoch() {
        assert_eq!(last_reset_unix(3, 4000), Err(ClockFault::BeforeEpoch));
        assert_eq!(last_reset_unix(0, 1000), Err(ClockFault::BeforeEpoch));
    }
}
