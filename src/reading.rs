//! Decoded reading types
//!
//! A [`DecodedReading`] is created for each decode call, filled slot by slot,
//! finished by the schema's derivation steps and then handed read-only to the
//! projector. Fields a variant does not carry stay `None`.

use crate::codec::VECTOR_ARITY;
use crate::protocol::{ConnectionType, FrameSource, VariantKey};
use std::fmt;

/// One particle counter snapshot: 3 mass bins followed by 6 count bins
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Particulate {
    /// Integer counters (PMS5003, SPS30 integer firmware)
    Counts([u16; VECTOR_ARITY]),
    /// Float concentrations (SPS30 float firmware)
    Concentrations([f32; VECTOR_ARITY]),
}

/// The two physical counters and their reconciled value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticulateSet {
    /// First counter, published with the `_t` suffix
    pub top: Option<Particulate>,
    /// Second counter, published with the `_b` suffix
    pub bottom: Option<Particulate>,
    /// Reconciled counter, published with the `_m` suffix
    pub merged: Option<Particulate>,
}

/// Temperature (°C) and relative humidity (%) from one sensor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TempRh {
    pub temperature: f32,
    pub humidity: f32,
}

impl TempRh {
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// Temperature/humidity sensors found across the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempRhSensor {
    Htu,
    Scd,
    Si,
}

impl fmt::Display for TempRhSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempRhSensor::Htu => write!(f, "htu"),
            TempRhSensor::Scd => write!(f, "scd"),
            TempRhSensor::Si => write!(f, "si"),
        }
    }
}

/// Gas channels in bitmask order; bit `i` gates channel `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GasChannel {
    Co = 0,
    O3 = 1,
    Nh3 = 2,
    No = 3,
    No2 = 4,
    So2 = 5,
    Ch2o = 6,
    Voc = 7,
    Ch4 = 8,
}

impl GasChannel {
    /// All channels, in bitmask order
    pub const ALL: [GasChannel; VECTOR_ARITY] = [
        GasChannel::Co,
        GasChannel::O3,
        GasChannel::Nh3,
        GasChannel::No,
        GasChannel::No2,
        GasChannel::So2,
        GasChannel::Ch2o,
        GasChannel::Voc,
        GasChannel::Ch4,
    ];

    /// Position in the raw vector
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Bit gating this channel
    pub const fn bit(&self) -> u16 {
        1 << (*self as u16)
    }

    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

/// Sparse gas concentration vector
///
/// `raw` holds the values as transmitted; `channels` holds only the values a
/// variant actually measures. An unset channel is absent, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GasVector {
    /// Presence bitmask, when the variant transmits one
    pub bitmask: Option<u16>,
    /// Values as transmitted, before bitmask gating
    pub raw: Option<[f32; VECTOR_ARITY]>,
    /// Gated values
    pub channels: [Option<f32>; VECTOR_ARITY],
}

impl GasVector {
    /// Value of one channel, if present
    pub fn get(&self, channel: GasChannel) -> Option<f32> {
        self.channels[channel.index()]
    }

    /// Mark a channel present with the given value
    pub fn set(&mut self, channel: GasChannel, value: f32) {
        self.channels[channel.index()] = Some(value);
    }

    /// Present channels with their values
    pub fn present(&self) -> impl Iterator<Item = (GasChannel, f32)> + '_ {
        GasChannel::ALL
            .into_iter()
            .filter_map(move |ch| self.get(ch).map(|v| (ch, v)))
    }

    /// Whether no channel is present
    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(Option::is_none)
    }
}

/// Link quality and timing reported by the radio transport
///
/// Absence is signalled by `snr == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioMetadata {
    pub snr: i32,
    pub rssi: i16,
    pub hops: u8,
    /// Device uptime when the frame left the radio, in milliseconds
    pub device_send_time_ms: u32,
}

impl RadioMetadata {
    pub fn new(snr: i32, rssi: i16, hops: u8, device_send_time_ms: u32) -> Self {
        Self {
            snr,
            rssi,
            hops,
            device_send_time_ms,
        }
    }

    /// Whether link metadata was reported
    pub fn is_present(&self) -> bool {
        self.snr != 0
    }
}

/// The result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReading {
    pub key: VariantKey,
    /// Human-readable variant name, e.g. `Mk4.13`
    pub alias: &'static str,
    /// Numeric variant tag published downstream, e.g. `4.13`
    pub device_type: f64,
    pub source: FrameSource,
    pub connection_type: ConnectionType,

    pub serial_number: u16,
    /// Device uptime at sampling, in milliseconds
    pub sample_time_ms: u32,
    /// Absolute sample time
    pub unix_sec: u32,
    /// Absolute time of the device's last reset
    pub last_reset_unix: u32,
    pub sensor_states: u8,
    pub poe_usb_voltage: Option<u8>,

    pub particulate: ParticulateSet,
    pub htu: Option<TempRh>,
    pub scd: Option<TempRh>,
    pub si: Option<TempRh>,
    /// Reconciled temperature/humidity
    pub combined: Option<TempRh>,

    pub co2: Option<u16>,
    pub voc_index: Option<u32>,
    /// SGP30 total VOC, on variants that carry both VOC sensors
    pub tvoc: Option<i32>,
    pub pressure: Option<f32>,

    pub gas: GasVector,
    pub h2s: Option<f32>,
    pub tgs2611_rs: Option<f32>,
    pub tgs2600_rs: Option<f32>,

    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub air_velocity: Option<f32>,

    pub radio: RadioMetadata,
    /// Gateway-side MCU temperature, filled in after decode
    pub aux_mcu_temp: Option<f32>,
}

impl DecodedReading {
    /// Empty reading for one variant and source
    pub fn new(
        key: VariantKey,
        alias: &'static str,
        device_type: f64,
        source: FrameSource,
    ) -> Self {
        Self {
            key,
            alias,
            device_type,
            source,
            connection_type: source.connection_type(),
            serial_number: 0,
            sample_time_ms: 0,
            unix_sec: 0,
            last_reset_unix: 0,
            sensor_states: 0,
            poe_usb_voltage: None,
            particulate: ParticulateSet::default(),
            htu: None,
            scd: None,
            si: None,
            combined: None,
            co2: None,
            voc_index: None,
            tvoc: None,
            pressure: None,
            gas: GasVector::default(),
            h2s: None,
            tgs2611_rs: None,
            tgs2600_rs: None,
            latitude: None,
            longitude: None,
            air_velocity: None,
            radio: RadioMetadata::default(),
            aux_mcu_temp: None,
        }
    }

    /// Attach the gateway MCU temperature
    pub fn set_aux_mcu_temp(&mut self, celsius: f32) {
        self.aux_mcu_temp = Some(celsius);
    }

    /// Reading of one temperature/humidity sensor
    pub fn temp_rh(&self, sensor: TempRhSensor) -> Option<TempRh> {
        match sensor {
            TempRhSensor::Htu => self.htu,
            TempRhSensor::Scd => self.scd,
            TempRhSensor::Si => self.si,
        }
    }

    pub(crate) fn temp_rh_mut(&mut self, sensor: TempRhSensor) -> &mut TempRh {
        let slot = match sensor {
            TempRhSensor::Htu => &mut self.htu,
            TempRhSensor::Scd => &mut self.scd,
            TempRhSensor::Si => &mut self.si,
        };
        slot.get_or_insert_with(TempRh::default)
    }

    /// Sample time as a UTC datetime
    #[cfg(feature = "timestamps")]
    pub fn sampled_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(i64::from(self.unix_sec), 0)
    }

    /// Last reset time as a UTC datetime
    #[cfg(feature = "timestamps")]
    pub fn last_reset_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(i64::from(self.last_reset_unix), 0)
    }
}
