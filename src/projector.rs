//! Output projector
//!
//! Flattens a [`DecodedReading`] into string-keyed values for the storage
//! collaborator. Absent fields are omitted, never zeroed; the only constant
//! zeros are the retired `eco2`/`rawh2` keys storage still expects.

use crate::keys;
use crate::reading::{DecodedReading, Particulate, TempRh};
use std::collections::BTreeMap;
use std::fmt;

/// A projected value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as float; integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(u8, u16, u32, i16, i32, i64);

/// Sensor floats keep the shortest decimal form the f32 prints as, so 21.3
/// projects as 21.3 rather than its widened binary expansion.
impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Flat key-value view of one reading, ordered by key
pub type Projection = BTreeMap<&'static str, Value>;

/// Flatten a reading
pub fn project(reading: &DecodedReading, gateway_id: &str) -> Projection {
    let mut out = Projection::new();

    out.insert(keys::DEVICE_TYPE, reading.device_type.into());
    out.insert(keys::SERIAL_NUMBER, reading.serial_number.into());
    out.insert(keys::DEVICE_ID, reading.serial_number.into());
    out.insert(keys::GATEWAY_SERIAL, gateway_id.into());
    out.insert(keys::UNIX, reading.unix_sec.into());
    out.insert(keys::LAST_RESET_TIME, reading.last_reset_unix.into());
    out.insert(keys::SENSOR_STATES, reading.sensor_states.into());
    out.insert(keys::CONNECTION_TYPE, (reading.connection_type as u8).into());
    out.insert(keys::ECO2, Value::Int(0));
    out.insert(keys::RAWH2, Value::Int(0));
    insert_opt(&mut out, keys::POE_USB_VOLTAGE, reading.poe_usb_voltage);

    let pm = &reading.particulate;
    for (group, counter) in [
        (&keys::PARTICULATE_TOP, &pm.top),
        (&keys::PARTICULATE_BOTTOM, &pm.bottom),
        (&keys::PARTICULATE_MERGED, &pm.merged),
    ] {
        if let Some(counter) = counter {
            insert_particulate(&mut out, group, counter);
        }
    }

    for (temp_key, hum_key, sensor) in [
        (keys::HTU_TEMP, keys::HTU_HUM, reading.htu),
        (keys::SCD_TEMP, keys::SCD_HUM, reading.scd),
        (keys::SI_TEMP, keys::SI_HUM, reading.si),
        (keys::TEMP, keys::HUM, reading.combined),
    ] {
        if let Some(TempRh {
            temperature,
            humidity,
        }) = sensor
        {
            out.insert(temp_key, temperature.into());
            out.insert(hum_key, humidity.into());
        }
    }

    if let Some(co2) = reading.co2 {
        out.insert(keys::CO2, co2.into());
        out.insert(keys::CO2_LEGACY, co2.into());
    }

    match (reading.tvoc, reading.voc_index) {
        (Some(tvoc), index) => {
            out.insert(keys::TVOC, tvoc.into());
            insert_opt(&mut out, keys::VOC_INDEX, index);
        }
        (None, Some(index)) => {
            out.insert(keys::TVOC, index.into());
        }
        (None, None) => {}
    }

    insert_opt(&mut out, keys::PRESSURE, reading.pressure);

    for (channel, value) in reading.gas.present() {
        out.insert(keys::GAS_CHANNELS[channel.index()], value.into());
    }
    insert_opt(&mut out, keys::GAS_H2S, reading.h2s);
    insert_opt(&mut out, keys::TGS2611_RS, reading.tgs2611_rs);
    insert_opt(&mut out, keys::TGS2600_RS, reading.tgs2600_rs);

    insert_opt(&mut out, keys::LATITUDE, reading.latitude);
    insert_opt(&mut out, keys::LONGITUDE, reading.longitude);
    insert_opt(&mut out, keys::AIR_VELOCITY, reading.air_velocity);

    if reading.radio.is_present() {
        out.insert(keys::RSSI, reading.radio.rssi.into());
        out.insert(keys::SNR, reading.radio.snr.into());
        out.insert(keys::HOPS, reading.radio.hops.into());
    }

    insert_opt(&mut out, keys::PI_MCU_TEMP, reading.aux_mcu_temp);

    out
}

fn insert_opt<T: Into<Value>>(out: &mut Projection, key: &'static str, value: Option<T>) {
    if let Some(v) = value {
        out.insert(key, v.into());
    }
}

fn insert_particulate(out: &mut Projection, group: &[&'static str; 9], counter: &Particulate) {
    match counter {
        Particulate::Counts(values) => {
            for (key, v) in group.iter().zip(values) {
                out.insert(*key, (*v).into());
            }
        }
        Particulate::Concentrations(values) => {
            for (key, v) in group.iter().zip(values) {
                out.insert(*key, (*v).into());
            }
        }
    }
}
