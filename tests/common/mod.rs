//! Frame builders shared by the integration tests
//!
//! Frames are generated from the schema tables themselves, filling every slot
//! with a fixed per-field sample value, so each registered variant can be
//! exercised without hand-written fixtures.

#![allow(dead_code)]

use duet::{Codec, Field, FrameSource, GasChannel, RadioMetadata, TempRhSensor, VariantSchema};

pub const HOST_UNIX: u32 = 1_700_000_000;
pub const SAMPLE_MS: u32 = 4_000;
pub const SEND_MS: u32 = 9_500;
pub const SERIAL_NUMBER: u16 = 1234;
pub const GAS_BITMASK: u16 = 0b1_0000_0101;

pub const PM_TOP: [u16; 9] = [100, 10, 30, 500, 400, 300, 200, 100, 1];
pub const PM_BOTTOM: [u16; 9] = [105, 30, 10, 520, 0, 300, 190, 90, 2];
pub const PM_FLOAT: [f32; 9] = [1.5, 2.5, 3.5, 10.0, 20.0, 30.0, 40.0, 50.0, 0.5];
pub const GAS_RAW: [f32; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

pub fn radio() -> RadioMetadata {
    RadioMetadata::new(-7, -112, 2, SEND_MS)
}

pub fn temperature(sensor: TempRhSensor) -> f32 {
    match sensor {
        TempRhSensor::Htu => 20.0,
        TempRhSensor::Scd => 22.0,
        TempRhSensor::Si => 23.5,
    }
}

pub fn humidity(sensor: TempRhSensor) -> f32 {
    match sensor {
        TempRhSensor::Htu => 40.0,
        TempRhSensor::Scd => 50.0,
        TempRhSensor::Si => 38.0,
    }
}

pub fn gas_channel_value(channel: GasChannel) -> f32 {
    0.25 * (channel.index() as f32 + 1.0)
}

enum Sample {
    Unsigned(u32),
    Signed(i32),
    Float(f32),
    Counts([u16; 9]),
    Floats([f32; 9]),
    Pad(usize),
}

fn sample(field: Field, codec: Codec) -> Sample {
    match field {
        Field::SensorStates => Sample::Unsigned(3),
        Field::PoeUsbVoltage => Sample::Unsigned(5),
        Field::SerialNumber => Sample::Unsigned(u32::from(SERIAL_NUMBER)),
        Field::SampleTimeMs => Sample::Unsigned(SAMPLE_MS),
        Field::Co2 => Sample::Unsigned(612),
        Field::VocIndex => Sample::Unsigned(101),
        Field::Tvoc => Sample::Signed(-12),
        Field::Temperature(s) => Sample::Float(temperature(s)),
        Field::Humidity(s) => Sample::Float(humidity(s)),
        Field::Pressure => Sample::Float(1013.25),
        Field::ParticulateTop if codec == Codec::FloatVector => Sample::Floats(PM_FLOAT),
        Field::ParticulateTop => Sample::Counts(PM_TOP),
        Field::ParticulateBottom => Sample::Counts(PM_BOTTOM),
        Field::GasBitmask => Sample::Unsigned(u32::from(GAS_BITMASK)),
        Field::GasValues => Sample::Floats(GAS_RAW),
        Field::Gas(ch) => Sample::Float(gas_channel_value(ch)),
        Field::H2s => Sample::Float(0.75),
        Field::Tgs2611Rs => Sample::Float(12_000.0),
        Field::Tgs2600Rs => Sample::Float(8_000.5),
        Field::Latitude => Sample::Float(45.5),
        Field::Longitude => Sample::Float(-73.25),
        Field::AirVelocity => Sample::Float(3.5),
        Field::Padding => Sample::Pad(codec.byte_width()),
    }
}

/// Radio frame for a schema, version bytes included
pub fn radio_frame(schema: &VariantSchema) -> Vec<u8> {
    let mut buf = vec![schema.key.hw_version, schema.key.sensor_variant];
    for slot in schema.layout(FrameSource::RadioBinary).slots {
        match (sample(slot.field, slot.codec), slot.codec) {
            (Sample::Unsigned(v), Codec::U8) => buf.push(v as u8),
            (Sample::Unsigned(v), Codec::U16) => buf.extend_from_slice(&(v as u16).to_le_bytes()),
            (Sample::Unsigned(v), _) => buf.extend_from_slice(&v.to_le_bytes()),
            (Sample::Signed(v), _) => buf.extend_from_slice(&v.to_le_bytes()),
            (Sample::Float(v), _) => buf.extend_from_slice(&v.to_le_bytes()),
            (Sample::Counts(vs), _) => {
                vs.iter().for_each(|v| buf.extend_from_slice(&v.to_le_bytes()))
            }
            (Sample::Floats(vs), _) => {
                vs.iter().for_each(|v| buf.extend_from_slice(&v.to_le_bytes()))
            }
            (Sample::Pad(n), _) => buf.extend(std::iter::repeat(0u8).take(n)),
        }
    }
    buf
}

fn join<T: ToString>(values: &[T]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}

/// Serial tokens for a schema, version tokens excluded
pub fn serial_tokens(schema: &VariantSchema) -> Vec<String> {
    schema
        .layout(FrameSource::SerialAscii)
        .slots
        .iter()
        .filter_map(|slot| match sample(slot.field, slot.codec) {
            Sample::Unsigned(v) => Some(v.to_string()),
            Sample::Signed(v) => Some(v.to_string()),
            Sample::Float(v) => Some(v.to_string()),
            Sample::Counts(vs) => Some(join(&vs)),
            Sample::Floats(vs) => Some(join(&vs)),
            Sample::Pad(_) => None,
        })
        .collect()
}

/// Serial line for a schema, version tokens included
pub fn serial_line(schema: &VariantSchema) -> String {
    let mut tokens = vec![
        schema.key.hw_version.to_string(),
        schema.key.sensor_variant.to_string(),
    ];
    tokens.extend(serial_tokens(schema));
    tokens.join(" ")
}
