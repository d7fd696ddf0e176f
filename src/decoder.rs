//! Decoder module
//!
//! One generic decoder drives every variant: it validates the payload size
//! against the schema, extracts slots in order, runs the schema's derivation
//! steps and resolves the absolute timestamp. Nothing is shared between
//! calls, and a failed decode never yields a partial reading.

use crate::codec::{decode_bytes, decode_token, CodecFault, RawValue};
use crate::derive;
use crate::error::{DecodeError, Result};
use crate::protocol::{split_radio_frame, split_serial_line, FrameSource};
use crate::reading::{DecodedReading, Particulate, RadioMetadata};
use crate::registry::Registry;
use crate::schema::{Derivation, Field, FieldSlot, VariantSchema};
use std::sync::Arc;

/// Layout payload of one frame, header already removed
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    /// Radio bytes with the link metadata reported alongside them
    Radio {
        payload: &'a [u8],
        radio: RadioMetadata,
    },
    /// Serial tokens
    Serial { tokens: &'a [&'a str] },
}

impl Frame<'_> {
    pub fn source(&self) -> FrameSource {
        match self {
            Frame::Radio { .. } => FrameSource::RadioBinary,
            Frame::Serial { .. } => FrameSource::SerialAscii,
        }
    }

    /// Payload size in bytes or tokens
    pub fn len(&self) -> usize {
        match self {
            Frame::Radio { payload, .. } => payload.len(),
            Frame::Serial { tokens } => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Frame decoder bound to a registry
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<Registry>,
}

impl Decoder {
    /// Create a decoder over the built-in variants
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::builtin()))
    }

    /// Create a decoder over a custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Decode a radio frame including its two version bytes
    pub fn decode_from_bytes(
        &self,
        raw_frame: &[u8],
        host_receipt_unix_sec: u32,
        radio: RadioMetadata,
    ) -> Result<DecodedReading> {
        let (key, payload) = split_radio_frame(raw_frame)?;
        let schema = self.registry.resolve_key(key)?;
        decode_validated(schema, Frame::Radio { payload, radio }, host_receipt_unix_sec)
    }

    /// Decode a serial line including its two version tokens
    pub fn decode_from_line(
        &self,
        raw_line: &str,
        host_receipt_unix_sec: u32,
    ) -> Result<DecodedReading> {
        let (key, tokens) = split_serial_line(raw_line)?;
        let schema = self.registry.resolve_key(key)?;
        decode_validated(schema, Frame::Serial { tokens: &tokens }, host_receipt_unix_sec)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one frame against a schema
///
/// The schema is validated first; registry schemas skip this through
/// [`Decoder`].
pub fn decode(
    schema: &VariantSchema,
    frame: Frame<'_>,
    host_receipt_unix_sec: u32,
) -> Result<DecodedReading> {
    schema.validate()?;
    decode_validated(schema, frame, host_receipt_unix_sec)
}

fn decode_validated(
    schema: &VariantSchema,
    frame: Frame<'_>,
    host_receipt_unix_sec: u32,
) -> Result<DecodedReading> {
    let source = frame.source();
    let layout = schema.layout(source);

    if frame.len() != layout.expected {
        return Err(DecodeError::LengthMismatch {
            alias: schema.alias,
            frame_source: source,
            expected: layout.expected,
            actual: frame.len(),
        }
        .into());
    }

    let mut reading = DecodedReading::new(schema.key, schema.alias, schema.device_type, source);

    match frame {
        Frame::Radio { payload, radio } => {
            let mut offset = 0;
            for slot in layout.slots {
                let width = slot.codec.byte_width();
                let bytes = payload.get(offset..offset + width).unwrap_or_default();
                let value = decode_bytes(slot.codec, bytes)
                    .map_err(|f| fault(schema, slot, bytes_repr(bytes), f))?;
                assign(&mut reading, schema, slot, value)?;
                offset += width;
            }
            reading.radio = radio;
        }
        Frame::Serial { tokens } => {
            let mut remaining = tokens.iter();
            for slot in layout.slots.iter().filter(|s| !s.codec.is_padding()) {
                // Count was checked against the layout above
                let Some(token) = remaining.next() else { break };
                let value = decode_token(slot.codec, token)
                    .map_err(|f| fault(schema, slot, token.to_string(), f))?;
                assign(&mut reading, schema, slot, value)?;
            }
        }
    }

    for derivation in layout.derivations {
        apply(&mut reading, derivation);
    }

    resolve_time(&mut reading, schema, host_receipt_unix_sec)?;

    log::trace!(
        "decoded {} serial={} source={} unix={}",
        schema.alias,
        reading.serial_number,
        source,
        reading.unix_sec
    );
    Ok(reading)
}

fn bytes_repr(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn fault(schema: &VariantSchema, slot: &FieldSlot, raw: String, fault: CodecFault) -> DecodeError {
    match fault {
        CodecFault::Conversion(reason) => DecodeError::FieldConversion {
            alias: schema.alias,
            field: slot.name(),
            raw,
            reason,
        },
        CodecFault::Arity { expected, actual } => DecodeError::CompositeArity {
            alias: schema.alias,
            field: slot.name(),
            expected,
            actual,
        },
    }
}

/// Write one extracted value into its reading field
fn assign(
    reading: &mut DecodedReading,
    schema: &VariantSchema,
    slot: &FieldSlot,
    value: RawValue,
) -> Result<()> {
    match (slot.field, value) {
        (Field::Padding, _) => {}
        (Field::SensorStates, RawValue::Unsigned(v)) => {
            reading.sensor_states = narrow(schema, slot, v)?
        }
        (Field::PoeUsbVoltage, RawValue::Unsigned(v)) => {
            reading.poe_usb_voltage = Some(narrow(schema, slot, v)?)
        }
        (Field::SerialNumber, RawValue::Unsigned(v)) => {
            reading.serial_number = narrow(schema, slot, v)?
        }
        (Field::SampleTimeMs, RawValue::Unsigned(v)) => reading.sample_time_ms = v,
        (Field::Co2, RawValue::Unsigned(v)) => reading.co2 = Some(narrow(schema, slot, v)?),
        (Field::VocIndex, RawValue::Unsigned(v)) => reading.voc_index = Some(v),
        (Field::Tvoc, RawValue::Signed(v)) => reading.tvoc = Some(v),
        (Field::GasBitmask, RawValue::Unsigned(v)) => {
            reading.gas.bitmask = Some(narrow(schema, slot, v)?)
        }
        (Field::Temperature(sensor), RawValue::Float(v)) => {
            reading.temp_rh_mut(sensor).temperature = v
        }
        (Field::Humidity(sensor), RawValue::Float(v)) => {
            reading.temp_rh_mut(sensor).humidity = v
        }
        (Field::Pressure, RawValue::Float(v)) => reading.pressure = Some(v),
        (Field::Gas(channel), RawValue::Float(v)) => reading.gas.set(channel, v),
        (Field::H2s, RawValue::Float(v)) => reading.h2s = Some(v),
        (Field::Tgs2611Rs, RawValue::Float(v)) => reading.tgs2611_rs = Some(v),
        (Field::Tgs2600Rs, RawValue::Float(v)) => reading.tgs2600_rs = Some(v),
        (Field::Latitude, RawValue::Float(v)) => reading.latitude = Some(v),
        (Field::Longitude, RawValue::Float(v)) => reading.longitude = Some(v),
        (Field::AirVelocity, RawValue::Float(v)) => reading.air_velocity = Some(v),
        (Field::GasValues, RawValue::Floats(v)) => reading.gas.raw = Some(v),
        (Field::ParticulateTop, RawValue::Counts(v)) => {
            reading.particulate.top = Some(Particulate::Counts(v))
        }
        (Field::ParticulateTop, RawValue::Floats(v)) => {
            reading.particulate.top = Some(Particulate::Concentrations(v))
        }
        (Field::ParticulateBottom, RawValue::Counts(v)) => {
            reading.particulate.bottom = Some(Particulate::Counts(v))
        }
        (Field::ParticulateBottom, RawValue::Floats(v)) => {
            reading.particulate.bottom = Some(Particulate::Concentrations(v))
        }
        (field, value) => {
            return Err(DecodeError::FieldConversion {
                alias: schema.alias,
                field: field.name(),
                raw: format!("{value:?}"),
                reason: format!("codec {} does not fit this field", slot.codec),
            }
            .into())
        }
    }
    Ok(())
}

fn narrow<T: TryFrom<u32>>(schema: &VariantSchema, slot: &FieldSlot, value: u32) -> Result<T> {
    T::try_from(value).map_err(|_| {
        DecodeError::FieldConversion {
            alias: schema.alias,
            field: slot.name(),
            raw: value.to_string(),
            reason: format!("out of range for {}", slot.codec),
        }
        .into()
    })
}

/// Run one derivation step; inputs are guaranteed by schema validation
fn apply(reading: &mut DecodedReading, derivation: &Derivation) {
    match *derivation {
        Derivation::MergeParticulate => {
            if let (Some(top), Some(bottom)) =
                (&reading.particulate.top, &reading.particulate.bottom)
            {
                reading.particulate.merged = derive::merge_particulate(top, bottom);
            }
        }
        Derivation::MirrorParticulate => {
            reading.particulate.bottom = reading.particulate.top;
            reading.particulate.merged = reading.particulate.top;
        }
        Derivation::CombineTempRh(a, b) => {
            if let (Some(a), Some(b)) = (reading.temp_rh(a), reading.temp_rh(b)) {
                reading.combined = Some(derive::average_temp_rh(&a, &b));
            }
        }
        Derivation::AdoptTempRh(sensor) => reading.combined = reading.temp_rh(sensor),
        Derivation::ExpandGas => {
            if let (Some(bitmask), Some(raw)) = (reading.gas.bitmask, reading.gas.raw.as_ref()) {
                reading.gas.channels = derive::expand_gas(bitmask, raw);
            }
        }
    }
}

fn resolve_time(
    reading: &mut DecodedReading,
    schema: &VariantSchema,
    host_receipt_unix_sec: u32,
) -> Result<()> {
    let send_ms = reading.radio.device_send_time_ms;
    let sample_ms = reading.sample_time_ms;
    let clock_error = |fault| DecodeError::Timestamp {
        alias: schema.alias,
        fault,
        host_receipt_unix_sec,
        device_send_time_ms: send_ms,
        device_sample_time_ms: sample_ms,
    };

    reading.unix_sec = match reading.source {
        FrameSource::SerialAscii => derive::resolve_serial_timestamp(host_receipt_unix_sec),
        FrameSource::RadioBinary => {
            derive::resolve_radio_timestamp(host_receipt_unix_sec, send_ms, sample_ms)
                .map_err(clock_error)?
        }
    };
    reading.last_reset_unix =
        derive::last_reset_unix(reading.unix_sec, sample_ms).map_err(clock_error)?;
    Ok(())
}
