//! Variant schemas
//!
//! A [`VariantSchema`] declares everything the generic decoder needs to know
//! about one (hardware revision, sensor variant) pair: the ordered field
//! slots of each frame source, their declared total size and the derivation
//! steps to run once every slot is extracted. Supporting a new variant means
//! adding a schema, never new decode code.

use crate::codec::Codec;
use crate::error::RegistryError;
use crate::protocol::{FrameSource, VariantKey};
use crate::reading::{GasChannel, TempRhSensor};
use std::fmt;

/// Reading field a slot is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SensorStates,
    PoeUsbVoltage,
    SerialNumber,
    SampleTimeMs,
    Co2,
    VocIndex,
    Tvoc,
    Temperature(TempRhSensor),
    Humidity(TempRhSensor),
    Pressure,
    ParticulateTop,
    ParticulateBottom,
    GasBitmask,
    GasValues,
    Gas(GasChannel),
    H2s,
    Tgs2611Rs,
    Tgs2600Rs,
    Latitude,
    Longitude,
    AirVelocity,
    Padding,
}

impl Field {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Field::SensorStates => "sensor_states",
            Field::PoeUsbVoltage => "poe_usb_voltage",
            Field::SerialNumber => "serial_number",
            Field::SampleTimeMs => "sample_time_ms",
            Field::Co2 => "co2",
            Field::VocIndex => "voc_index",
            Field::Tvoc => "tvoc",
            Field::Temperature(TempRhSensor::Htu) => "htu_temperature",
            Field::Temperature(TempRhSensor::Scd) => "scd_temperature",
            Field::Temperature(TempRhSensor::Si) => "si_temperature",
            Field::Humidity(TempRhSensor::Htu) => "htu_humidity",
            Field::Humidity(TempRhSensor::Scd) => "scd_humidity",
            Field::Humidity(TempRhSensor::Si) => "si_humidity",
            Field::Pressure => "pressure",
            Field::ParticulateTop => "particulate_top",
            Field::ParticulateBottom => "particulate_bottom",
            Field::GasBitmask => "gas_bitmask",
            Field::GasValues => "gas_values",
            Field::Gas(GasChannel::Co) => "gas_co",
            Field::Gas(GasChannel::O3) => "gas_o3",
            Field::Gas(GasChannel::Nh3) => "gas_nh3",
            Field::Gas(GasChannel::No) => "gas_no",
            Field::Gas(GasChannel::No2) => "gas_no2",
            Field::Gas(GasChannel::So2) => "gas_so2",
            Field::Gas(GasChannel::Ch2o) => "gas_ch2o",
            Field::Gas(GasChannel::Voc) => "gas_voc",
            Field::Gas(GasChannel::Ch4) => "gas_ch4",
            Field::H2s => "h2s",
            Field::Tgs2611Rs => "tgs2611_rs",
            Field::Tgs2600Rs => "tgs2600_rs",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::AirVelocity => "air_velocity",
            Field::Padding => "padding",
        }
    }

    /// Whether a slot of this codec can fill the field
    pub fn accepts(&self, codec: Codec) -> bool {
        match self {
            Field::SensorStates | Field::PoeUsbVoltage => codec == Codec::U8,
            Field::SerialNumber | Field::Co2 | Field::GasBitmask => codec == Codec::U16,
            Field::SampleTimeMs | Field::VocIndex => codec == Codec::U32,
            Field::Tvoc => codec == Codec::I32,
            Field::Temperature(_)
            | Field::Humidity(_)
            | Field::Pressure
            | Field::Gas(_)
            | Field::H2s
            | Field::Tgs2611Rs
            | Field::Tgs2600Rs
            | Field::Latitude
            | Field::Longitude
            | Field::AirVelocity => codec == Codec::F32,
            Field::ParticulateTop | Field::ParticulateBottom => {
                matches!(codec, Codec::CountVector | Codec::FloatVector)
            }
            Field::GasValues => codec == Codec::FloatVector,
            Field::Padding => codec.is_padding(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One positional slot of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub field: Field,
    pub codec: Codec,
}

impl FieldSlot {
    pub const fn new(field: Field, codec: Codec) -> Self {
        Self { field, codec }
    }

    /// Slot name, for diagnostics
    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    /// Width in the unit of the given frame source
    pub fn width(&self, source: FrameSource) -> usize {
        self.codec.width(source)
    }
}

/// Post-extraction step, run in declared order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Reconcile the two particle counters into the merged one
    MergeParticulate,
    /// Publish the single particle counter under all three groups
    MirrorParticulate,
    /// Average two temperature/humidity sensors, in the order given
    CombineTempRh(TempRhSensor, TempRhSensor),
    /// Publish one sensor as the combined temperature/humidity
    AdoptTempRh(TempRhSensor),
    /// Gate the raw gas vector with the transmitted bitmask
    ExpandGas,
}

impl Derivation {
    pub fn name(&self) -> &'static str {
        match self {
            Derivation::MergeParticulate => "merge_particulate",
            Derivation::MirrorParticulate => "mirror_particulate",
            Derivation::CombineTempRh(..) => "combine_temp_rh",
            Derivation::AdoptTempRh(_) => "adopt_temp_rh",
            Derivation::ExpandGas => "expand_gas",
        }
    }

    /// Fields the step reads
    fn inputs(&self) -> Vec<Field> {
        match *self {
            Derivation::MergeParticulate => vec![Field::ParticulateTop, Field::ParticulateBottom],
            Derivation::MirrorParticulate => vec![Field::ParticulateTop],
            Derivation::CombineTempRh(a, b) => vec![
                Field::Temperature(a),
                Field::Humidity(a),
                Field::Temperature(b),
                Field::Humidity(b),
            ],
            Derivation::AdoptTempRh(s) => vec![Field::Temperature(s), Field::Humidity(s)],
            Derivation::ExpandGas => vec![Field::GasBitmask, Field::GasValues],
        }
    }
}

/// Ordered slots and derivations for one frame source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Declared payload size, in bytes or tokens, header excluded
    pub expected: usize,
    pub slots: &'static [FieldSlot],
    pub derivations: &'static [Derivation],
}

impl Layout {
    /// Sum of slot widths
    pub fn total_width(&self, source: FrameSource) -> usize {
        self.slots.iter().map(|s| s.width(source)).sum()
    }

    /// Whether any slot fills the field
    pub fn fills(&self, field: Field) -> bool {
        self.slots.iter().any(|s| s.field == field)
    }

    /// Codec of the first slot filling the field
    pub fn codec_of(&self, field: Field) -> Option<Codec> {
        self.slots.iter().find(|s| s.field == field).map(|s| s.codec)
    }
}

/// Declarative descriptor of one frame variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantSchema {
    pub key: VariantKey,
    /// Human-readable name, e.g. `Mk4.13`
    pub alias: &'static str,
    /// Numeric tag published as `deviceType`
    pub device_type: f64,
    pub radio: Layout,
    pub serial: Layout,
}

impl VariantSchema {
    /// Layout for the given frame source
    pub fn layout(&self, source: FrameSource) -> &Layout {
        match source {
            FrameSource::RadioBinary => &self.radio,
            FrameSource::SerialAscii => &self.serial,
        }
    }

    /// Declared radio payload size
    pub fn expected_bytes(&self) -> usize {
        self.radio.expected
    }

    /// Declared serial payload token count
    pub fn expected_tokens(&self) -> usize {
        self.serial.expected
    }

    /// Check the schema's internal consistency
    ///
    /// Widths must add up to the declared sizes exactly, every slot's codec
    /// must fit its field, and every derivation input must be filled.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for source in [FrameSource::RadioBinary, FrameSource::SerialAscii] {
            let layout = self.layout(source);

            let actual = layout.total_width(source);
            if actual != layout.expected {
                return Err(RegistryError::LayoutSizeMismatch {
                    alias: self.alias,
                    frame_source: source,
                    declared: layout.expected,
                    actual,
                });
            }

            for slot in layout.slots {
                let padding_in_serial =
                    source == FrameSource::SerialAscii && slot.codec.is_padding();
                if !slot.field.accepts(slot.codec) || padding_in_serial {
                    return Err(RegistryError::IncompatibleCodec {
                        alias: self.alias,
                        frame_source: source,
                        field: slot.name(),
                        codec: slot.codec.to_string(),
                    });
                }
            }

            for derivation in layout.derivations {
                if let Some(missing) = derivation.inputs().into_iter().find(|f| !layout.fills(*f)) {
                    return Err(RegistryError::MissingDerivationInput {
                        alias: self.alias,
                        frame_source: source,
                        derivation: derivation.name(),
                        field: missing.name(),
                    });
                }

                // Counts merge with counts, concentrations with concentrations
                let top = layout.codec_of(Field::ParticulateTop);
                let bottom = layout.codec_of(Field::ParticulateBottom);
                if *derivation == Derivation::MergeParticulate && top != bottom {
                    return Err(RegistryError::MismatchedDerivationInputs {
                        alias: self.alias,
                        frame_source: source,
                        derivation: derivation.name(),
                    });
                }
            }
        }
        Ok(())
    }
}
