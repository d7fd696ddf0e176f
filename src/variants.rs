//! Built-in variant schemas
//!
//! One [`VariantSchema`] per deployed firmware variant. Radio layouts follow
//! the firmware's packed structs, including the trailing alignment bytes; serial
//! layouts follow the firmware's print order, which differs from the struct
//! order on every variant.

use crate::codec::Codec::{self, CountVector, FloatVector, Pad, F32, I32, U16, U32, U8};
use crate::protocol::VariantKey;
use crate::reading::GasChannel;
use crate::reading::TempRhSensor::{Htu, Scd, Si};
use crate::schema::Derivation::{
    AdoptTempRh, CombineTempRh, ExpandGas, MergeParticulate, MirrorParticulate,
};
use crate::schema::{Field, FieldSlot, Layout, VariantSchema};

const fn slot(field: Field, codec: Codec) -> FieldSlot {
    FieldSlot::new(field, codec)
}

const STATES: FieldSlot = slot(Field::SensorStates, U8);
const POE: FieldSlot = slot(Field::PoeUsbVoltage, U8);
const SN: FieldSlot = slot(Field::SerialNumber, U16);
const SAMPLE: FieldSlot = slot(Field::SampleTimeMs, U32);
const CO2: FieldSlot = slot(Field::Co2, U16);
const VOC: FieldSlot = slot(Field::VocIndex, U32);
const TVOC: FieldSlot = slot(Field::Tvoc, I32);
const PRESSURE: FieldSlot = slot(Field::Pressure, F32);

const HTU_T: FieldSlot = slot(Field::Temperature(Htu), F32);
const HTU_H: FieldSlot = slot(Field::Humidity(Htu), F32);
const SCD_T: FieldSlot = slot(Field::Temperature(Scd), F32);
const SCD_H: FieldSlot = slot(Field::Humidity(Scd), F32);
const SI_T: FieldSlot = slot(Field::Temperature(Si), F32);
const SI_H: FieldSlot = slot(Field::Humidity(Si), F32);

// PMS5003 pairs and the single SPS30 share the same slots
const PM_TOP: FieldSlot = slot(Field::ParticulateTop, CountVector);
const PM_BOTTOM: FieldSlot = slot(Field::ParticulateBottom, CountVector);
const PM_TOP_FLOAT: FieldSlot = slot(Field::ParticulateTop, FloatVector);

const GAS: FieldSlot = slot(Field::GasValues, FloatVector);
const GAS_MASK: FieldSlot = slot(Field::GasBitmask, U16);
const GAS_CO: FieldSlot = slot(Field::Gas(GasChannel::Co), F32);
const GAS_NO: FieldSlot = slot(Field::Gas(GasChannel::No), F32);
const GAS_NO2: FieldSlot = slot(Field::Gas(GasChannel::No2), F32);
const GAS_CH2O: FieldSlot = slot(Field::Gas(GasChannel::Ch2o), F32);
const H2S: FieldSlot = slot(Field::H2s, F32);
const TGS2611: FieldSlot = slot(Field::Tgs2611Rs, F32);
const TGS2600: FieldSlot = slot(Field::Tgs2600Rs, F32);

const LAT: FieldSlot = slot(Field::Latitude, F32);
const LON: FieldSlot = slot(Field::Longitude, F32);
const FLOW: FieldSlot = slot(Field::AirVelocity, F32);

const PAD1: FieldSlot = slot(Field::Padding, Pad(1));
const PAD2: FieldSlot = slot(Field::Padding, Pad(2));

/// Mk1.0: two PMS5003, Si7021, Plantower CO2
pub const MK1_0: VariantSchema = VariantSchema {
    key: VariantKey::new(1, 0),
    alias: "Mk1.0",
    device_type: 1.0,
    radio: Layout {
        expected: 64,
        slots: &[
            STATES, PAD1, SN, CO2, VOC, SAMPLE, SI_T, SI_H, PRESSURE, PM_TOP, PM_BOTTOM, PAD2,
        ],
        derivations: &[MergeParticulate, AdoptTempRh(Si)],
    },
    serial: Layout {
        expected: 10,
        slots: &[
            SN, SAMPLE, PM_TOP, PM_BOTTOM, SI_T, SI_H, PRESSURE, VOC, CO2, STATES,
        ],
        derivations: &[MergeParticulate, AdoptTempRh(Si)],
    },
};

/// Mk1.2: SPS30, Si7021
pub const MK1_2: VariantSchema = VariantSchema {
    key: VariantKey::new(1, 2),
    alias: "Mk1.2",
    device_type: 1.2,
    radio: Layout {
        expected: 44,
        slots: &[
            STATES, PAD1, SN, VOC, SAMPLE, SI_T, SI_H, PRESSURE, PM_TOP, PAD2,
        ],
        derivations: &[MirrorParticulate],
    },
    serial: Layout {
        expected: 8,
        slots: &[SN, SAMPLE, PM_TOP, SI_T, SI_H, PRESSURE, VOC, STATES],
        derivations: &[MirrorParticulate],
    },
};

/// Mk1.3: SPS30, Si7021, SCD41, SGP30 and SGP40
pub const MK1_3: VariantSchema = VariantSchema {
    key: VariantKey::new(1, 3),
    alias: "Mk1.3",
    device_type: 1.3,
    radio: Layout {
        expected: 58,
        slots: &[
            STATES, PAD1, SN, CO2, TVOC, VOC, SAMPLE, SI_T, SCD_T, SI_H, SCD_H, PRESSURE, PM_TOP,
            PAD2,
        ],
        derivations: &[MirrorParticulate],
    },
    serial: Layout {
        expected: 12,
        slots: &[
            SN, SAMPLE, PM_TOP, SI_T, SCD_T, SI_H, SCD_H, PRESSURE, TVOC, VOC, CO2, STATES,
        ],
        derivations: &[MirrorParticulate],
    },
};

/// Mk3.1: SPS30, HTU21D, SCD41
pub const MK3_1: VariantSchema = VariantSchema {
    key: VariantKey::new(3, 1),
    alias: "Mk3.1",
    device_type: 3.1,
    radio: Layout {
        expected: 54,
        slots: &[
            STATES, PAD1, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, PM_TOP, PAD2,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
    serial: Layout {
        expected: 11,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, STATES,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
};

/// Mk4.0: two PMS5003
pub const MK4_0: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 0),
    alias: "Mk4.0",
    device_type: 4.0,
    radio: Layout {
        expected: 70,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, PM_TOP,
            PM_BOTTOM,
        ],
        derivations: &[MergeParticulate, CombineTempRh(Htu, Scd)],
    },
    serial: Layout {
        expected: 13,
        slots: &[
            SN, SAMPLE, PM_TOP, PM_BOTTOM, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE,
            STATES,
        ],
        derivations: &[MergeParticulate, CombineTempRh(Htu, Scd)],
    },
};

/// Mk4.3: SPS30 and the gas board
pub const MK4_3: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 3),
    alias: "Mk4.3",
    device_type: 4.3,
    radio: Layout {
        expected: 90,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, GAS, GAS_MASK,
            PM_TOP,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
    serial: Layout {
        expected: 14,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, STATES,
            GAS_MASK, GAS,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
};

/// Mk4.4: two PMS5003 and the gas board
pub const MK4_4: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 4),
    alias: "Mk4.4",
    device_type: 4.4,
    radio: Layout {
        expected: 108,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, GAS, GAS_MASK,
            PM_TOP, PM_BOTTOM,
        ],
        derivations: &[MergeParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
    serial: Layout {
        expected: 15,
        slots: &[
            SN, SAMPLE, PM_TOP, PM_BOTTOM, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE,
            STATES, GAS_MASK, GAS,
        ],
        derivations: &[MergeParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
};

/// Mk4.5: two SPS30 and the gas board
///
/// The serial firmware prints only the first SPS30, so serial readings carry
/// no bottom or merged counts.
pub const MK4_5: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 5),
    alias: "Mk4.5",
    device_type: 4.5,
    radio: Layout {
        expected: 108,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, GAS, GAS_MASK,
            PM_TOP, PM_BOTTOM,
        ],
        derivations: &[MergeParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
    serial: Layout {
        expected: 14,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, STATES,
            GAS_MASK, GAS,
        ],
        derivations: &[CombineTempRh(Htu, Scd), ExpandGas],
    },
};

/// Mk4.6: gas board, no particle counter
pub const MK4_6: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 6),
    alias: "Mk4.6",
    device_type: 4.6,
    radio: Layout {
        expected: 72,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, GAS, GAS_MASK,
        ],
        derivations: &[CombineTempRh(Htu, Scd), ExpandGas],
    },
    serial: Layout {
        expected: 13,
        slots: &[
            SN, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, STATES, GAS_MASK, GAS,
        ],
        derivations: &[CombineTempRh(Htu, Scd), ExpandGas],
    },
};

/// Mk4.8: SPS30 float firmware and the gas board
pub const MK4_8: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 8),
    alias: "Mk4.8",
    device_type: 4.8,
    radio: Layout {
        expected: 108,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, PM_TOP_FLOAT,
            GAS, GAS_MASK,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
    serial: Layout {
        expected: 14,
        slots: &[
            SN, SAMPLE, PM_TOP_FLOAT, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, STATES,
            GAS_MASK, GAS,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd), ExpandGas],
    },
};

/// Mk4.12: SPS30 with GPS position
pub const MK4_12: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 12),
    alias: "Mk4.12",
    device_type: 4.12,
    radio: Layout {
        expected: 60,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, LAT, LON,
            PM_TOP,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
    serial: Layout {
        expected: 14,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, LAT, LON,
            STATES,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
};

/// Mk4.13: SPS30, electrochemical gas cells and TGS heated-metal-oxide cells
pub const MK4_13: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 13),
    alias: "Mk4.13",
    device_type: 4.13,
    radio: Layout {
        expected: 82,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, GAS_CO,
            GAS_NO, GAS_NO2, GAS_CH2O, H2S, TGS2611, TGS2600, PM_TOP, PAD2,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
    serial: Layout {
        expected: 19,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, GAS_CO,
            GAS_NO, GAS_NO2, GAS_CH2O, H2S, TGS2611, TGS2600, STATES,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
};

/// Mk4.16: SPS30 with FS3000 air velocity
///
/// The radio firmware combines SCD before HTU; the order is kept as shipped.
pub const MK4_16: VariantSchema = VariantSchema {
    key: VariantKey::new(4, 16),
    alias: "Mk4.16",
    device_type: 4.16,
    radio: Layout {
        expected: 58,
        slots: &[
            STATES, POE, SN, CO2, VOC, SAMPLE, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, FLOW, PM_TOP,
            PAD2,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Scd, Htu)],
    },
    serial: Layout {
        expected: 13,
        slots: &[
            SN, SAMPLE, PM_TOP, HTU_T, SCD_T, HTU_H, SCD_H, PRESSURE, VOC, CO2, POE, FLOW, STATES,
        ],
        derivations: &[MirrorParticulate, CombineTempRh(Htu, Scd)],
    },
};

/// Every built-in schema, in key order
pub const BUILTIN: &[VariantSchema] = &[
    MK1_0, MK1_2, MK1_3, MK3_1, MK4_0, MK4_3, MK4_4, MK4_5, MK4_6, MK4_8, MK4_12, MK4_13, MK4_16,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameSource;

    #[test]
    fn test_builtin_schemas_validate() {
        for schema in BUILTIN {
            assert_eq!(schema.validate(), Ok(()), "{}", schema.alias);
        }
    }

    #[test]
    fn test_alias_matches_key() {
        for schema in BUILTIN {
            assert_eq!(schema.alias, schema.key.to_string());
        }
    }

    #[test]
    fn test_builtin_sizes() {
        let sizes: Vec<_> = BUILTIN
            .iter()
            .map(|s| (s.alias, s.expected_bytes(), s.expected_tokens()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("Mk1.0", 64, 10),
                ("Mk1.2", 44, 8),
                ("Mk1.3", 58, 12),
                ("Mk3.1", 54, 11),
                ("Mk4.0", 70, 13),
                ("Mk4.3", 90, 14),
                ("Mk4.4", 108, 15),
                ("Mk4.5", 108, 14),
                ("Mk4.6", 72, 13),
                ("Mk4.8", 108, 14),
                ("Mk4.12", 60, 14),
                ("Mk4.13", 82, 19),
                ("Mk4.16", 58, 13),
            ]
        );
    }

    #[test]
    fn test_builtin_sorted_by_key() {
        assert!(BUILTIN.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn test_only_mk4_reports_poe_voltage() {
        for schema in BUILTIN {
            for source in [FrameSource::RadioBinary, FrameSource::SerialAscii] {
                assert_eq!(
                    schema.layout(source).fills(Field::PoeUsbVoltage),
                    schema.key.hw_version == 4,
                    "{} {}",
                    schema.alias,
                    source
                );
            }
        }
    }
}
