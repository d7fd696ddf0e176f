//! Output keys
//!
//! Every key the projector emits. Keys are shared by all variants so storage
//! needs no per-variant branching; several names are kept for compatibility
//! with the existing storage schema.

pub const DEVICE_TYPE: &str = "deviceType";
pub const SERIAL_NUMBER: &str = "serial_number";
pub const DEVICE_ID: &str = "device_id";
pub const GATEWAY_SERIAL: &str = "gateway_serial";
pub const UNIX: &str = "unix";
pub const LAST_RESET_TIME: &str = "lastResetTime";
pub const SENSOR_STATES: &str = "sensorStates";
pub const CONNECTION_TYPE: &str = "connection_type";
pub const POE_USB_VOLTAGE: &str = "poe_usb_voltage";

// Retired sensors, still expected as zero
pub const ECO2: &str = "eco2";
pub const RAWH2: &str = "rawh2";

pub const HTU_TEMP: &str = "temp_htu";
pub const HTU_HUM: &str = "hum_htu";
pub const SCD_TEMP: &str = "temp_scd";
pub const SCD_HUM: &str = "hum_scd";
pub const SI_TEMP: &str = "temp_si";
pub const SI_HUM: &str = "hum_si";
pub const TEMP: &str = "temp";
pub const HUM: &str = "hum";

pub const CO2: &str = "co2";
pub const CO2_LEGACY: &str = "rawethanol";
pub const TVOC: &str = "tvoc";
/// VOC index on variants where `tvoc` holds the SGP30 reading
pub const VOC_INDEX: &str = "voc_index";
pub const PRESSURE: &str = "pressure";

pub const GAS_CO: &str = "co";
pub const GAS_O3: &str = "o3";
pub const GAS_NH3: &str = "nh3";
pub const GAS_NO: &str = "no";
pub const GAS_NO2: &str = "no2";
pub const GAS_SO2: &str = "so2";
pub const GAS_CH2O: &str = "ch2o";
pub const GAS_VOC: &str = "voc";
pub const GAS_CH4: &str = "ch4";
pub const GAS_H2S: &str = "h2s";
pub const TGS2611_RS: &str = "tgs2611_rs";
pub const TGS2600_RS: &str = "tgs2600_rs";

/// Gas keys in bitmask order
pub const GAS_CHANNELS: [&str; 9] = [
    GAS_CO, GAS_O3, GAS_NH3, GAS_NO, GAS_NO2, GAS_SO2, GAS_CH2O, GAS_VOC, GAS_CH4,
];

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const AIR_VELOCITY: &str = "air_velocity";

pub const RSSI: &str = "lastRssi";
pub const SNR: &str = "lastSNR";
pub const HOPS: &str = "hops";

pub const PI_MCU_TEMP: &str = "pi_mcu_temp";

/// Particulate keys of the first counter (`_t`)
pub const PARTICULATE_TOP: [&str; 9] = [
    "pm10_t", "pm25_t", "pm100_t", "pn03_t", "pn05_t", "pn10_t", "pn25_t", "pn50_t", "pn100_t",
];

/// Particulate keys of the second counter (`_b`)
pub const PARTICULATE_BOTTOM: [&str; 9] = [
    "pm10_b", "pm25_b", "pm100_b", "pn03_b", "pn05_b", "pn10_b", "pn25_b", "pn50_b", "pn100_b",
];

/// Particulate keys of the merged counter (`_m`)
pub const PARTICULATE_MERGED: [&str; 9] = [
    "pm10_m", "pm25_m", "pm100_m", "pn03_m", "pn05_m", "pn10_m", "pn25_m", "pn50_m", "pn100_m",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particulate_keys_share_stems() {
        for i in 0..9 {
            let stem = PARTICULATE_TOP[i].trim_end_matches("_t");
            assert_eq!(PARTICULATE_BOTTOM[i], format!("{stem}_b"));
            assert_eq!(PARTICULATE_MERGED[i], format!("{stem}_m"));
        }
    }
}
