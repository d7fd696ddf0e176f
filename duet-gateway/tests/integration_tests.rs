// Duet Gateway - Integration Tests
//
// The tests are organized into categories:
// 1. Serial ingest
// 2. Radio ingest
// 3. Link limits and source filtering
// 4. Registry publishing
// 5. JSON export

use approx::assert_relative_eq;
use duet::variants::{MK4_0, MK4_6};
use duet::{RadioMetadata, Registry, Value};
use duet_gateway::{Gateway, GatewayConfig, GatewayError, IngestStats, RegistryHandle};
use std::thread;

const RECEIVED: u32 = 1_700_000_000;
const MK4_6_LINE: &str = "4 6 77 5000 21.5 22.5 41 43 998.5 120 700 5 1 3 [0.5,0.1,0,0,0,0,0,0,0]";

/// Mk4.0 radio frame, version bytes included
fn mk4_0_frame(serial_number: u16) -> Vec<u8> {
    let mut frame = vec![4, 0, 0b11, 5];
    frame.extend_from_slice(&serial_number.to_le_bytes());
    frame.extend_from_slice(&612u16.to_le_bytes());
    frame.extend_from_slice(&101u32.to_le_bytes());
    frame.extend_from_slice(&4_000u32.to_le_bytes());
    for v in [20.0f32, 22.0, 40.0, 50.0, 1013.25] {
        frame.extend_from_slice(&v.to_le_bytes());
    }
    for v in [10u16, 20, 30, 40, 50, 60, 70, 80, 90, 12, 22, 28, 44, 0, 60, 75, 85, 95] {
        frame.extend_from_slice(&v.to_le_bytes());
    }
    frame
}

fn radio() -> RadioMetadata {
    RadioMetadata::new(6, -98, 1, 6_500)
}

fn gateway() -> Gateway {
    Gateway::with_config(GatewayConfig::with_serial("gw-int")).unwrap()
}

// ============================================================================
// Serial Ingest
// ============================================================================

#[test]
fn test_ingest_serial_line() {
    let mut gw = gateway();
    let fields = gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap();

    assert_eq!(fields["gateway_serial"], Value::from("gw-int"));
    assert_eq!(fields["serial_number"], Value::Int(77));
    assert_eq!(fields["unix"], Value::Int(i64::from(RECEIVED)));
    assert_relative_eq!(fields["hum"].as_float().unwrap(), 42.0);
    assert!(!fields.contains_key("lastRssi"));
}

#[test]
fn test_decode_line_allows_enrichment() {
    let mut gw = gateway();
    let mut reading = gw.decode_line(MK4_6_LINE, RECEIVED).unwrap();
    reading.set_aux_mcu_temp(48.5);
    assert_eq!(gw.project(&reading)["pi_mcu_temp"], Value::Float(48.5));
}

#[test]
fn test_rejections_counted_by_kind() {
    let mut gw = gateway();
    let _ = gw.ingest_line("4 6 77", RECEIVED);
    let _ = gw.ingest_line("x y", RECEIVED);
    let _ = gw.ingest_line("2 2 1 2 3", RECEIVED);
    let _ = gw.ingest_line(&MK4_6_LINE.replace("700", "7e2"), RECEIVED);

    let stats = gw.stats();
    assert_eq!(stats.rejected, 4);
    assert_eq!(stats.by_error["length_mismatch"], 1);
    assert_eq!(stats.by_error["malformed_header"], 1);
    assert_eq!(stats.by_error["unknown_variant"], 1);
    assert_eq!(stats.by_error["field_conversion"], 1);
    assert_eq!(stats.acceptance_rate(), 0.0);
}

// ============================================================================
// Radio Ingest
// ============================================================================

#[test]
fn test_ingest_radio_frame() {
    let mut gw = gateway();
    let fields = gw.ingest_radio(&mk4_0_frame(901), RECEIVED, radio()).unwrap();

    assert_eq!(fields["serial_number"], Value::Int(901));
    // 2.5 s in transit, floored
    assert_eq!(fields["unix"], Value::Int(i64::from(RECEIVED) - 2));
    assert_eq!(fields["lastRssi"], Value::Int(-98));
    assert_eq!(fields["pm10_m"], Value::Int(11));
    assert_eq!(fields["pn05_m"], Value::Int(0));
    assert_eq!(gw.stats().by_variant["Mk4.0"], 1);
}

#[test]
fn test_radio_clock_fault_rejected() {
    let mut gw = gateway();
    let early = RadioMetadata::new(6, -98, 1, 1_000);
    let err = gw.ingest_radio(&mk4_0_frame(1), RECEIVED, early).unwrap_err();
    assert_eq!(err.kind(), "timestamp");
}

#[test]
fn test_mixed_sources() {
    let mut gw = gateway();
    for i in 0..10u16 {
        gw.ingest_radio(&mk4_0_frame(i), RECEIVED, radio()).unwrap();
        gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap();
    }
    let stats = gw.stats();
    assert_eq!(stats.accepted, 20);
    assert_eq!(stats.by_variant["Mk4.0"], 10);
    assert_eq!(stats.by_variant["Mk4.6"], 10);
}

// ============================================================================
// Link Limits and Source Filtering
// ============================================================================

#[test]
fn test_line_too_long() {
    let config = GatewayConfig {
        max_line_len: 32,
        ..GatewayConfig::with_serial("gw")
    };
    let mut gw = Gateway::with_config(config).unwrap();
    let err = gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap_err();
    assert!(matches!(err, GatewayError::LineTooLong { max: 32, .. }));
    assert_eq!(gw.stats().by_error["line_too_long"], 1);
}

#[test]
fn test_frame_too_large() {
    let mut gw = gateway();
    let err = gw.ingest_radio(&[4u8; 300], RECEIVED, radio()).unwrap_err();
    assert_eq!(err, GatewayError::FrameTooLarge { size: 300, max: 255 });
}

#[test]
fn test_disabled_source() {
    let mut gw = Gateway::with_config(GatewayConfig::radio_only("gw")).unwrap();
    let err = gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap_err();
    assert!(matches!(err, GatewayError::SourceDisabled(_)));
    assert!(gw.ingest_radio(&mk4_0_frame(3), RECEIVED, radio()).is_ok());
}

// ============================================================================
// Registry Publishing
// ============================================================================

#[test]
fn test_publish_registry_narrows_variants() {
    let mut gw = gateway();
    gw.publish_registry(Registry::new().with(MK4_6).unwrap());

    assert!(gw.ingest_line(MK4_6_LINE, RECEIVED).is_ok());
    let err = gw.ingest_radio(&mk4_0_frame(1), RECEIVED, radio()).unwrap_err();
    assert_eq!(err.kind(), "unknown_variant");
}

#[test]
fn test_publish_from_another_thread() {
    let handle = RegistryHandle::default();
    let mut gw = Gateway::with_registry(GatewayConfig::default(), handle.clone()).unwrap();
    assert!(gw.ingest_radio(&mk4_0_frame(1), RECEIVED, radio()).is_ok());

    thread::spawn(move || {
        handle.publish(Registry::new().with(MK4_6).unwrap());
    })
    .join()
    .unwrap();

    assert!(gw.ingest_radio(&mk4_0_frame(1), RECEIVED, radio()).is_err());
    let restored = gw.registry_handle();
    restored.publish(Registry::new().with(MK4_0).unwrap());
    assert!(gw.ingest_radio(&mk4_0_frame(1), RECEIVED, radio()).is_ok());
}

#[test]
fn test_reset_stats_returns_counters() {
    let mut gw = gateway();
    gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap();
    let old = gw.reset_stats();
    assert_eq!(old.accepted, 1);
    assert_eq!(*gw.stats(), IngestStats::new());
}

// ============================================================================
// JSON Export
// ============================================================================

#[cfg(feature = "json")]
#[test]
fn test_json_line_output() {
    let mut gw = gateway();
    let fields = gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap();
    let line = duet_gateway::to_json_line(&fields);
    let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed["serial_number"], 77);
    assert_eq!(parsed["gateway_serial"], "gw-int");
    assert!(!line.contains('\n'));
}

#[cfg(feature = "json")]
#[test]
fn test_stats_serialize() {
    let mut gw = gateway();
    gw.ingest_line(MK4_6_LINE, RECEIVED).unwrap();
    let json = serde_json::to_value(gw.stats()).unwrap();
    assert_eq!(json["accepted"], 1);
    assert_eq!(json["by_variant"]["Mk4.6"], 1);
}
