// Duet Gateway - Basic Example
//
// This example demonstrates feeding serial and radio frames through the
// Duet Gateway and reading back projections and statistics.

use duet::{RadioMetadata, Registry};
use duet_gateway::{Gateway, GatewayConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Duet Gateway Basic Example ===\n");

    let config = GatewayConfig::with_serial("example-gw");
    println!(
        "Gateway '{}' created (max line {} bytes, max frame {} bytes)",
        config.gateway_serial, config.max_line_len, config.max_frame_size
    );

    let mut gateway = Gateway::with_config(config)?;
    let received = 1_700_000_000u32;

    // Serial lines from a Mk4.6 node (gas cells, no particulate counter)
    println!("\n--- Serial ingest ---");
    let lines = [
        "4 6 77 5000 21.5 22.5 41 43 998.5 120 700 5 1 3 [0.5,0.1,0,0,0,0,0,0,0]",
        "4 6 77 65000 21.7 22.4 41 44 998.4 118 705 5 1 3 [0.6,0.1,0,0,0,0,0,0,0]",
        "4 6 77 125000 21.6", // truncated by the link
    ];
    for line in lines {
        match gateway.ingest_line(line, received) {
            Ok(fields) => println!("  accepted: temp={} co={}", fields["temp"], fields["co"]),
            Err(e) => println!("  rejected: {e}"),
        }
    }

    // A radio frame from an unknown variant
    println!("\n--- Radio ingest ---");
    let radio = RadioMetadata::new(9, -101, 1, 7_000);
    if let Err(e) = gateway.ingest_radio(&[7, 1, 0, 0, 0], received, radio) {
        println!("  rejected: {e}");
    }

    let stats = gateway.stats();
    println!("\n--- Statistics ---");
    println!("  accepted: {}", stats.accepted);
    println!("  rejected: {}", stats.rejected);
    println!("  acceptance rate: {:.1}%", stats.acceptance_rate() * 100.0);
    for (variant, count) in &stats.by_variant {
        println!("  - {variant}: {count}");
    }
    for (kind, count) in &stats.by_error {
        println!("  - {kind}: {count}");
    }

    // Narrow the registry to the Mk4.6 schema only
    println!("\n--- Registry swap ---");
    let previous = gateway.publish_registry(Registry::new().with(duet::variants::MK4_6)?);
    println!("  replaced registry with {} variants", previous.len());

    println!("\n=== Example complete ===");
    Ok(())
}
