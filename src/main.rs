//! Avbstream - Milan AVB/TSN stream demo
//!
//! Builds a redundant AAF pair plus a CRF clock stream, walks them
//! through the compliance-gated state machine and sends mirrored packets,
//! logging every step on the tracing diagnostics sink.

use anyhow::{anyhow, Result};
use avbstream::config::PairSetup;
use avbstream::{
    EntityId, MediaStream, MilanStreamConfig, PayloadKind, RedundancyRole, RedundantPair,
    StreamId, StreamRegistry,
};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("avbstream=info".parse()?),
        )
        .init();

    println!("Avbstream v{} - Milan AVB/TSN stream demo", avbstream::VERSION);
    println!();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut packets: Option<u32> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("avbstream {}", avbstream::VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    return Ok(());
                }
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
                continue;
            }
            "--packets" | "-n" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --packets requires a value");
                    return Ok(());
                }
                packets = args[i + 1].parse().ok();
                if packets.is_none() {
                    eprintln!("Error: Invalid packet count: {}", args[i + 1]);
                    return Ok(());
                }
                i += 2;
                continue;
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                return Ok(());
            }
        }
    }

    let mut setup = match config_path {
        Some(path) => PairSetup::load(&path),
        None => PairSetup::default(),
    };
    if let Some(n) = packets {
        setup.packets = n;
    }

    run_demo(&setup)
}

fn print_help() {
    println!("Usage: avbstream [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config PATH    Load stream setup from a JSON file");
    println!("  -n, --packets N      Number of packets to send (default: 8)");
    println!("  -v, --version        Show version");
    println!("  -h, --help           Show this help");
}

fn run_demo(setup: &PairSetup) -> Result<()> {
    let entity_id: EntityId = setup
        .entity_id()
        .map_err(|e| anyhow!("entity_id: {}", e))?;
    let primary_id: StreamId = setup
        .primary_stream_id()
        .map_err(|e| anyhow!("primary_stream_id: {}", e))?;
    let secondary_id: StreamId = setup
        .secondary_stream_id()
        .map_err(|e| anyhow!("secondary_stream_id: {}", e))?;

    println!("Entity:           {}", entity_id);
    println!("Primary stream:   {}", primary_id);
    println!("Secondary stream: {}", secondary_id);
    println!();

    let mut registry = StreamRegistry::new();
    let primary_key = registry.register(MilanStreamConfig::new(
        entity_id,
        primary_id,
        RedundancyRole::Primary,
    ));
    let secondary_key = registry.register(MilanStreamConfig::new(
        entity_id,
        secondary_id,
        RedundancyRole::Secondary,
    ));

    // Walk both members up to Connected.
    for key in [primary_key, secondary_key] {
        registry.enable(key)?;
        registry.connect(key)?;
    }

    let audio_kind = PayloadKind::Audio {
        sample_rate: avbstream::MILAN_SAMPLE_RATE,
        channels: avbstream::MILAN_CHANNELS as u16,
        bit_depth: avbstream::MILAN_BIT_DEPTH as u16,
    };

    let mut primary = MediaStream::new(1, audio_kind);
    primary.attach_buffer(vec![0; setup.buffer_size]);
    primary.bind_config(primary_key);

    let mut secondary = MediaStream::new(2, audio_kind);
    secondary.attach_buffer(vec![0; setup.buffer_size]);
    secondary.bind_config(secondary_key);

    let mut pair = RedundantPair::bind(&mut registry, primary, secondary)
        .map_err(|(_, _, e)| anyhow!("binding failed: {}", e))?;

    // Mirrored AAF transmission.
    let payload = vec![0xAA; 64.min(setup.buffer_size)];
    for _ in 0..setup.packets {
        pair.send_on_primary(&mut registry, &payload)?;
    }
    let mut received = vec![0u8; payload.len()];
    pair.receive_on_secondary(&mut registry, &mut received)?;

    // Standalone CRF clock stream on the same entity.
    let mut crf = MediaStream::new(
        3,
        PayloadKind::ClockRef {
            tick_frequency: setup.tick_frequency,
        },
    );
    crf.attach_buffer(vec![0; setup.buffer_size]);
    crf.send(&mut registry, &[0x01, 0x02, 0x03, 0x04])?;

    info!(
        packets = setup.packets,
        mirrored = received == payload,
        "demo transmission complete"
    );

    println!("Summary:");
    println!("────────────────────────────────────────");
    for (name, key) in [("primary", primary_key), ("secondary", secondary_key)] {
        let cfg = registry
            .config(key)
            .ok_or_else(|| anyhow!("stream vanished from registry"))?;
        println!(
            "  {:<9} {} | state: {:?} | sent: {} | received: {} | last error: {}",
            name,
            cfg.stream_id(),
            cfg.state(),
            cfg.packets_sent(),
            cfg.packets_received(),
            cfg.last_error()
        );
    }
    println!("  events recorded: {}", registry.events().len());

    Ok(())
}
