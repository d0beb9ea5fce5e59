//! Prints the first packets seen on the capture interface, for verifying
//! that the device and BPF filter are right before running the monitor.

use clap::Parser;
use hostwatch::config::{Cli, Config};
use hostwatch::sniff;

const PROBE_PACKETS: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let config = Config::resolve(Cli::parse())?;

    println!(
        "probing interface {} (filter: host {})",
        config.interface.as_deref().unwrap_or("<auto>"),
        config.monitored_ip
    );

    let mut cap = sniff::create_capture(config.interface.as_deref())?;
    sniff::configure_capture(&mut cap, config.monitored_ip)?;

    let mut seen = 0;
    while seen < PROBE_PACKETS {
        match cap.next_packet() {
            Ok(packet) => {
                match sniff::parse_packet(packet.data, u64::from(packet.header.len)) {
                    Some(event) => println!(
                        "packet: {} -> {} ({} bytes, {:?})",
                        event.src, event.dst, event.total_bytes, event.transport
                    ),
                    None => println!("non-IP packet"),
                }
                seen += 1;
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    println!("probe complete");
    Ok(())
}
