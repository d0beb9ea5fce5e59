// src/sniff.rs
use crate::models::domain::{PacketEvent, Transport};
use chrono::Utc;
use crossbeam_channel::Sender;
use etherparse::{NetHeaders, PacketHeaders, TransportHeader};
use pcap::{Active, Capture, Device};
use std::error::Error;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Capture loop entry point. Blocks until the running flag clears or the
/// capture source fails; meant for a dedicated thread.
pub fn start_sniffing(
    interface: Option<&str>,
    monitored_ip: IpAddr,
    sender: Sender<PacketEvent>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cap = create_capture(interface)?;
    configure_capture(&mut cap, monitored_ip)?;
    info!("capture started (filter: host {})", monitored_ip);

    process_packets(&mut cap, &sender, &running)
}

pub fn create_capture(interface: Option<&str>) -> Result<Capture<Active>, Box<dyn Error + Send + Sync>> {
    let device = match interface {
        Some(name) => Device::from(name),
        None => Device::lookup()?.ok_or("no capture device available")?,
    };

    let cap = Capture::from_device(device)?
        .promisc(false)  // Reduce permissions needed
        .snaplen(2048)   // Headers only; payloads are never inspected
        .timeout(500)    // Keeps the loop responsive to the stop signal
        .immediate_mode(true)
        .open()?;
    Ok(cap)
}

pub fn configure_capture(cap: &mut Capture<Active>, monitored_ip: IpAddr) -> Result<(), pcap::Error> {
    // Only traffic touching the monitored host ever reaches userspace
    cap.filter(&format!("host {}", monitored_ip), true)?;
    Ok(())
}

fn process_packets(
    cap: &mut Capture<Active>,
    sender: &Sender<PacketEvent>,
    running: &AtomicBool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    while running.load(Ordering::SeqCst) {
        match cap.next_packet() {
            Ok(packet) => {
                let total_bytes = u64::from(packet.header.len);
                if let Some(event) = parse_packet(packet.data, total_bytes) {
                    debug!("packet: {} -> {} ({} bytes)", event.src, event.dst, event.total_bytes);
                    if sender.send(event).is_err() {
                        // aggregator went away, nothing left to feed
                        break;
                    }
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(pcap::Error::NoMorePackets) => break,
            Err(e) => {
                warn!("capture read failed: {}", e);
                return Err(e.into());
            }
        }
    }
    info!("capture stopped");
    Ok(())
}

/// Parse an Ethernet frame into a packet event. Frames without an IP layer
/// (or too mangled to slice) yield `None` and are dropped silently.
pub fn parse_packet(data: &[u8], total_bytes: u64) -> Option<PacketEvent> {
    let headers = PacketHeaders::from_ethernet_slice(data).ok()?;

    let (src, dst) = match headers.net {
        Some(NetHeaders::Ipv4(ref ipv4, _)) => {
            (IpAddr::from(ipv4.source), IpAddr::from(ipv4.destination))
        }
        Some(NetHeaders::Ipv6(ref ipv6, _)) => {
            (IpAddr::from(ipv6.source), IpAddr::from(ipv6.destination))
        }
        _ => return None,
    };

    let transport = match headers.transport {
        Some(TransportHeader::Tcp(ref tcp)) => Transport::Tcp {
            src_port: tcp.source_port,
            dst_port: tcp.destination_port,
        },
        Some(TransportHeader::Udp(ref udp)) => Transport::Udp {
            src_port: udp.source_port,
            dst_port: udp.destination_port,
        },
        _ => Transport::Other,
    };

    Some(PacketEvent {
        timestamp: Utc::now(),
        src,
        dst,
        transport,
        total_bytes,
    })
}
