//! Synthetic traffic generator.
//!
//! Drop-in replacement for the live capture thread: it feeds the same
//! channel with the same event shape, so the aggregation side cannot tell
//! the difference. Useful for demos and for machines where opening a
//! capture device is not an option.

use crate::models::domain::{PacketEvent, Transport};
use chrono::Utc;
use crossbeam_channel::Sender;
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

const FAKE_CLIENT_COUNT: u8 = 5;

/// (uses TCP, service port) templates; the service port drives the label
/// the classifier will assign.
const SERVICES: [(bool, u16); 6] = [
    (true, 80),    // HTTP
    (true, 443),   // HTTPS
    (true, 21),    // FTP
    (true, 9100),  // plain TCP
    (false, 53),   // DNS
    (false, 9999), // plain UDP
];

/// Emit one tick of fake traffic per second until the running flag clears
/// or the receiving side goes away.
pub fn start_generator(monitored_ip: IpAddr, sender: Sender<PacketEvent>, running: Arc<AtomicBool>) {
    info!("synthetic traffic generator started ({} fake clients)", FAKE_CLIENT_COUNT);
    let mut rng = rand::thread_rng();
    while running.load(Ordering::SeqCst) {
        for event in generate_tick(monitored_ip, &mut rng) {
            if sender.send(event).is_err() {
                return;
            }
        }
        thread::sleep(Duration::from_secs(1));
    }
    info!("synthetic traffic generator stopped");
}

/// One second's worth of fake traffic: a request and a response packet for
/// each fake client, on a randomly chosen service.
fn generate_tick<R: Rng>(monitored_ip: IpAddr, rng: &mut R) -> Vec<PacketEvent> {
    let mut events = Vec::with_capacity(usize::from(FAKE_CLIENT_COUNT) * 2);
    for i in 1..=FAKE_CLIENT_COUNT {
        let client = IpAddr::V4(Ipv4Addr::new(192, 168, 0, i));
        let (is_tcp, service_port) = SERVICES[rng.gen_range(0..SERVICES.len())];
        let client_port: u16 = rng.gen_range(49152..=65535);

        let (inbound, outbound) = if is_tcp {
            (
                Transport::Tcp { src_port: client_port, dst_port: service_port },
                Transport::Tcp { src_port: service_port, dst_port: client_port },
            )
        } else {
            (
                Transport::Udp { src_port: client_port, dst_port: service_port },
                Transport::Udp { src_port: service_port, dst_port: client_port },
            )
        };

        events.push(PacketEvent {
            timestamp: Utc::now(),
            src: client,
            dst: monitored_ip,
            transport: inbound,
            total_bytes: rng.gen_range(10..=100),
        });
        events.push(PacketEvent {
            timestamp: Utc::now(),
            src: monitored_ip,
            dst: client,
            transport: outbound,
            total_bytes: rng.gen_range(5..=50),
        });
    }
    events
}
