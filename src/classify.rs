use crate::models::domain::{ClassifiedPacket, Direction, PacketEvent, ProtocolLabel, Transport};
use std::net::IpAddr;

/// Well-known service ports and the labels they map to.
const WELL_KNOWN_PORTS: [(u16, ProtocolLabel); 6] = [
    (80, ProtocolLabel::Http),
    (443, ProtocolLabel::Https),
    (21, ProtocolLabel::Ftp),
    (25, ProtocolLabel::Smtp),
    (22, ProtocolLabel::Ssh),
    (53, ProtocolLabel::Dns),
];

fn service_label(port: u16) -> Option<ProtocolLabel> {
    WELL_KNOWN_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, label)| *label)
}

/// Classify a packet relative to the monitored address.
///
/// Only traffic with the monitored host as exactly one endpoint qualifies:
/// self-traffic and packets between two other hosts are dropped here, before
/// they ever reach the window store.
pub fn classify(event: &PacketEvent, monitored_ip: IpAddr) -> Option<ClassifiedPacket> {
    let (direction, client) = if event.src == monitored_ip && event.dst != monitored_ip {
        (Direction::Out, event.dst)
    } else if event.dst == monitored_ip && event.src != monitored_ip {
        (Direction::In, event.src)
    } else {
        return None;
    };

    Some(ClassifiedPacket {
        client,
        direction,
        protocol: protocol_label(&event.transport),
        bytes: event.total_bytes,
    })
}

/// Label precedence: destination port first, then source port (responses
/// from a well-known service keep its label), then the bare transport name.
/// Packets with no recognized transport fall back to the IP layer.
fn protocol_label(transport: &Transport) -> ProtocolLabel {
    match *transport {
        Transport::Tcp { src_port, dst_port } => service_label(dst_port)
            .or_else(|| service_label(src_port))
            .unwrap_or(ProtocolLabel::Tcp),
        Transport::Udp { src_port, dst_port } => service_label(dst_port)
            .or_else(|| service_label(src_port))
            .unwrap_or(ProtocolLabel::Udp),
        Transport::Other => ProtocolLabel::Ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const MONITORED: &str = "10.0.0.1";

    fn event(src: &str, dst: &str, transport: Transport, total_bytes: u64) -> PacketEvent {
        PacketEvent {
            timestamp: Utc::now(),
            src: src.parse().unwrap(),
            dst: dst.parse().unwrap(),
            transport,
            total_bytes,
        }
    }

    fn monitored() -> IpAddr {
        MONITORED.parse().unwrap()
    }

    #[test]
    fn test_inbound_direction_and_client() {
        let e = event(
            "10.0.0.5",
            MONITORED,
            Transport::Tcp { src_port: 40000, dst_port: 80 },
            100,
        );
        let c = classify(&e, monitored()).unwrap();
        assert_eq!(c.direction, Direction::In);
        assert_eq!(c.client, "10.0.0.5".parse::<IpAddr>().unwrap());
        assert_eq!(c.bytes, 100);
    }

    #[test]
    fn test_outbound_direction_and_client() {
        let e = event(
            MONITORED,
            "10.0.0.5",
            Transport::Tcp { src_port: 80, dst_port: 40000 },
            200,
        );
        let c = classify(&e, monitored()).unwrap();
        assert_eq!(c.direction, Direction::Out);
        assert_eq!(c.client, "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_unrelated_traffic_is_ignored() {
        let e = event(
            "10.0.0.5",
            "10.0.0.7",
            Transport::Tcp { src_port: 40000, dst_port: 80 },
            100,
        );
        assert!(classify(&e, monitored()).is_none());
    }

    #[test]
    fn test_self_traffic_is_ignored() {
        let e = event(
            MONITORED,
            MONITORED,
            Transport::Udp { src_port: 53, dst_port: 53 },
            100,
        );
        assert!(classify(&e, monitored()).is_none());
    }

    #[test]
    fn test_destination_port_wins_over_source_port() {
        let e = event(
            "10.0.0.5",
            MONITORED,
            Transport::Tcp { src_port: 53, dst_port: 80 },
            100,
        );
        let c = classify(&e, monitored()).unwrap();
        assert_eq!(c.protocol, ProtocolLabel::Http);
    }

    #[test]
    fn test_source_port_used_when_destination_unmapped() {
        let e = event(
            "10.0.0.5",
            MONITORED,
            Transport::Udp { src_port: 53, dst_port: 61234 },
            100,
        );
        let c = classify(&e, monitored()).unwrap();
        assert_eq!(c.protocol, ProtocolLabel::Dns);
    }

    #[test]
    fn test_http_response_keeps_service_label() {
        let e = event(
            MONITORED,
            "10.0.0.5",
            Transport::Tcp { src_port: 80, dst_port: 40000 },
            200,
        );
        let c = classify(&e, monitored()).unwrap();
        assert_eq!(c.protocol, ProtocolLabel::Http);
    }

    #[test]
    fn test_unmapped_ports_fall_back_to_transport() {
        let tcp = event(
            "10.0.0.5",
            MONITORED,
            Transport::Tcp { src_port: 40000, dst_port: 9100 },
            10,
        );
        let udp = event(
            "10.0.0.5",
            MONITORED,
            Transport::Udp { src_port: 40000, dst_port: 9999 },
            10,
        );
        assert_eq!(classify(&tcp, monitored()).unwrap().protocol, ProtocolLabel::Tcp);
        assert_eq!(classify(&udp, monitored()).unwrap().protocol, ProtocolLabel::Udp);
    }

    #[test]
    fn test_no_transport_falls_back_to_ip() {
        let e = event("10.0.0.5", MONITORED, Transport::Other, 60);
        assert_eq!(classify(&e, monitored()).unwrap().protocol, ProtocolLabel::Ip);
    }
}
