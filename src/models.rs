pub mod domain {
    use chrono::{DateTime, Utc};
    use std::net::IpAddr;

    /// A single observed packet, as delivered by the capture collaborator.
    /// The aggregation core never mutates these.
    #[derive(Debug, Clone)]
    pub struct PacketEvent {
        pub timestamp: DateTime<Utc>,
        pub src: IpAddr,
        pub dst: IpAddr,
        pub transport: Transport,
        pub total_bytes: u64,
    }

    /// Transport layer of an observed packet, with ports when present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Transport {
        Tcp { src_port: u16, dst_port: u16 },
        Udp { src_port: u16, dst_port: u16 },
        Other,
    }

    /// Traffic direction relative to the monitored host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Direction {
        /// client -> monitored host
        In,
        /// monitored host -> client
        Out,
    }

    /// Coarse application/transport classification derived from well-known
    /// port numbers, falling back to the bare transport name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ProtocolLabel {
        Http,
        Https,
        Ftp,
        Smtp,
        Ssh,
        Dns,
        Tcp,
        Udp,
        Ip,
    }

    impl ProtocolLabel {
        pub fn as_str(&self) -> &'static str {
            match self {
                ProtocolLabel::Http => "HTTP",
                ProtocolLabel::Https => "HTTPS",
                ProtocolLabel::Ftp => "FTP",
                ProtocolLabel::Smtp => "SMTP",
                ProtocolLabel::Ssh => "SSH",
                ProtocolLabel::Dns => "DNS",
                ProtocolLabel::Tcp => "TCP",
                ProtocolLabel::Udp => "UDP",
                ProtocolLabel::Ip => "IP",
            }
        }
    }

    /// A packet event after direction and protocol classification.
    #[derive(Debug, Clone, Copy)]
    pub struct ClassifiedPacket {
        pub client: IpAddr,
        pub direction: Direction,
        pub protocol: ProtocolLabel,
        pub bytes: u64,
    }
}

pub mod dto {
    use serde::Serialize;
    use std::collections::HashMap;

    /// Per-client byte totals without protocol detail; the drilldown
    /// endpoint carries the breakdown.
    #[derive(Debug, Serialize, Clone)]
    pub struct ClientTotals {
        #[serde(rename = "in")]
        pub bytes_in: u64,
        #[serde(rename = "out")]
        pub bytes_out: u64,
    }

    #[derive(Debug, Serialize, Clone)]
    pub struct WindowSummary {
        pub start: i64,
        pub clients: HashMap<String, ClientTotals>,
    }

    #[derive(Debug, Serialize, Clone)]
    pub struct Drilldown {
        pub start: i64,
        pub client: String,
        pub protocols: HashMap<String, u64>,
    }
}
