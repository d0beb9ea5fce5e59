use clap::Parser;
use std::env;
use std::net::IpAddr;
use thiserror::Error;

/// Command-line options. Every option falls back to an environment variable
/// (loaded from `.env` when present) and then to a default.
#[derive(Debug, Default, Parser)]
#[command(name = "hostwatch", about = "Per-client traffic monitor for a single host")]
pub struct Cli {
    /// Address of the monitored host (env: SERVER_IP)
    #[arg(long)]
    pub ip: Option<String>,

    /// Capture interface name; auto-detected when omitted (env: CAPTURE_INTERFACE)
    #[arg(long)]
    pub interface: Option<String>,

    /// Window bucket width in seconds (env: WINDOW_SIZE)
    #[arg(long)]
    pub window_size: Option<i64>,

    /// Maximum number of retained windows (env: MAX_WINDOWS)
    #[arg(long)]
    pub retention: Option<usize>,

    /// Dashboard API port (env: PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Generate synthetic traffic instead of capturing (env: SYNTHETIC)
    #[arg(long)]
    pub synthetic: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid monitored address {0:?}")]
    InvalidAddress(String),
    #[error("{0} must be at least 1")]
    NotPositive(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub monitored_ip: IpAddr,
    pub interface: Option<String>,
    pub window_size: i64,
    pub retention_capacity: usize,
    pub port: u16,
    pub synthetic: bool,
}

impl Config {
    /// Merge CLI arguments over environment variables over defaults, and
    /// validate the invariants the window store relies on.
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let ip_raw = cli
            .ip
            .or_else(|| env::var("SERVER_IP").ok())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let monitored_ip = ip_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(ip_raw))?;

        let window_size = match cli.window_size {
            Some(v) => v,
            None => env_parse("WINDOW_SIZE")?.unwrap_or(5),
        };
        if window_size < 1 {
            return Err(ConfigError::NotPositive("WINDOW_SIZE"));
        }

        let retention_capacity = match cli.retention {
            Some(v) => v,
            None => env_parse("MAX_WINDOWS")?.unwrap_or(100),
        };
        if retention_capacity < 1 {
            return Err(ConfigError::NotPositive("MAX_WINDOWS"));
        }

        let port = match cli.port {
            Some(v) => v,
            None => env_parse("PORT")?.unwrap_or(8000),
        };

        let interface = cli.interface.or_else(|| env::var("CAPTURE_INTERFACE").ok());
        let synthetic = cli.synthetic
            || env::var("SYNTHETIC")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);

        Ok(Self {
            monitored_ip,
            interface,
            window_size,
            retention_capacity,
            port,
            synthetic,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(None),
    }
}
