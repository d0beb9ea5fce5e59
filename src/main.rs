use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use hostwatch::classify::classify;
use hostwatch::config::{Cli, Config};
use hostwatch::dashboard;
use hostwatch::models::domain::PacketEvent;
use hostwatch::query::QueryService;
use hostwatch::store::WindowStore;
use hostwatch::{sniff, synth};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::resolve(Cli::parse())?;
    info!(
        "monitoring traffic for {} (window {}s, retention {})",
        config.monitored_ip, config.window_size, config.retention_capacity
    );

    let store = Arc::new(WindowStore::new(
        config.window_size,
        config.retention_capacity,
    ));
    let running = Arc::new(AtomicBool::new(true));
    let (tx, rx) = unbounded();

    // Capture collaborator: live pcap, or the synthetic generator as a
    // drop-in replacement.
    let capture_thread = {
        let running = running.clone();
        let monitored_ip = config.monitored_ip;
        let interface = config.interface.clone();
        let synthetic = config.synthetic;
        thread::spawn(move || {
            if synthetic {
                synth::start_generator(monitored_ip, tx, running);
            } else if let Err(e) =
                sniff::start_sniffing(interface.as_deref(), monitored_ip, tx, running)
            {
                // the query side keeps serving whatever was already ingested
                error!("packet capture failed: {}", e);
            }
        })
    };

    // Aggregator: classify and ingest everything the capture side delivers.
    let aggregator_thread = {
        let store = store.clone();
        let running = running.clone();
        let monitored_ip = config.monitored_ip;
        thread::spawn(move || ingest_events(rx, store, running, monitored_ip))
    };

    // Retention rotator.
    {
        let store = store.clone();
        let running = running.clone();
        let period = Duration::from_secs(config.window_size as u64 * 2);
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            while running.load(Ordering::SeqCst) {
                interval.tick().await;
                let evicted = store.evict_to_capacity();
                if evicted > 0 {
                    debug!("evicted {} expired window(s)", evicted);
                }
            }
        });
    }

    let server = dashboard::serve(QueryService::new(store), config.port)?;
    let server_handle = server.handle();

    // Ctrl-C flips the running flag for the worker threads and stops the
    // HTTP workers through the server handle.
    {
        let running = running.clone();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })?;
        tokio::spawn(async move {
            let _ = tokio::task::spawn_blocking(move || stop_rx.recv()).await;
            info!("shutdown signal received, stopping");
            running.store(false, Ordering::SeqCst);
            server_handle.stop(true).await;
        });
    }

    server.await?;

    running.store(false, Ordering::SeqCst);
    if capture_thread.join().is_err() {
        error!("capture thread panicked");
    }
    if aggregator_thread.join().is_err() {
        error!("aggregator thread panicked");
    }
    Ok(())
}

fn ingest_events(
    rx: Receiver<PacketEvent>,
    store: Arc<WindowStore>,
    running: Arc<AtomicBool>,
    monitored_ip: IpAddr,
) {
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if let Some(packet) = classify(&event, monitored_ip) {
                    store.ingest(&packet);
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
