//! Prometheus metrics for the simulation runtime.

use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use sim_core::{SharedStats, TickStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::thread;
use std::time::Duration;
use tiny_http::{Response, Server};

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Update ticks executed
pub static TICKS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new("opcsim_ticks_total", "Update ticks executed").unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Tag values written into the address space
pub static TAG_WRITES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "opcsim_tag_writes_total",
        "Tag values written into the address space",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Number of simulated equipment objects
pub static EQUIPMENT_COUNT: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new("opcsim_equipment_count", "Number of simulated equipment objects")
        .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Initialize all metrics (forces lazy initialization)
pub fn init() {
    let _ = TICKS_TOTAL.get();
    let _ = TAG_WRITES_TOTAL.get();
    let _ = EQUIPMENT_COUNT.get();
}

/// Start the metrics HTTP server if an address was configured.
pub fn start_metrics_server(addr: &Option<String>) -> Option<thread::JoinHandle<()>> {
    addr.as_ref().map(|addr| {
        tracing::info!(addr = %addr, "Starting metrics server");
        serve_metrics(addr.clone())
    })
}

fn serve_metrics(bind_addr: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let server = match Server::http(&bind_addr) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to start metrics server on {}: {}", bind_addr, e);
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", bind_addr);

        for request in server.incoming_requests() {
            match request.url() {
                "/metrics" => {
                    let encoder = TextEncoder::new();
                    let metric_families = REGISTRY.gather();
                    let mut buffer = Vec::new();

                    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
                        tracing::warn!("Failed to encode metrics: {}", e);
                        let _ = request.respond(
                            Response::from_string("Internal Server Error").with_status_code(500),
                        );
                        continue;
                    }

                    let response = Response::from_data(buffer).with_header(
                        tiny_http::Header::from_bytes(
                            &b"Content-Type"[..],
                            &b"text/plain; version=0.0.4"[..],
                        )
                        .unwrap(),
                    );
                    let _ = request.respond(response);
                }
                "/health" => {
                    let _ = request.respond(Response::from_string("OK"));
                }
                "/ready" => {
                    // Ready once the first update tick has run
                    if TICKS_TOTAL.get() > 0 {
                        let _ = request.respond(Response::from_string("Ready"));
                    } else {
                        let _ = request
                            .respond(Response::from_string("Not Ready").with_status_code(503));
                    }
                }
                _ => {
                    let _ =
                        request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        }
    })
}

/// Mirror the update loop's shared counters into Prometheus.
pub fn start_stats_updater(
    stats: Arc<SharedStats>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut last = TickStats::default();
        while !stop.load(Ordering::Relaxed) {
            let snapshot = stats.snapshot();
            if snapshot.ticks > last.ticks {
                TICKS_TOTAL.inc_by(snapshot.ticks - last.ticks);
            }
            if snapshot.values_written > last.values_written {
                TAG_WRITES_TOTAL.inc_by(snapshot.values_written - last.values_written);
            }
            last = snapshot;
            thread::sleep(Duration::from_millis(200));
        }
    })
}
