use crate::infra::audit::{AuditEventType, AuditLogger};
use crate::opcua_server::{build_server, OpcuaConfig, ServerError, ServerGuard};
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::runtime::telemetry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sim_core::{build_registry, LoopConfig, SharedStats, SpaceError, UpdateLoop};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Space(#[from] SpaceError),

    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),

    #[error("audit log failure: {0}")]
    Audit(#[from] std::io::Error),

    #[error("update loop thread panicked")]
    LoopPanicked,
}

pub fn run_from_args() -> Result<(), RuntimeError> {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return Ok(());
    }
    run(config)
}

pub fn run(config: RuntimeConfig) -> Result<(), RuntimeError> {
    init_tracing(config.json_logs);
    telemetry::init();
    let _metrics_handle = telemetry::start_metrics_server(&config.metrics_addr);

    let audit_logger = match config.audit_path.as_ref() {
        Some(path) => {
            let logger = AuditLogger::new(path)?;
            info!(path = %path.display(), "Audit logging enabled");
            Some(Arc::new(logger))
        }
        None => None,
    };

    if let Some(ref logger) = audit_logger {
        let _ = logger.log_event(
            AuditEventType::SystemStart,
            serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "equipment_count": config.equipment_count,
                "tick_interval_ms": config.tick_interval.as_millis() as u64,
                "seeded": config.seed.is_some(),
            }),
        );
    }

    let opcua_config = OpcuaConfig {
        endpoint: config.endpoint.clone(),
        namespace_uri: config.namespace_uri.clone(),
        ..Default::default()
    };

    info!(endpoint = %opcua_config.endpoint, "Building OPC UA server");
    let (server, mut space) = build_server(&opcua_config)?;

    // Registry build failures abort here, before the server ever listens.
    let registry = build_registry(&mut space, config.equipment_count)?;
    info!(equipment = registry.len(), "Equipment registry built");
    telemetry::EQUIPMENT_COUNT.set(registry.len() as f64);

    if let Some(ref logger) = audit_logger {
        let _ = logger.log_event(
            AuditEventType::RegistryBuilt,
            serde_json::json!({ "equipment": registry.len() }),
        );
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })?;
    }

    // From here the server accepts connections; the guard releases it on
    // every exit path below, exactly once.
    let mut guard = ServerGuard::start(server);
    info!(endpoint = %config.endpoint, "OPC UA server accepting connections");

    if let Some(ref logger) = audit_logger {
        let _ = logger.log_event(
            AuditEventType::ServerStarted,
            serde_json::json!({ "endpoint": config.endpoint }),
        );
    }

    let stats = Arc::new(SharedStats::default());
    let _stats_updater = telemetry::start_stats_updater(Arc::clone(&stats), Arc::clone(&stop));

    let loop_config = LoopConfig {
        tick_interval: config.tick_interval,
    };
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let stats_loop = Arc::clone(&stats);
    let stop_loop = Arc::clone(&stop);
    let loop_handle = thread::spawn(move || {
        let mut update_loop = UpdateLoop::new(registry, rng, loop_config, stats_loop);
        update_loop.run(&stop_loop)
    });

    if let Some(seconds) = config.run_seconds {
        info!(seconds, "Running for limited duration");
        thread::sleep(Duration::from_secs(seconds));
        stop.store(true, Ordering::Relaxed);
    }

    let result = loop_handle
        .join()
        .map_err(|_| RuntimeError::LoopPanicked)?;
    stop.store(true, Ordering::Relaxed);
    guard.stop();

    match result {
        Ok(stats) => {
            info!(
                ticks = stats.ticks,
                values_written = stats.values_written,
                "Run complete"
            );
            if let Some(ref logger) = audit_logger {
                let _ = logger.log_event(
                    AuditEventType::SystemShutdown,
                    serde_json::json!({
                        "ticks": stats.ticks,
                        "values_written": stats.values_written,
                    }),
                );
            }
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Update loop failed");
            if let Some(ref logger) = audit_logger {
                let _ = logger.log_event(
                    AuditEventType::SystemShutdown,
                    serde_json::json!({ "error": err.to_string() }),
                );
            }
            Err(err.into())
        }
    }
}
