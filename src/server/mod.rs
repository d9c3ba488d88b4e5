//! Server wiring
//!
//! Boots storage, the session registry, and the tracking service, then
//! runs the tracking socket and the REST API side by side.

pub mod http;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::progression::badges::NoJournals;
use crate::storage::{Database, HuntStore};
use crate::tracking::registry::SWEEP_INTERVAL_SECS;
use crate::tracking::{SessionRegistry, TrackingService, TrackingTunables};

/// Boot every component and serve until a listener fails.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db_path = config.database_path();
    let database = Database::open(&db_path)?;
    let store: Arc<dyn HuntStore> = Arc::new(database);

    let registry = Arc::new(SessionRegistry::with_limits(
        config.tracking.min_movement_m,
        config.tracking.max_movement_m,
        config.tracking.idle_timeout_secs,
    ));

    let service = Arc::new(TrackingService::new(
        store,
        Arc::clone(&registry),
        Arc::new(NoJournals),
        TrackingTunables {
            destination_radius_m: config.tracking.destination_radius_m,
            nearby_radius_m: config.tracking.nearby_radius_m,
            clue_radius_m: config.tracking.default_clue_radius_m,
        },
    ));
    service.initialize()?;

    spawn_idle_sweep(Arc::clone(&registry));

    let tracking = ws::run(&config.server.ws_addr, Arc::clone(&service));
    let rest = http::run(&config.server.http_addr, service);

    tokio::try_join!(tracking, rest)?;
    Ok(())
}

/// Periodically evict sessions that stopped reporting fixes.
fn spawn_idle_sweep(registry: Arc<SessionRegistry>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let evicted = registry.check_idle();
            if !evicted.is_empty() {
                tracing::info!("Evicted {} idle tracking sessions", evicted.len());
            }
        }
    });
}
