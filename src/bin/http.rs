use std::sync::Arc;

#[cfg(feature = "sqlite")]
use anyhow::Context;
use task_planner::{MemoryStore, PlannerConfig, PlannerService, PlannerStore, http_api, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PlannerConfig::from_env()?;
    telemetry::init_tracing(&config.log_level);

    let store: Arc<dyn PlannerStore> = match &config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => Arc::new(
            task_planner::SqliteStore::new(path)
                .with_context(|| format!("opening database {}", path.display()))?,
        ),
        #[cfg(not(feature = "sqlite"))]
        Some(path) => anyhow::bail!(
            "TASK_PLANNER_DB_PATH={} requires the `sqlite` feature",
            path.display()
        ),
        None => Arc::new(MemoryStore::new()),
    };

    let service = PlannerService::new(store, config.scheduler)
        .with_persisted_assignments(config.persist_assignments);
    if config.seed_developers {
        service.seed_developers()?;
    }

    info!(
        http_addr = %config.http_addr,
        in_memory = config.database_path.is_none(),
        weekly_hours = config.scheduler.weekly_capacity_hours,
        persist_assignments = config.persist_assignments,
        "configuration loaded"
    );

    let state = http_api::AppState::new(service)?;
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}
