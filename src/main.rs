use std::sync::Arc;

use affirmfit::api::routes::{create_routes, AppState};
use affirmfit::config::{run_migrations, AppConfig, DatabaseConfig, PersistenceBackend};
use affirmfit::services::{
    AuditService, ExerciseLibraryService, PlanGenerationService, PlanService, ProfileService,
    SafetyConfigService,
};
use affirmfit::storage::{
    AuditSink, ConfigStore, FeedbackStore, MemoryStore, PlanStore, PostgresStore, ProfileStore,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let app_config = AppConfig::from_env()?;

    // Wire the deployment's persistence backend
    let state = match app_config.persistence_backend {
        PersistenceBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = db_config.create_pool().await?;
            if db_config.migrate_on_start {
                run_migrations(&pool).await?;
            }
            info!("using postgres persistence backend");
            build_state(Arc::new(PostgresStore::new(pool)), &app_config)
        }
        PersistenceBackend::Memory => {
            info!("using in-memory persistence backend");
            build_state(Arc::new(MemoryStore::new()), &app_config)
        }
    };

    let app = create_routes(state);

    // Start the server
    let listener = TcpListener::bind(&app_config.server_address()).await?;
    info!(
        "AffirmFit server starting on http://{}",
        app_config.server_address()
    );
    info!(
        "Health check available at http://{}/health",
        app_config.server_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state<S>(store: Arc<S>, app_config: &AppConfig) -> AppState
where
    S: ConfigStore + ProfileStore + PlanStore + FeedbackStore + AuditSink + 'static,
{
    let config_service = Arc::new(SafetyConfigService::with_timing(
        store.clone(),
        app_config.config_cache_ttl,
        app_config.config_fetch_timeout,
    ));
    let library = ExerciseLibraryService::builtin();
    let plan_service = PlanService::new(store.clone());
    let audit = AuditService::new(store.clone(), app_config.audit_enabled);
    let plan_generation_service = PlanGenerationService::new(
        config_service,
        library,
        store.clone(),
        store.clone(),
        plan_service.clone(),
        audit,
    );

    AppState {
        profile_service: ProfileService::new(store.clone()),
        plan_generation_service,
        plan_service,
        feedback_store: store,
    }
}
