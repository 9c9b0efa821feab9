use emsu_config::{CorsConfig, JwtConfig};
use emsu_db::{SqlitePool, init_db_pool};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: SqlitePool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            db,
            jwt_config,
            cors_config,
        }
    }
}

/// Connects the pool, applies pending migrations and loads configuration.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = init_db_pool().await?;
    run_migrations(&db).await?;

    Ok(AppState::new(db, JwtConfig::from_env(), CorsConfig::from_env()))
}

pub async fn run_migrations(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
