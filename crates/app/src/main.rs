use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bottega={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let engine = engine::Engine::builder()
        .database(db)
        .token_secret(settings.server.token_secret.as_str())
        .build()
        .await?;

    if let Some(merchant) = &settings.server.merchant {
        ensure_default_merchant(&engine, &merchant.username, &merchant.password).await?;
    }

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(engine, listener).await?;

    Ok(())
}

/// Create the configured merchant account unless it already exists.
async fn ensure_default_merchant(
    engine: &engine::Engine,
    username: &str,
    password: &str,
) -> Result<(), engine::EngineError> {
    match engine.bootstrap_merchant(username, password).await {
        Ok(user) => {
            tracing::info!("created default merchant account: {}", user.username);
            Ok(())
        }
        Err(engine::EngineError::ExistingKey(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
