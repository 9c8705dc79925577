use migration::{Migrator, MigratorTrait};
use settings::Database;
use token::TokenMaker;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tripsplit={level},server={level},engine={level},token={level}",
            level = settings.app.level
        ))
        .init();

    if settings.token.access_token_duration_secs <= 0 {
        return Err("token.access_token_duration_secs must be positive".into());
    }
    let access_token_duration =
        chrono::Duration::seconds(settings.token.access_token_duration_secs);
    let tokens = TokenMaker::new(settings.token.symmetric_key.as_bytes())?;

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let state = server::ServerState::new(engine, tokens, access_token_duration);
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
