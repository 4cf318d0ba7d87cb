use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dashboard_auth_api::data::memory::InMemoryAccountRepository;
use dashboard_auth_api::data::sqlite::SqliteAccountRepository;
use dashboard_auth_api::domain::repository::AccountRepository;
use dashboard_auth_api::infrastructure::config::{AppConfig, StoreConfig};
use dashboard_auth_api::infrastructure::logging::init_logging;
use dashboard_auth_api::presentation::handlers::AppState;
use dashboard_auth_api::presentation::middleware::RequestTracing;
use dashboard_auth_api::presentation::routes;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level);
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let hashing = config.password_hashing()?;

    let accounts: Arc<dyn AccountRepository> = match &config.store {
        StoreConfig::Memory => {
            info!("Using in-memory account store");
            Arc::new(InMemoryAccountRepository::new())
        }
        StoreConfig::Sqlite { url } => {
            info!("Connecting to SQLite account store");
            Arc::new(SqliteAccountRepository::connect(url).await.inspect_err(|e| {
                error!(error = %e, "Failed to open account store");
            })?)
        }
    };

    let state = web::Data::new(AppState::new(accounts.clone(), hashing));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(RequestTracing)
            .configure(routes::configure)
    })
    .bind(config.bind_addr())?;

    info!(
        address = %format!("{}:{}", config.host, config.port),
        routes = %"GET /, POST /auth/login, POST /auth/signup",
        "Starting HTTP server"
    );
    let outcome = server.run().await;

    info!("HTTP server stopped, closing account store");
    accounts.close().await;

    outcome.map_err(Into::into)
}
