//! API server entry point.

use common::UserId;
use domain::Role;
use lifecycle::UserProfile;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve<S: OrderStore + 'static>(store: S, config: Config) {
    let (state, directory, _dispatcher) = api::create_default_state(store);
    seed_demo_users(&directory);

    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

/// Registers a demo user per role so the API is usable out of the box.
///
/// The production directory is an external collaborator; these stand-ins
/// exist only for local runs against the in-memory wiring.
fn seed_demo_users(directory: &lifecycle::InMemoryUserDirectory) {
    for (name, role) in [
        ("demo-employee", Role::Employee),
        ("demo-delivery", Role::Delivery),
        ("demo-admin", Role::Admin),
    ] {
        let id = UserId::new();
        directory.upsert(UserProfile::new(id, name, role));
        tracing::info!(%id, %role, "seeded demo user");
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match config.database_url.clone() {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to Postgres");
            let store = PostgresOrderStore::new(pool);
            store.ensure_schema().await.expect("failed to create schema");
            tracing::info!("using Postgres order store");
            serve(store, config).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory order store");
            serve(InMemoryOrderStore::new(), config).await;
        }
    }
}
