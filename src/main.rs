// src/main.rs

use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabletop_server::config::Config;
use tabletop_server::routes;
use tabletop_server::session::SessionManager;
use tabletop_server::state::AppState;
use tabletop_server::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletop_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let mut manager = SessionManager::new(&config);

    // Хранилище опционально: без DATABASE_URL или при недоступной базе
    // работаем без персистентности, живой путь от нее не зависит
    if let Some(database_url) = &config.database_url {
        match PgStore::connect(database_url).await {
            Ok(store) => {
                manager.set_store(
                    Arc::new(store),
                    Duration::from_secs(config.snapshot_interval_secs),
                );
            }
            Err(err) => {
                tracing::warn!("failed to connect snapshot store: {} — running without persistence", err);
            }
        }
    }

    // Восстановление — до приема соединений
    manager.restore_sessions().await;
    manager.start_periodic_snapshots().await;

    let app_state = AppState { config: config.clone(), manager: manager.clone() };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(vec![axum::http::header::CONTENT_TYPE])
        .allow_methods(Any);

    let app = routes::create_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("->> СЕРВЕР ЗАПУЩЕН на http://{}", addr);

    // Невозможность занять порт — единственная фатальная ошибка старта
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listening port");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Финальный полный проход сохранения перед выходом
    manager.stop_periodic_snapshots().await;
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", err);
    }
}
