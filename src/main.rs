use std::{net::SocketAddr, sync::Arc};

use axum::{http::Method, Extension};
use club_hub::{
    config::{Config, StoreBackend},
    connect_to_db,
    logging::init_logger,
    store::{MemoryStore, PgStore, SharedStore},
};
use envconfig::Envconfig;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::init_from_env()?;
    init_logger(config.log_level)?;

    let store: SharedStore = match config.store_backend {
        StoreBackend::Postgres => Arc::new(PgStore::new(connect_to_db(config.database_url()?)?)),
        StoreBackend::Memory => {
            log::warn!("using the in-memory store, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = club_hub::app()
        .layer(Extension(store.clone()))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    log::info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("shutting down");
        })
        .await?;

    store.close().await;
    Ok(())
}
