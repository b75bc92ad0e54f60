use axum::Router;
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod schema;
pub mod store;
pub mod validate;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Ok(Pool::builder(db_config).build()?)
}

/// All routes, expecting a [`store::SharedStore`] extension layered on top.
pub fn app() -> Router {
    Router::new().nest("/api", api::app())
}
