use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{
    errors::Result,
    state::{AppState, Config},
};

pub mod appointments;
pub mod audit;
pub mod consts;
pub mod errors;
pub mod guard;
pub mod identity;
pub mod messaging;
pub mod middleware;
pub mod models;
pub mod provisioning;
pub mod roles;
pub mod routes;
pub mod state;
pub mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing::subscriber::set_global_default(FmtSubscriber::default()).unwrap();

    let config = Config::from_env();
    let port = config.port;
    let state = AppState::init(config).await?;

    info!("Starting server");

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Serving campusmeet at http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        routes::app_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
