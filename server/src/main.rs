//! Storefront HTTP server.
//!
//! Run from repo root: `cargo run -p storefront-server`

use storefront_core::{app, bootstrap_catalog, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront_core=info,storefront_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr.clone();
    let bootstrap = settings.bootstrap_schema;
    tracing::info!(
        app = %settings.app_name,
        mode = ?settings.mode,
        interpolated_v1 = settings.allow_interpolated_sql,
        "starting"
    );

    let state = AppState::from_settings(settings).await?;
    if bootstrap {
        let pool = state.connector.pool().await?;
        bootstrap_catalog(&pool).await?;
    }

    let router = app(state.clone());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Storefront listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    state.connector.close().await;
    Ok(())
}
