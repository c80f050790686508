use iptv_dashboard::{
    load_data, models::parse_timestamp, resolve_data_path, router, AppState, Clock, FixedClock, SystemClock,
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let book = load_data(&data_path).await;
    info!("loaded {} sales from {}", book.len(), data_path.display());

    let state = AppState::new(data_path, book, resolve_clock());
    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// `APP_FIXED_NOW` pins the evaluation instant; otherwise the wall clock.
fn resolve_clock() -> Arc<dyn Clock> {
    match env::var("APP_FIXED_NOW") {
        Ok(raw) => match parse_timestamp(&raw) {
            Some(now) => {
                info!("evaluation instant fixed at {now}");
                Arc::new(FixedClock(now))
            }
            None => {
                warn!("ignoring unparsable APP_FIXED_NOW={raw}");
                Arc::new(SystemClock)
            }
        },
        Err(_) => Arc::new(SystemClock),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
