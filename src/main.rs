use habit_quest::{
    clock::SystemClock,
    load_data, router,
    timers::{spawn_clock_timer, spawn_missed_task_scanner},
    AppConfig, AppState,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&config.data_path).await;
    let state = AppState::new(config.data_path.clone(), data, Arc::new(SystemClock));

    let clock_timer = spawn_clock_timer(state.clone(), config.clock_period);
    let scanner = spawn_missed_task_scanner(state.clone(), config.scan_period);
    info!(
        clock = ?config.clock_period,
        scan = ?config.scan_period,
        "timers started"
    );

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    for timer in [clock_timer, scanner] {
        info!(timer = timer.name(), running = timer.is_running(), "stopping timer");
        timer.stop();
    }
    info!("shut down");
    Ok(())
}
