use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use shoplytics_server::state::AppState;

/// `shoplytics health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$SHOPLYTICS_PORT/health` and exits 0 on an
/// HTTP 200, 1 on anything else.
fn run_health_check() -> ! {
    let port = std::env::var("SHOPLYTICS_PORT").unwrap_or_else(|_| "3000".to_string());
    let healthy = ureq::get(&format!("http://localhost:{port}/health"))
        .call()
        .map(|resp| resp.status() == 200)
        .unwrap_or(false);
    std::process::exit(if healthy { 0 } else { 1 })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Health-check subcommand — handled before the tokio runtime spins up so
    // the binary stays cheap when used as a Docker HEALTHCHECK probe.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level is controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shoplytics=info".parse()?),
        )
        .init();

    let cfg = shoplytics_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // The data directory must exist before DuckDB can create its file.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/shoplytics.duckdb", cfg.data_dir);

    // Open DuckDB — creates the schema on first run.
    let db = shoplytics_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    match &cfg.admin_token {
        Some(_) => info!("Admin auth enabled (bearer token)"),
        None => {
            info!("Admin auth disabled (SHOPLYTICS_ADMIN_TOKEN unset) — admin routes open")
        }
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));

    // Spawn the periodic aggregation task.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            shoplytics_server::scheduler::run_scheduler_loop(state).await;
        });
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = shoplytics_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "Shoplytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let state_for_shutdown = Arc::clone(&state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    // One final pass so today's rollups include views recorded since the
    // last scheduler tick.
    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        shoplytics_server::scheduler::process_once(&state_for_shutdown),
    )
    .await
    .ok();

    Ok(())
}
