use std::sync::Arc;

use tracing::{error, info};

use shoplytics_core::aggregation::DateAggregation;

use crate::state::AppState;

/// Run one aggregation pass for today (UTC).
///
/// Today's rollups are recomputed in full on every pass, so a view recorded
/// between ticks is folded in by the next one.
pub async fn process_once(state: &Arc<AppState>) -> anyhow::Result<DateAggregation> {
    let today = chrono::Utc::now().date_naive();
    state.aggregation.aggregate_date(today).await
}

pub async fn run_scheduler_loop(state: Arc<AppState>) {
    let tick = state.config.aggregate_interval();
    info!(tick_seconds = tick.as_secs(), "Aggregation scheduler started");
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match process_once(&state).await {
            Ok(run) => info!(
                date = %run.date,
                channels_processed = run.channels_processed,
                channels_failed = run.channels_failed,
                "Aggregation pass complete"
            ),
            Err(err) => error!(error = %err, "aggregation scheduler iteration failed"),
        }
    }
}
