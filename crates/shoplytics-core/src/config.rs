use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// Admin bearer token; `None` disables auth on the admin surface
    /// (single-operator self-hosted deployments).
    pub admin_token: Option<String>,
    pub aggregate_interval_secs: u64,
    pub cors_origins: Vec<String>,
    pub duckdb_memory_limit: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("SHOPLYTICS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("SHOPLYTICS_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            admin_token: std::env::var("SHOPLYTICS_ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            aggregate_interval_secs: std::env::var("SHOPLYTICS_AGGREGATE_INTERVAL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .map_err(|e| format!("invalid aggregate interval: {e}"))?,
            cors_origins: std::env::var("SHOPLYTICS_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            duckdb_memory_limit: std::env::var("SHOPLYTICS_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
        })
    }

    pub fn aggregate_interval(&self) -> Duration {
        Duration::from_secs(self.aggregate_interval_secs)
    }
}
