use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub ocm_api_key: Option<String>,
    pub ocm_base_url: String,
    pub ocm_max_results: u32,
    pub ocm_min_power_kw: u32,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub safety_margin_km: f64,
    pub fast_charge_threshold_kw: u32,
    pub default_result_limit: usize,
    pub cache_ttl_secs: u64,
    pub rate_limit_per_minute: u32,
    /// Cron expression; scheduled ingestion is off when unset.
    pub ingest_schedule: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "ocm_api_key",
                &self.ocm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ocm_base_url", &self.ocm_base_url)
            .field("ocm_max_results", &self.ocm_max_results)
            .field("ocm_min_power_kw", &self.ocm_min_power_kw)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("safety_margin_km", &self.safety_margin_km)
            .field("fast_charge_threshold_kw", &self.fast_charge_threshold_kw)
            .field("default_result_limit", &self.default_result_limit)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("ingest_schedule", &self.ingest_schedule)
            .finish()
    }
}
