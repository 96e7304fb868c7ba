use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the process environment only.
///
/// Does not read `.env`; the caller owns env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse and validate configuration through `lookup`, so tests can feed a
/// plain `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_as(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_as(var, &or_default(var, default))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("ECHARGER_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "ECHARGER_BIND_ADDR",
        &or_default("ECHARGER_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("ECHARGER_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("ECHARGER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ECHARGER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ECHARGER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let ocm_api_key = optional("OPENCHARGEMAP_API_KEY");
    let ocm_base_url = or_default("ECHARGER_OCM_BASE_URL", "https://api.openchargemap.io");
    let ocm_max_results = parse_u32("ECHARGER_OCM_MAX_RESULTS", "200")?;
    let ocm_min_power_kw = parse_u32("ECHARGER_OCM_MIN_POWER_KW", "100")?;

    let scraper_request_timeout_secs = parse_u64("ECHARGER_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "ECHARGER_SCRAPER_USER_AGENT",
        "echarger/0.1 (corridor-charger-import)",
    );
    let scraper_inter_request_delay_ms =
        parse_u64("ECHARGER_SCRAPER_INTER_REQUEST_DELAY_MS", "500")?;
    let scraper_max_retries = parse_u32("ECHARGER_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("ECHARGER_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let safety_margin_km: f64 = parse_as(
        "ECHARGER_SAFETY_MARGIN_KM",
        &or_default("ECHARGER_SAFETY_MARGIN_KM", "10"),
    )?;
    if !safety_margin_km.is_finite() || safety_margin_km < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ECHARGER_SAFETY_MARGIN_KM".to_string(),
            reason: format!("must be a finite, non-negative number of km, got {safety_margin_km}"),
        });
    }
    let fast_charge_threshold_kw = parse_u32("ECHARGER_FAST_CHARGE_THRESHOLD_KW", "150")?;
    let default_result_limit: usize = parse_as(
        "ECHARGER_DEFAULT_RESULT_LIMIT",
        &or_default("ECHARGER_DEFAULT_RESULT_LIMIT", "3"),
    )?;
    let cache_ttl_secs = parse_u64("ECHARGER_CACHE_TTL_SECS", "300")?;
    let rate_limit_per_minute = parse_u32("ECHARGER_RATE_LIMIT_PER_MINUTE", "120")?;
    let ingest_schedule = optional("ECHARGER_INGEST_SCHEDULE");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        ocm_api_key,
        ocm_base_url,
        ocm_max_results,
        ocm_min_power_kw,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        safety_margin_km,
        fast_charge_threshold_kw,
        default_result_limit,
        cache_ttl_secs,
        rate_limit_per_minute,
        ingest_schedule,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ECHARGER_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
