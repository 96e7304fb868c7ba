//! `search`: rank stored chargers by what the remaining range can reach.

use clap::{ArgGroup, Args};
use echarger_core::{
    find_waypoint, rank_reachable, AppConfig, ChargerWithDistance, Location, RangeQuery,
    RouteSegment, WAYPOINTS,
};

/// No car on the corridor gets further than this on one charge.
const MAX_RANGE_KM: f64 = 400.0;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("origin").required(true).args(["city", "lat"])))]
pub(crate) struct SearchArgs {
    /// Start from a preset corridor city (see `waypoints`)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub city: Option<String>,
    /// Start latitude in decimal degrees
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Start longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// Remaining range in kilometres
    #[arg(long, allow_negative_numbers = true)]
    pub range_km: f64,
    /// Maximum chargers to list (defaults to ECHARGER_DEFAULT_RESULT_LIMIT)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Only consider chargers tagged on or near the route
    #[arg(long)]
    pub on_route_only: bool,
    /// Only consider chargers in this corridor segment
    #[arg(long)]
    pub segment: Option<RouteSegment>,
}

fn origin(args: &SearchArgs) -> anyhow::Result<Location> {
    if let Some(city) = args.city.as_deref() {
        let wp = find_waypoint(city).ok_or_else(|| {
            let known: Vec<&str> = WAYPOINTS.iter().map(|wp| wp.name).collect();
            anyhow::anyhow!("unknown city '{city}'; known cities: {}", known.join(", "))
        })?;
        return Ok(Location::labelled(wp.latitude, wp.longitude, wp.name));
    }

    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                anyhow::bail!("coordinates out of range: {lat}, {lng}");
            }
            Ok(Location::new(lat, lng))
        }
        _ => anyhow::bail!("provide --city or both --lat and --lng"),
    }
}

/// Turn command-line arguments into a ranking query.
///
/// # Errors
///
/// Returns an error for an unknown city, out-of-range coordinates, or a
/// range outside `[0, 400]` km.
pub(crate) fn build_query(args: &SearchArgs, config: &AppConfig) -> anyhow::Result<RangeQuery> {
    let location = origin(args)?;

    if !args.range_km.is_finite() || args.range_km < 0.0 || args.range_km > MAX_RANGE_KM {
        anyhow::bail!("--range-km must be between 0 and {MAX_RANGE_KM}");
    }

    Ok(RangeQuery::new(location, args.range_km)
        .with_limit(args.limit.unwrap_or(config.default_result_limit))
        .with_safety_margin(config.safety_margin_km)
        .on_route_only(args.on_route_only))
}

fn print_results(query: &RangeQuery, results: &[ChargerWithDistance]) {
    let from = query.location.label.clone().unwrap_or_else(|| {
        format!("{:.4}, {:.4}", query.location.latitude, query.location.longitude)
    });

    if results.is_empty() {
        println!(
            "no chargers reachable from {from} with {} km (keeping {} km in reserve)",
            query.remaining_range_km, query.safety_margin_km
        );
        return;
    }

    println!(
        "chargers reachable from {from} with {} km:",
        query.remaining_range_km
    );
    println!(
        "{:<4}{:<36}{:<16}{:>8}{:>10}{:>12}  SEGMENT",
        "#", "NAME", "NETWORK", "KW", "DIST KM", "LEFT KM"
    );
    for (rank, hit) in results.iter().enumerate() {
        let charger = &hit.charger;
        let name: String = charger.name.chars().take(34).collect();
        println!(
            "{:<4}{:<36}{:<16}{:>8}{:>10.1}{:>12.1}  {}",
            rank + 1,
            name,
            charger.network,
            charger.power_kw,
            hit.distance_km,
            hit.range_after_km,
            charger.route_segment.as_str()
        );
    }
}

/// # Errors
///
/// Returns an error if the arguments are invalid or the chargers cannot be
/// loaded.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    args: &SearchArgs,
) -> anyhow::Result<()> {
    let query = build_query(args, config)?;
    let chargers = echarger_db::fetch_charger_records(pool, args.segment).await?;
    tracing::debug!(loaded = chargers.len(), "ranking stored chargers");

    let results = rank_reachable(&chargers, &query);
    print_results(&query, &results);
    Ok(())
}
