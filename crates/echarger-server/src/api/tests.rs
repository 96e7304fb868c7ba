use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::body::{to_bytes, Body};
use axum::http::Request;
use echarger_core::{
    find_waypoint, ChargerCandidate, ChargerRecord, ConnectorType, Environment, HighwayProximity,
    OnRoute, RouteSegment,
};
use tower::ServiceExt;

use super::chargers::{normalize_limit, validate_reachable, ReachableQuery, MAX_RESULT_LIMIT};
use super::*;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://echarger@127.0.0.1:1/echarger".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 2,
        db_min_connections: 0,
        db_acquire_timeout_secs: 1,
        ocm_api_key: None,
        ocm_base_url: "https://api.openchargemap.io".to_string(),
        ocm_max_results: 200,
        ocm_min_power_kw: 100,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "echarger-test".to_string(),
        scraper_inter_request_delay_ms: 0,
        scraper_max_retries: 0,
        scraper_retry_backoff_base_secs: 0,
        safety_margin_km: 10.0,
        fast_charge_threshold_kw: 150,
        default_result_limit: 3,
        cache_ttl_secs: 300,
        rate_limit_per_minute: 120,
        ingest_schedule: None,
    }
}

/// A pool that never connects; refreshes against it fail quickly.
fn unreachable_pool() -> PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://echarger@127.0.0.1:1/echarger")
        .expect("lazy pool")
}

fn city_charger(city: &str, segment: RouteSegment) -> ChargerRecord {
    let wp = find_waypoint(city).expect("waypoint");
    ChargerRecord {
        id: city.to_string(),
        ocm_id: None,
        name: format!("{city} Fastned"),
        latitude: wp.latitude,
        longitude: wp.longitude,
        network: "Fastned".to_string(),
        power_kw: 300,
        connector_types: BTreeSet::from([ConnectorType::Ccs]),
        num_chargers: 6,
        highway_proximity: HighwayProximity::AtExit,
        route_segment: segment,
        on_route: OnRoute::Yes,
        amenities: BTreeSet::new(),
        notes: String::new(),
        reliability: None,
        status: None,
        country: None,
    }
}

async fn primed_app(cache_ttl: Duration, records: Vec<ChargerRecord>) -> Router {
    let config = Arc::new(test_config());
    let cache = ChargerCache::new(cache_ttl);
    cache.store(records).await;
    let rate_limit = rate_limit_state(&config);
    build_app(
        AppState {
            pool: unreachable_pool(),
            config,
            cache,
        },
        rate_limit,
    )
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    assert!(response.headers().contains_key("x-request-id"));
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn corridor_records() -> Vec<ChargerRecord> {
    vec![
        city_charger("Brussels", RouteSegment::BeFr),
        city_charger("Breda", RouteSegment::NlBe),
        city_charger("Paris", RouteSegment::FrParis),
    ]
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::validation("req-1", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_unknown_code_maps_to_internal_error() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None, 3), 3);
    assert_eq!(normalize_limit(Some(-4), 3), 0);
    assert_eq!(normalize_limit(Some(0), 3), 0);
    assert_eq!(normalize_limit(Some(7), 3), 7);
    assert_eq!(normalize_limit(Some(10_000), 3), MAX_RESULT_LIMIT);
}

#[test]
fn reachable_query_accepts_a_known_city() {
    let query = ReachableQuery {
        city: Some(" paris ".to_string()),
        range_km: Some(200.0),
        ..ReachableQuery::default()
    };
    let search = validate_reachable(&query, 3, 10.0).expect("valid");
    assert_eq!(search.query.location.label.as_deref(), Some("Paris"));
    assert_eq!(search.query.result_limit, 3);
    assert!(search.segment.is_none());
}

#[test]
fn reachable_query_rejects_bad_input() {
    let cases = [
        ReachableQuery {
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Lyon".to_string()),
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            lat: Some(48.0),
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            lat: Some(48.0),
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            lat: Some(91.0),
            lng: Some(2.0),
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            lat: Some(48.0),
            lng: Some(-181.0),
            range_km: Some(100.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            range_km: Some(-1.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            range_km: Some(401.0),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            range_km: Some(f64::NAN),
            ..ReachableQuery::default()
        },
        ReachableQuery {
            city: Some("Paris".to_string()),
            range_km: Some(100.0),
            segment: Some("Lyon-Marseille".to_string()),
            ..ReachableQuery::default()
        },
    ];

    for query in &cases {
        assert!(
            validate_reachable(query, 3, 10.0).is_err(),
            "expected rejection for {query:?}"
        );
    }
}

#[tokio::test]
async fn reachable_from_rotterdam_with_120_km_finds_breda() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;
    let (status, json) = get_json(
        app,
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=120",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let chargers = json["data"]["chargers"].as_array().expect("chargers");
    assert_eq!(chargers.len(), 1);
    assert_eq!(chargers[0]["id"], "Breda");
    assert_eq!(chargers[0]["range_after_km"].as_f64(), Some(76.0));
    assert_eq!(json["data"]["stale"], false);
    assert_eq!(json["data"]["origin"]["label"], "Rotterdam");
    assert!(json["meta"]["request_id"].is_string());
}

#[test]
fn zero_range_is_a_valid_query() {
    let query = ReachableQuery {
        city: Some("Rotterdam".to_string()),
        range_km: Some(0.0),
        ..ReachableQuery::default()
    };
    let search = validate_reachable(&query, 3, 10.0).expect("zero range accepted");
    assert!(search.query.remaining_range_km.abs() < f64::EPSILON);
}

#[tokio::test]
async fn reachable_with_zero_or_margin_range_is_empty() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;
    for uri in [
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=0",
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=10",
    ] {
        let (status, json) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json["data"]["chargers"], serde_json::json!([]), "{uri}");
    }
}

#[tokio::test]
async fn reachable_honours_limit_and_segment() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;
    let (status, json) = get_json(
        app.clone(),
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=150&limit=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chargers = json["data"]["chargers"].as_array().expect("chargers");
    assert_eq!(chargers.len(), 1);
    assert_eq!(chargers[0]["id"], "Breda");

    let (status, json) = get_json(
        app,
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=150&segment=BE-FR",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chargers = json["data"]["chargers"].as_array().expect("chargers");
    assert_eq!(chargers.len(), 1);
    assert_eq!(chargers[0]["id"], "Brussels");
}

#[tokio::test]
async fn reachable_with_negative_limit_is_empty() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;
    let (status, json) = get_json(
        app,
        "/api/v1/chargers/reachable?lat=51.9244&lng=4.4777&range_km=150&limit=-1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["chargers"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn reachable_validation_failures_use_error_envelope() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;

    for uri in [
        "/api/v1/chargers/reachable?city=Rotterdam",
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=abc",
        "/api/v1/chargers/reachable?lat=51.9&range_km=100",
        "/api/v1/chargers/reachable?city=Rotterdam&range_km=500",
    ] {
        let (status, json) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "validation_error", "{uri}");
        assert!(json["meta"]["request_id"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn list_chargers_filters_by_segment() {
    let app = primed_app(Duration::from_secs(300), corridor_records()).await;

    let (status, json) = get_json(app.clone(), "/api/v1/chargers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 3);

    let (status, json) = get_json(app.clone(), "/api/v1/chargers?segment=fr-paris").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 1);
    assert_eq!(json["data"]["chargers"][0]["route_segment"], "FR-Paris");

    let (status, json) = get_json(app, "/api/v1/chargers?segment=nowhere").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn failed_refresh_serves_stale_chargers() {
    let app = primed_app(Duration::ZERO, corridor_records()).await;
    let (status, json) = get_json(app, "/api/v1/chargers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["stale"], true);
    assert_eq!(json["data"]["count"], 3);
}

#[tokio::test]
async fn failed_first_load_is_internal_error() {
    let config = Arc::new(test_config());
    let rate_limit = rate_limit_state(&config);
    let app = build_app(
        AppState {
            pool: unreachable_pool(),
            config,
            cache: ChargerCache::new(Duration::from_secs(300)),
        },
        rate_limit,
    );

    let (status, json) = get_json(app, "/api/v1/chargers").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "internal_error");
}

#[tokio::test]
async fn corridor_routes_list_segments_and_waypoints() {
    let app = primed_app(Duration::from_secs(300), Vec::new()).await;

    let (status, json) = get_json(app.clone(), "/api/v1/corridor/segments").await;
    assert_eq!(status, StatusCode::OK);
    let segments = json["data"].as_array().expect("segments");
    assert_eq!(segments.len(), 9);
    assert_eq!(segments[0]["segment"], "NL-BE");
    assert_eq!(segments[0]["bbox"]["min_lat"].as_f64(), Some(51.4));

    let (status, json) = get_json(app, "/api/v1/corridor/waypoints").await;
    assert_eq!(status, StatusCode::OK);
    let waypoints = json["data"].as_array().expect("waypoints");
    assert_eq!(waypoints.len(), 14);
    assert_eq!(waypoints[0]["name"], "Rotterdam");
    assert_eq!(waypoints[13]["name"], "Santa Pola");
}

#[tokio::test]
async fn api_routes_are_rate_limited() {
    let mut config = test_config();
    config.rate_limit_per_minute = 1;
    let config = Arc::new(config);
    let rate_limit = rate_limit_state(&config);
    let app = build_app(
        AppState {
            pool: unreachable_pool(),
            config,
            cache: ChargerCache::new(Duration::from_secs(300)),
        },
        rate_limit,
    );

    let (status, _) = get_json(app.clone(), "/api/v1/corridor/segments").await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = get_json(app, "/api/v1/corridor/waypoints").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = primed_app(Duration::from_secs(300), Vec::new()).await;
    let (status, json) = get_json(app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
}

// -------------------------------------------------------------------------
// Database-backed route tests
// -------------------------------------------------------------------------

fn live_app(pool: PgPool) -> Router {
    let config = Arc::new(test_config());
    let rate_limit = rate_limit_state(&config);
    build_app(
        AppState {
            pool,
            config,
            cache: ChargerCache::new(Duration::from_secs(300)),
        },
        rate_limit,
    )
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_returns_ok_with_database(pool: PgPool) {
    let (status, json) = get_json(live_app(pool), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["database"], "ok");
}

#[sqlx::test(migrations = "../../migrations")]
async fn reachable_reads_imported_chargers(pool: PgPool) {
    let orleans = find_waypoint("Orleans").expect("waypoint");
    let candidate = ChargerCandidate {
        ocm_id: 90_001,
        name: "Aire de Orleans Saran".to_string(),
        latitude: orleans.latitude,
        longitude: orleans.longitude,
        network: "Ionity".to_string(),
        power_kw: 350,
        connector_types: BTreeSet::from([ConnectorType::Ccs]),
        num_chargers: 6,
        route_segment: RouteSegment::ParisOrleans,
        country: "FR".to_string(),
    };
    echarger_db::insert_charger_candidates(&pool, &[candidate])
        .await
        .expect("insert");

    let (status, json) = get_json(
        live_app(pool),
        "/api/v1/chargers/reachable?city=Paris&range_km=150",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let chargers = json["data"]["chargers"].as_array().expect("chargers");
    assert_eq!(chargers.len(), 1);
    assert_eq!(chargers[0]["name"], "Aire de Orleans Saran");
    assert_eq!(chargers[0]["highway_proximity"], "near_exit");
    assert_eq!(chargers[0]["distance_km"].as_f64(), Some(111.0));
}
