//! `ingest`: sweep corridor segments on OpenChargeMap and store new fast
//! chargers.
//!
//! A segment whose fetch fails is reported and skipped; database write
//! failures abort the run and mark it failed.

use echarger_core::{
    AppConfig, ChargerCandidate, RouteSegment, SegmentInfo, SiteFingerprint, SEGMENTS,
};
use echarger_db::IngestRunCounts;
use echarger_scraper::{sweep_segments, OcmClient, SegmentOutcome, SweepReport, SweepSettings};

fn segments_to_sweep(segment: Option<RouteSegment>) -> anyhow::Result<Vec<&'static SegmentInfo>> {
    match segment {
        Some(segment) => {
            let info = segment
                .info()
                .ok_or_else(|| anyhow::anyhow!("segment '{segment}' has no bounding box"))?;
            Ok(vec![info])
        }
        None => Ok(SEGMENTS.iter().collect()),
    }
}

fn print_report(report: &SweepReport, threshold_kw: u32) {
    for outcome in &report.outcomes {
        match outcome {
            SegmentOutcome::Skipped { segment, error } => {
                println!("{:<20}fetch failed: {error}", segment.as_str());
            }
            SegmentOutcome::Swept {
                segment,
                fetched,
                below_threshold,
                duplicates,
                accepted,
                ..
            } => println!(
                "{:<20}fetched {fetched:>4}  below {threshold_kw} kW {below_threshold:>4}  duplicate {duplicates:>4}  new {accepted:>4}",
                segment.as_str()
            ),
        }
    }
}

async fn sweep(
    pool: &sqlx::PgPool,
    client: &OcmClient,
    config: &AppConfig,
    segments: &[&SegmentInfo],
    known: &mut Vec<SiteFingerprint>,
    dry_run: bool,
) -> anyhow::Result<SweepReport> {
    let settings = SweepSettings::from_app_config(config);

    let report = if dry_run {
        sweep_segments(client, segments, settings, known, |accepted: Vec<ChargerCandidate>| {
            for candidate in &accepted {
                println!(
                    "  would add: {} ({}, {} kW, {} points)",
                    candidate.name, candidate.network, candidate.power_kw, candidate.num_chargers
                );
            }
            std::future::ready(Ok::<usize, sqlx::Error>(0))
        })
        .await?
    } else {
        sweep_segments(client, segments, settings, known, |accepted| async move {
            let inserted = echarger_db::insert_charger_candidates(pool, &accepted).await?;
            Ok::<_, sqlx::Error>(usize::try_from(inserted).unwrap_or(usize::MAX))
        })
        .await?
    };

    print_report(&report, config.fast_charge_threshold_kw);
    Ok(report)
}

/// Import new fast chargers for one segment or the whole corridor.
///
/// With `dry_run` the stored chargers are still read for duplicate checks,
/// but nothing is written and no ingest run is recorded.
///
/// # Errors
///
/// Returns an error if the OCM client cannot be built, known sites cannot be
/// loaded, the ingest run cannot be recorded, or an insert fails.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    segment: Option<RouteSegment>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let segments = segments_to_sweep(segment)?;
    let client = OcmClient::from_app_config(config)?;
    if config.ocm_api_key.is_none() {
        tracing::warn!("OPENCHARGEMAP_API_KEY not set; anonymous requests are heavily throttled");
    }

    let mut known = echarger_db::list_known_sites(pool).await?;
    println!("{} chargers already stored", known.len());

    if dry_run {
        let report = sweep(pool, &client, config, &segments, &mut known, true).await?;
        println!(
            "dry-run: {} segment(s) swept, {} POIs fetched; nothing written",
            report.segments_processed(),
            report.pois_fetched()
        );
        return Ok(());
    }

    let run = echarger_db::create_ingest_run(pool, "cli").await?;
    if let Err(e) = echarger_db::start_ingest_run(pool, run.id).await {
        crate::fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    match sweep(pool, &client, config, &segments, &mut known, false).await {
        Ok(report) => {
            let counts = IngestRunCounts::new(
                report.segments_processed(),
                report.pois_fetched(),
                report.chargers_stored(),
            );
            if let Err(err) = echarger_db::complete_ingest_run(pool, run.id, counts).await {
                crate::fail_run_best_effort(pool, run.id, format!("{err:#}")).await;
                return Err(err.into());
            }
            println!(
                "ingested {} new chargers from {} segment(s) ({} POIs fetched)",
                counts.chargers_inserted, counts.segments_processed, counts.pois_fetched
            );
            Ok(())
        }
        Err(err) => {
            crate::fail_run_best_effort(pool, run.id, format!("{err:#}")).await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_corridor_is_swept_north_to_south() {
        let segments = segments_to_sweep(None).expect("segments");
        assert_eq!(segments.len(), 9);
        assert_eq!(segments[0].segment, RouteSegment::NlBe);
        assert_eq!(segments[8].segment, RouteSegment::ValenciaSantaPola);
    }

    #[test]
    fn single_segment_sweep() {
        let segments = segments_to_sweep(Some(RouteSegment::MillauEs)).expect("segments");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].highway, "A75 / A9");
    }

    #[test]
    fn unknown_segment_cannot_be_swept() {
        assert!(segments_to_sweep(Some(RouteSegment::Unknown)).is_err());
    }
}
