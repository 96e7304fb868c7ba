//! Corridor sweep: fetch each segment's POIs in turn, plan the import, and
//! hand the accepted candidates to a caller-supplied store step.
//!
//! A segment whose fetch fails is recorded as skipped and the sweep moves
//! on. An error from the store step ends the sweep.

use std::{future::Future, time::Duration};

use echarger_core::{AppConfig, ChargerCandidate, RouteSegment, SegmentInfo, SiteFingerprint};

use crate::client::OcmClient;
use crate::import::plan_segment_import;

/// Request and filter knobs for one sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub max_results: u32,
    pub min_power_kw: u32,
    pub threshold_kw: u32,
    pub inter_request_delay: Duration,
}

impl SweepSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_results: config.ocm_max_results,
            min_power_kw: config.ocm_min_power_kw,
            threshold_kw: config.fast_charge_threshold_kw,
            inter_request_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
        }
    }
}

/// What happened to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    Skipped {
        segment: RouteSegment,
        error: String,
    },
    Swept {
        segment: RouteSegment,
        fetched: usize,
        below_threshold: usize,
        invalid: usize,
        duplicates: usize,
        accepted: usize,
        stored: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub outcomes: Vec<SegmentOutcome>,
}

impl SweepReport {
    #[must_use]
    pub fn segments_processed(&self) -> usize {
        self.swept().count()
    }

    #[must_use]
    pub fn segments_skipped(&self) -> usize {
        self.outcomes.len() - self.segments_processed()
    }

    #[must_use]
    pub fn pois_fetched(&self) -> usize {
        self.swept().map(|(fetched, _)| fetched).sum()
    }

    #[must_use]
    pub fn chargers_stored(&self) -> usize {
        self.swept().map(|(_, stored)| stored).sum()
    }

    fn swept(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SegmentOutcome::Swept {
                fetched, stored, ..
            } => Some((*fetched, *stored)),
            SegmentOutcome::Skipped { .. } => None,
        })
    }
}

/// Sweep `segments` in order, sleeping `inter_request_delay` between
/// requests.
///
/// `known` is extended with every accepted site, so later segments dedup
/// against earlier ones. `store` receives each segment's accepted
/// candidates and returns how many it kept.
///
/// # Errors
///
/// Returns the first error `store` produces. Fetch failures are not errors;
/// they show up as [`SegmentOutcome::Skipped`].
pub async fn sweep_segments<F, Fut, E>(
    client: &OcmClient,
    segments: &[&SegmentInfo],
    settings: SweepSettings,
    known: &mut Vec<SiteFingerprint>,
    mut store: F,
) -> Result<SweepReport, E>
where
    F: FnMut(Vec<ChargerCandidate>) -> Fut,
    Fut: Future<Output = Result<usize, E>>,
{
    let mut report = SweepReport::default();

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && !settings.inter_request_delay.is_zero() {
            tokio::time::sleep(settings.inter_request_delay).await;
        }

        let pois = match client
            .fetch_pois(&segment.bbox, settings.max_results, settings.min_power_kw)
            .await
        {
            Ok(pois) => pois,
            Err(e) => {
                tracing::warn!(
                    segment = %segment.segment,
                    error = %e,
                    "POI fetch failed; skipping segment"
                );
                report.outcomes.push(SegmentOutcome::Skipped {
                    segment: segment.segment,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let plan = plan_segment_import(&pois, segment, settings.threshold_kw, known);
        let accepted = plan.accepted.len();
        let stored = store(plan.accepted).await?;

        tracing::info!(
            segment = %segment.segment,
            fetched = plan.fetched,
            below_threshold = plan.below_threshold,
            invalid = plan.invalid,
            duplicates = plan.duplicates,
            accepted,
            stored,
            "segment swept"
        );

        report.outcomes.push(SegmentOutcome::Swept {
            segment: segment.segment,
            fetched: plan.fetched,
            below_threshold: plan.below_threshold,
            invalid: plan.invalid,
            duplicates: plan.duplicates,
            accepted,
            stored,
        });
    }

    Ok(report)
}
