//! Per-segment import planning: threshold, normalize, dedup.

use echarger_core::{is_duplicate, ChargerCandidate, SegmentInfo, SiteFingerprint};

use crate::normalize::{max_power_kw, normalize_poi};
use crate::types::OcmPoi;

/// What one segment's fetch turned into.
#[derive(Debug, Default)]
pub struct SegmentImport {
    pub fetched: usize,
    pub below_threshold: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub accepted: Vec<ChargerCandidate>,
}

/// Decide which of `pois` are new fast chargers for `segment`.
///
/// A POI is accepted when its best connection reaches `threshold_kw`, it
/// normalizes cleanly, and it does not duplicate anything in `known`.
/// Each accepted site is appended to `known` right away, so the same site
/// seen twice (in one response or across overlapping segment boxes) is
/// only accepted once.
pub fn plan_segment_import(
    pois: &[OcmPoi],
    segment: &SegmentInfo,
    threshold_kw: u32,
    known: &mut Vec<SiteFingerprint>,
) -> SegmentImport {
    let mut plan = SegmentImport {
        fetched: pois.len(),
        ..SegmentImport::default()
    };

    for poi in pois {
        if max_power_kw(poi.connections()) < f64::from(threshold_kw) {
            plan.below_threshold += 1;
            continue;
        }

        let candidate = match normalize_poi(poi, segment) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(segment = %segment.segment, error = %e, "skipping unusable POI");
                plan.invalid += 1;
                continue;
            }
        };

        let fingerprint = SiteFingerprint::from(&candidate);
        if is_duplicate(&fingerprint, known) {
            plan.duplicates += 1;
            continue;
        }

        known.push(fingerprint);
        plan.accepted.push(candidate);
    }

    plan
}

#[cfg(test)]
mod tests {
    use echarger_core::RouteSegment;

    use super::*;
    use crate::types::{OcmAddressInfo, OcmConnection};

    fn poi(id: i64, title: &str, lat: f64, lng: f64, kw: f64) -> OcmPoi {
        OcmPoi {
            id,
            address_info: Some(OcmAddressInfo {
                title: Some(title.to_owned()),
                latitude: Some(lat),
                longitude: Some(lng),
            }),
            operator_info: None,
            connections: Some(vec![OcmConnection {
                power_kw: Some(kw),
                connection_type_id: Some(33),
            }]),
            number_of_points: Some(4),
        }
    }

    fn nl_be() -> &'static SegmentInfo {
        RouteSegment::NlBe.info().expect("info")
    }

    #[test]
    fn slow_sites_are_skipped() {
        let pois = vec![
            poi(1, "Slow Site", 51.6, 4.5, 149.9),
            poi(2, "Fast Site", 51.8, 4.6, 150.0),
        ];
        let mut known = Vec::new();
        let plan = plan_segment_import(&pois, nl_be(), 150, &mut known);
        assert_eq!(plan.fetched, 2);
        assert_eq!(plan.below_threshold, 1);
        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.accepted[0].ocm_id, 2);
    }

    #[test]
    fn known_sites_are_duplicates() {
        let mut known = vec![SiteFingerprint::new("Fastned Breda", Some(51.57), Some(4.77))];
        let pois = vec![poi(1, "Fastned A16 Breda", 51.571, 4.771, 300.0)];
        let plan = plan_segment_import(&pois, nl_be(), 150, &mut known);
        assert_eq!(plan.duplicates, 1);
        assert!(plan.accepted.is_empty());
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn repeated_site_in_one_response_is_accepted_once() {
        let pois = vec![
            poi(1, "Ionity Hazeldonk", 51.49, 4.74, 350.0),
            poi(2, "Ionity Hazeldonk", 51.49, 4.74, 350.0),
        ];
        let mut known = Vec::new();
        let plan = plan_segment_import(&pois, nl_be(), 150, &mut known);
        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.duplicates, 1);
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn unusable_pois_are_counted_not_fatal() {
        let mut broken = poi(3, "Broken", 51.5, 4.5, 300.0);
        broken.address_info = None;
        let pois = vec![broken, poi(4, "Tesla Supercharger Breda", 51.58, 4.79, 250.0)];
        let mut known = Vec::new();
        let plan = plan_segment_import(&pois, nl_be(), 150, &mut known);
        assert_eq!(plan.invalid, 1);
        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.accepted[0].country, "NL");
    }
}
