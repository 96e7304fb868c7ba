//! Duplicate detection between freshly fetched POIs and known sites.

use crate::charger::{ChargerCandidate, ChargerRecord};

/// Two sites closer than this on both axes are the same site.
pub const COORDINATE_TOLERANCE_DEG: f64 = 0.005;

/// Length of the lowercased name prefix used for fuzzy name matching.
pub const NAME_PREFIX_CHARS: usize = 15;

/// The fields the duplicate check compares.
///
/// Stored rows may lack coordinates, so both are optional here; a missing
/// coordinate never matches on proximity but can still match on name.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteFingerprint {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SiteFingerprint {
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

impl From<&ChargerRecord> for SiteFingerprint {
    fn from(record: &ChargerRecord) -> Self {
        Self::new(
            record.name.clone(),
            Some(record.latitude),
            Some(record.longitude),
        )
    }
}

impl From<&ChargerCandidate> for SiteFingerprint {
    fn from(candidate: &ChargerCandidate) -> Self {
        Self::new(
            candidate.name.clone(),
            Some(candidate.latitude),
            Some(candidate.longitude),
        )
    }
}

/// `true` when `candidate` matches any entry of `existing`, either by
/// position (within [`COORDINATE_TOLERANCE_DEG`] on both axes) or by name
/// (the first [`NAME_PREFIX_CHARS`] lowercased characters of one name occur
/// in the other). Stops at the first match.
#[must_use]
pub fn is_duplicate(candidate: &SiteFingerprint, existing: &[SiteFingerprint]) -> bool {
    let candidate_name = candidate.name.to_lowercase();
    existing
        .iter()
        .any(|known| same_position(candidate, known) || names_overlap(&candidate_name, known))
}

fn same_position(a: &SiteFingerprint, b: &SiteFingerprint) -> bool {
    match (a.latitude, a.longitude, b.latitude, b.longitude) {
        (Some(lat_a), Some(lng_a), Some(lat_b), Some(lng_b)) => {
            (lat_a - lat_b).abs() < COORDINATE_TOLERANCE_DEG
                && (lng_a - lng_b).abs() < COORDINATE_TOLERANCE_DEG
        }
        _ => false,
    }
}

fn names_overlap(candidate_name: &str, known: &SiteFingerprint) -> bool {
    let known_name = known.name.to_lowercase();
    if candidate_name.is_empty() || known_name.is_empty() {
        return false;
    }
    known_name.contains(prefix(candidate_name)) || candidate_name.contains(prefix(&known_name))
}

/// First [`NAME_PREFIX_CHARS`] characters, cut on a char boundary.
fn prefix(name: &str) -> &str {
    match name.char_indices().nth(NAME_PREFIX_CHARS) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, lat: f64, lng: f64) -> SiteFingerprint {
        SiteFingerprint::new(name, Some(lat), Some(lng))
    }

    #[test]
    fn same_coordinates_are_duplicates() {
        let known = vec![site("Fastned Breda", 51.5719, 4.7683)];
        let candidate = site("Totally different", 51.5740, 4.7700);
        assert!(is_duplicate(&candidate, &known));
    }

    #[test]
    fn distant_sites_with_unrelated_names_are_not_duplicates() {
        let known = vec![site("Fastned Breda", 51.5719, 4.7683)];
        let candidate = site("Ionity Antwerp", 51.2194, 4.4025);
        assert!(!is_duplicate(&candidate, &known));
    }

    #[test]
    fn tolerance_is_exclusive_per_axis() {
        let known = vec![site("A", 50.0, 4.0)];
        assert!(!is_duplicate(&site("B", 50.006, 4.0), &known));
        assert!(!is_duplicate(&site("B", 50.0, 4.006), &known));
        assert!(is_duplicate(&site("B", 50.004, 3.996), &known));
    }

    #[test]
    fn fifteen_char_prefix_contained_in_other_name_matches() {
        // "ionity aire de " is the 15-char prefix of the candidate.
        let known = vec![site("IONITY Aire de Vemars Est", 49.07, 2.56)];
        let candidate = site("Ionity Aire de Lozere", 44.5, 3.2);
        assert!(is_duplicate(&candidate, &known));
    }

    #[test]
    fn name_match_works_in_either_direction() {
        let known = vec![site("Tesla Supercharger", 45.0, 3.0)];
        let candidate = site("Parking Tesla Supercharger Millau", 44.1, 3.08);
        assert!(is_duplicate(&candidate, &known));
    }

    #[test]
    fn short_names_match_when_wholly_contained() {
        let known = vec![site("Allego Hub Paris Nord", 48.9, 2.35)];
        let candidate = site("Allego", 47.0, 1.0);
        assert!(is_duplicate(&candidate, &known));
    }

    #[test]
    fn empty_names_never_match_by_name() {
        let known = vec![site("", 45.0, 3.0)];
        assert!(!is_duplicate(&site("", 40.0, 0.0), &known));
        assert!(!is_duplicate(&site("Anything", 40.0, 0.0), &known));
    }

    #[test]
    fn missing_coordinates_only_match_by_name() {
        let known = vec![SiteFingerprint::new("Fastned Breda", None, None)];
        assert!(!is_duplicate(&site("Other", 51.5719, 4.7683), &known));
        assert!(is_duplicate(&site("fastned breda", 0.0, 0.0), &known));
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_name() {
        let known = vec![site("Fastned ", 51.0, 4.0)];
        assert!(!is_duplicate(&site(" Fastned", 45.0, 3.0), &known));
        assert!(is_duplicate(&site("fastned ", 45.0, 3.0), &known));
    }

    #[test]
    fn empty_known_set_has_no_duplicates() {
        assert!(!is_duplicate(&site("Anything", 50.0, 4.0), &[]));
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        assert_eq!(prefix("ééééééééééééééééé").chars().count(), NAME_PREFIX_CHARS);
        assert_eq!(prefix("short"), "short");
    }
}
