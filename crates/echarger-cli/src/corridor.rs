use echarger_core::{SEGMENTS, WAYPOINTS};

pub(crate) fn print_segments() {
    println!(
        "{:<20}{:<24}{:<12}{:<8}BOUNDING BOX (lat, lng)",
        "SEGMENT", "NAME", "HIGHWAY", "COUNTRY"
    );
    for info in &SEGMENTS {
        println!(
            "{:<20}{:<24}{:<12}{:<8}{}..{}, {}..{}",
            info.segment.as_str(),
            info.name,
            info.highway,
            info.country,
            info.bbox.min_lat,
            info.bbox.max_lat,
            info.bbox.min_lng,
            info.bbox.max_lng
        );
    }
}

pub(crate) fn print_waypoints() {
    println!("{:<20}{:>10}{:>10}", "CITY", "LAT", "LNG");
    for wp in WAYPOINTS {
        println!("{:<20}{:>10.4}{:>10.4}", wp.name, wp.latitude, wp.longitude);
    }
}
