use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Approximate country centroid as (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub lon: f64,
    pub lat: f64,
}

// Bounding box used by the map canvas (Europe scope).
pub const EUROPE_LON: [f64; 2] = [-25.0, 45.0];
pub const EUROPE_LAT: [f64; 2] = [34.0, 72.0];

static CENTROIDS: Lazy<HashMap<&'static str, Centroid>> = Lazy::new(|| {
    let raw: &[(&str, f64, f64)] = &[
        ("albania", 20.0, 41.1),
        ("austria", 14.6, 47.6),
        ("belgium", 4.6, 50.6),
        ("bosnia and herzegovina", 17.8, 44.2),
        ("bulgaria", 25.5, 42.7),
        ("croatia", 16.4, 45.1),
        ("czech republic", 15.3, 49.8),
        ("czechia", 15.3, 49.8),
        ("denmark", 9.5, 56.0),
        ("england", -1.5, 52.8),
        ("estonia", 25.0, 58.6),
        ("finland", 26.0, 64.5),
        ("france", 2.4, 46.6),
        ("georgia", 43.4, 42.2),
        ("germany", 10.4, 51.1),
        ("greece", 22.0, 39.1),
        ("hungary", 19.4, 47.2),
        ("iceland", -18.6, 64.9),
        ("ireland", -8.0, 53.2),
        ("italy", 12.6, 42.8),
        ("netherlands", 5.3, 52.2),
        ("northern ireland", -6.6, 54.6),
        ("north macedonia", 21.7, 41.6),
        ("norway", 9.0, 61.0),
        ("poland", 19.4, 52.1),
        ("portugal", -8.2, 39.6),
        ("romania", 25.0, 45.9),
        ("scotland", -4.2, 56.8),
        ("serbia", 20.9, 44.0),
        ("slovakia", 19.7, 48.7),
        ("slovenia", 14.8, 46.1),
        ("spain", -3.7, 40.2),
        ("sweden", 16.0, 62.0),
        ("switzerland", 8.2, 46.8),
        ("turkey", 35.2, 39.0),
        ("türkiye", 35.2, 39.0),
        ("turkiye", 35.2, 39.0),
        ("ukraine", 31.2, 49.0),
        ("wales", -3.8, 52.3),
    ];
    raw.iter()
        .map(|(name, lon, lat)| (*name, Centroid { lon: *lon, lat: *lat }))
        .collect()
});

/// Looks a team up by country name, case-insensitively.
pub fn centroid(team: &str) -> Option<Centroid> {
    CENTROIDS.get(team.trim().to_lowercase().as_str()).copied()
}
