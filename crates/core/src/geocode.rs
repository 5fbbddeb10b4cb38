//! Place-name lookup results mapped to the search form's bbox convention.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::GeocodeHit;

/// A located place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    /// `[west, south, east, north]`, rounded to 4 decimals.
    pub bbox: [f64; 4],
    /// First component of the geocoder's display name.
    pub label: String,
}

impl GeocodeResult {
    /// Text for the bbox input, e.g. `"10.1234, 45.0000, 12.0000, 47.0000"`.
    pub fn bbox_text(&self) -> String {
        let [w, s, e, n] = self.bbox;
        format!("{w:.4}, {s:.4}, {e:.4}, {n:.4}")
    }
}

/// Take the first hit of a geocoder response.
///
/// The geocoder reports `[south, north, west, east]`; the result is
/// reordered to `[west, south, east, north]`.
pub fn first_hit(query: &str, hits: Vec<GeocodeHit>) -> Result<GeocodeResult> {
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| Error::GeocodeNotFound(query.to_string()))?;

    let parsed = hit
        .boundingbox
        .iter()
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| Error::GeocodeNotFound(query.to_string()))?;
    let &[south, north, west, east] = parsed.as_slice() else {
        return Err(Error::GeocodeNotFound(query.to_string()));
    };

    Ok(GeocodeResult {
        bbox: [round4(west), round4(south), round4(east), round4(north)],
        label: hit
            .display_name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
    })
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
