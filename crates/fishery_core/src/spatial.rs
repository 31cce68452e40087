//! Spatial distribution of catch: 0.01° hotspot grid, catch-weighted centroid and mean
//! spread radius.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::records::{catch_for_species, validate_catch_records, CatchRecord, DateRange};

const GRID_CELLS_PER_DEGREE: f64 = 100.0;
const MAX_HOTSPOTS: usize = 10;
const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Hotspot {
    pub latitude: f64,
    pub longitude: f64,
    pub total_catch: f64,
    pub record_count: usize,
    /// Fraction of the located catch taken in this cell.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialDistribution {
    pub species: String,
    pub period: Option<DateRange>,
    pub located_records: usize,
    pub total_catch: f64,
    pub grid_cells: usize,
    /// Up to ten cells ranked by summed catch.
    pub hotspots: Vec<Hotspot>,
    pub centroid: Option<Centroid>,
    /// Mean distance of located records from the centroid, in km.
    pub spread_radius_km: f64,
}

/// Only records carrying both latitude and longitude (and inside `period`, when given)
/// take part.
pub fn analyze_spatial_distribution(
    records: &[CatchRecord],
    species: &str,
    period: Option<DateRange>,
) -> Result<SpatialDistribution> {
    validate_catch_records(records)?;

    let located: Vec<(f64, f64, f64)> = catch_for_species(records, Some(species))
        .into_iter()
        .filter(|r| period.map_or(true, |p| p.contains(r.date)))
        .filter_map(|r| {
            let (lat, lon) = r.location.as_ref()?.coordinates()?;
            Some((lat, lon, r.catch_amount))
        })
        .collect();

    let mut cells: BTreeMap<(i64, i64), (f64, usize)> = BTreeMap::new();
    for &(lat, lon, catch_amount) in &located {
        let key = (
            (lat * GRID_CELLS_PER_DEGREE).round() as i64,
            (lon * GRID_CELLS_PER_DEGREE).round() as i64,
        );
        let cell = cells.entry(key).or_default();
        cell.0 += catch_amount;
        cell.1 += 1;
    }

    let total_catch: f64 = located.iter().map(|(_, _, c)| c).sum();
    let grid_cells = cells.len();
    let mut hotspots: Vec<Hotspot> = cells
        .into_iter()
        .map(|((lat_key, lon_key), (cell_catch, count))| Hotspot {
            latitude: lat_key as f64 / GRID_CELLS_PER_DEGREE,
            longitude: lon_key as f64 / GRID_CELLS_PER_DEGREE,
            total_catch: cell_catch,
            record_count: count,
            share: if total_catch > 0.0 {
                cell_catch / total_catch
            } else {
                0.0
            },
        })
        .collect();
    hotspots.sort_by(|a, b| {
        b.total_catch
            .partial_cmp(&a.total_catch)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hotspots.truncate(MAX_HOTSPOTS);

    let centroid = centroid_of(&located, total_catch);
    let spread_radius_km = centroid.map_or(0.0, |c| {
        let cos_lat = c.latitude.to_radians().cos();
        let distances: Vec<f64> = located
            .iter()
            .map(|&(lat, lon, _)| {
                let dy = (lat - c.latitude) * KM_PER_DEGREE;
                let dx = (lon - c.longitude) * KM_PER_DEGREE * cos_lat;
                (dx * dx + dy * dy).sqrt()
            })
            .collect();
        crate::stats::mean(&distances)
    });

    if located.is_empty() {
        log::debug!("no located catch records for `{species}`");
    }

    Ok(SpatialDistribution {
        species: species.to_string(),
        period,
        located_records: located.len(),
        total_catch,
        grid_cells,
        hotspots,
        centroid,
        spread_radius_km,
    })
}

/// Catch-weighted mean position; unweighted when the total catch is zero.
fn centroid_of(located: &[(f64, f64, f64)], total_catch: f64) -> Option<Centroid> {
    if located.is_empty() {
        return None;
    }
    if total_catch > 0.0 {
        let (lat, lon) = located
            .iter()
            .fold((0.0, 0.0), |(a, b), &(lat, lon, c)| (a + lat * c, b + lon * c));
        Some(Centroid {
            latitude: lat / total_catch,
            longitude: lon / total_catch,
        })
    } else {
        let n = located.len() as f64;
        let (lat, lon) = located
            .iter()
            .fold((0.0, 0.0), |(a, b), &(lat, lon, _)| (a + lat, b + lon));
        Some(Centroid {
            latitude: lat / n,
            longitude: lon / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::{catch, date};
    use crate::records::Location;

    fn located(lat: f64, lon: f64, catch_amount: f64) -> CatchRecord {
        let mut record = catch("Tuna", date(2024, 2, 1), catch_amount, 1.0);
        record.location = Some(Location {
            latitude: Some(lat),
            longitude: Some(lon),
            ..Location::default()
        });
        record
    }

    #[test]
    fn hotspots_merge_nearby_positions() {
        let records = vec![
            located(10.001, 76.002, 30.0),
            located(10.004, 76.001, 20.0),
            located(11.0, 77.0, 10.0),
            catch("Tuna", date(2024, 2, 1), 99.0, 1.0),
        ];
        let spatial = analyze_spatial_distribution(&records, "tuna", None).expect("spatial");
        assert_eq!(spatial.located_records, 3);
        assert_eq!(spatial.grid_cells, 2);
        assert_eq!(spatial.hotspots[0].total_catch, 50.0);
        assert_eq!(spatial.hotspots[0].record_count, 2);
        assert!((spatial.hotspots[0].latitude - 10.0).abs() < 1e-12);
        assert!((spatial.hotspots[0].share - 50.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_is_catch_weighted() {
        let records = vec![located(0.0, 0.0, 30.0), located(1.0, 0.0, 10.0)];
        let spatial = analyze_spatial_distribution(&records, "Tuna", None).expect("spatial");
        let centroid = spatial.centroid.expect("centroid");
        assert!((centroid.latitude - 0.25).abs() < 1e-12);
        assert_eq!(centroid.longitude, 0.0);
        // Distances 0.25 and 0.75 degrees of latitude.
        assert!((spatial.spread_radius_km - 0.5 * 111.0).abs() < 1e-9);
    }

    #[test]
    fn period_filter_and_empty_result() {
        let records = vec![located(5.0, 5.0, 10.0)];
        let window = DateRange {
            start: date(2023, 1, 1),
            end: date(2023, 12, 31),
        };
        let spatial =
            analyze_spatial_distribution(&records, "Tuna", Some(window)).expect("spatial");
        assert_eq!(spatial.located_records, 0);
        assert!(spatial.centroid.is_none());
        assert!(spatial.hotspots.is_empty());
        assert_eq!(spatial.spread_radius_km, 0.0);
    }

    #[test]
    fn hotspots_are_capped_at_ten() {
        let records: Vec<CatchRecord> = (0..15)
            .map(|i| located(i as f64, 0.0, 1.0 + i as f64))
            .collect();
        let spatial = analyze_spatial_distribution(&records, "Tuna", None).expect("spatial");
        assert_eq!(spatial.grid_cells, 15);
        assert_eq!(spatial.hotspots.len(), 10);
        assert_eq!(spatial.hotspots[0].total_catch, 15.0);
    }
}
