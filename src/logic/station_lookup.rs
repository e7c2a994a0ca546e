use crate::datasources::{GeocodingClient, StationFeed};
use crate::error::Result;
use crate::models::StationRecord;

/// A station near a looked-up address.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub terminal_name: String,
    pub name: String,
    /// Planar distance in degrees; `None` when the station has no coordinates.
    pub distance: Option<f64>,
}

/// Find the station a job would target, by terminal code.
pub fn find_station<'a>(stations: &'a [StationRecord], code: &str) -> Option<&'a StationRecord> {
    stations.iter().find(|s| s.terminal_name == code)
}

/// Rank stations by distance from `origin`. A `limit` of zero returns every
/// station; stations without coordinates sort last.
pub fn nearest_stations(
    stations: &[StationRecord],
    origin: (f64, f64),
    limit: usize,
) -> Vec<NearbyStation> {
    let mut ranked: Vec<NearbyStation> = stations
        .iter()
        .map(|s| NearbyStation {
            terminal_name: s.terminal_name.clone(),
            name: s.name.clone(),
            distance: s
                .coordinates()
                .map(|(lat, long)| (origin.0 - lat).hypot(origin.1 - long)),
        })
        .collect();

    ranked.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    if limit > 0 {
        ranked.truncate(limit);
    }
    ranked
}

/// Geocode `address` and list the closest stations from a fresh snapshot.
/// An address the geocoder cannot place yields an empty list.
pub async fn lookup_by_address<F: StationFeed + ?Sized>(
    feed: &F,
    geocoder: &GeocodingClient,
    address: &str,
    limit: usize,
) -> Result<Vec<NearbyStation>> {
    let coordinates = geocoder.resolve(address).await?;
    let Some(origin) = coordinates.as_pair() else {
        return Ok(Vec::new());
    };

    let stations = feed.refresh().await?;
    Ok(nearest_stations(&stations, origin, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn station(code: &str, lat: Option<f64>, long: Option<f64>) -> StationRecord {
        let mut fields = BTreeMap::new();
        fields.insert("terminalName".to_string(), code.to_string());
        fields.insert("name".to_string(), format!("Station {}", code));
        fields.insert("nbBikes".to_string(), "5".to_string());
        fields.insert("nbEmptyDocks".to_string(), "5".to_string());
        if let Some(lat) = lat {
            fields.insert("lat".to_string(), lat.to_string());
        }
        if let Some(long) = long {
            fields.insert("long".to_string(), long.to_string());
        }
        StationRecord::from_fields(fields).unwrap()
    }

    fn snapshot() -> Vec<StationRecord> {
        vec![
            station("31000", Some(38.90), Some(-77.00)),
            station("31001", None, None),
            station("31002", Some(38.80), Some(-77.10)),
            station("31003", Some(38.85), Some(-77.05)),
        ]
    }

    #[test]
    fn find_station_matches_terminal_code() {
        let stations = snapshot();
        assert_eq!(
            find_station(&stations, "31002").map(|s| s.terminal_name.as_str()),
            Some("31002")
        );
        assert!(find_station(&stations, "99999").is_none());
    }

    #[test]
    fn nearest_first() {
        let ranked = nearest_stations(&snapshot(), (38.81, -77.09), 2);
        let codes: Vec<&str> = ranked.iter().map(|s| s.terminal_name.as_str()).collect();
        assert_eq!(codes, vec!["31002", "31003"]);
        assert!(ranked[0].distance.unwrap() < ranked[1].distance.unwrap());
    }

    #[test]
    fn zero_limit_returns_all_with_unlocated_last() {
        let ranked = nearest_stations(&snapshot(), (38.90, -77.00), 0);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].terminal_name, "31000");
        assert_eq!(ranked[0].distance, Some(0.0));
        assert_eq!(ranked[3].terminal_name, "31001");
        assert_eq!(ranked[3].distance, None);
    }
}
