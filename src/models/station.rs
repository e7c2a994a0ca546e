use crate::error::{BikeAlertError, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// One physical dock location as reported by the station feed.
///
/// Every child element of the feed's station node is kept in `fields`;
/// the typed members are the ones the alert loop and lookup utility read.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub terminal_name: String,
    pub nb_bikes: u32,
    pub nb_empty_docks: u32,
    /// Milliseconds since the Unix epoch, as published by the feed.
    pub latest_update_time: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fields: BTreeMap<String, String>,
}

impl StationRecord {
    pub fn from_fields(fields: BTreeMap<String, String>) -> Result<Self> {
        let terminal_name = required(&fields, "terminalName")?.to_string();
        let nb_bikes = parse_count(&fields, &terminal_name, "nbBikes")?;
        let nb_empty_docks = parse_count(&fields, &terminal_name, "nbEmptyDocks")?;

        let latest_update_time = optional(&fields, "latestUpdateTime")
            .map(|v| {
                v.parse::<i64>().map_err(|_| {
                    BikeAlertError::InvalidData(format!(
                        "station {}: <latestUpdateTime> is not a millisecond timestamp: '{}'",
                        terminal_name, v
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            id: optional(&fields, "id").unwrap_or_default().to_string(),
            name: optional(&fields, "name").unwrap_or_default().to_string(),
            terminal_name,
            nb_bikes,
            nb_empty_docks,
            latest_update_time,
            latitude: optional(&fields, "lat").and_then(|v| v.parse().ok()),
            longitude: optional(&fields, "long").and_then(|v| v.parse().ok()),
            fields,
        })
    }

    /// Raw text of any feed element, by tag name.
    pub fn field(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        let ms = self.latest_update_time?;
        DateTime::from_timestamp_millis(ms).map(|utc| utc.with_timezone(&Local))
    }

    pub fn last_updated_display(&self) -> String {
        self.last_updated()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn optional<'a>(fields: &'a BTreeMap<String, String>, tag: &str) -> Option<&'a str> {
    fields
        .get(tag)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required<'a>(fields: &'a BTreeMap<String, String>, tag: &str) -> Result<&'a str> {
    optional(fields, tag)
        .ok_or_else(|| BikeAlertError::InvalidData(format!("station is missing <{}>", tag)))
}

fn parse_count(fields: &BTreeMap<String, String>, station: &str, tag: &str) -> Result<u32> {
    let value = optional(fields, tag).ok_or_else(|| {
        BikeAlertError::InvalidData(format!("station {}: missing <{}>", station, tag))
    })?;
    value.parse::<u32>().map_err(|_| {
        BikeAlertError::InvalidData(format!(
            "station {}: <{}> is not a count: '{}'",
            station, tag, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_typed_fields() {
        let station = StationRecord::from_fields(fields(&[
            ("id", "1"),
            ("name", "20th & Bell St"),
            ("terminalName", "31000"),
            ("nbBikes", "7"),
            ("nbEmptyDocks", " 4 "),
            ("latestUpdateTime", "1400000000000"),
            ("lat", "38.8561"),
            ("long", "-77.0512"),
            ("installed", "true"),
        ]))
        .unwrap();

        assert_eq!(station.id, "1");
        assert_eq!(station.terminal_name, "31000");
        assert_eq!(station.nb_bikes, 7);
        assert_eq!(station.nb_empty_docks, 4);
        assert_eq!(station.latest_update_time, Some(1_400_000_000_000));
        assert_eq!(station.coordinates(), Some((38.8561, -77.0512)));
        assert_eq!(station.field("installed"), Some("true"));
    }

    #[test]
    fn missing_terminal_name_is_invalid() {
        let err = StationRecord::from_fields(fields(&[("nbBikes", "1"), ("nbEmptyDocks", "1")]))
            .unwrap_err();
        assert!(err.to_string().contains("terminalName"), "got: {err}");
    }

    #[test]
    fn non_numeric_count_names_the_station() {
        let err = StationRecord::from_fields(fields(&[
            ("terminalName", "31001"),
            ("nbBikes", "many"),
            ("nbEmptyDocks", "1"),
        ]))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("31001") && msg.contains("nbBikes"), "got: {msg}");
    }

    #[test]
    fn blank_update_time_is_unknown() {
        let station = StationRecord::from_fields(fields(&[
            ("terminalName", "31002"),
            ("nbBikes", "0"),
            ("nbEmptyDocks", "12"),
            ("latestUpdateTime", ""),
        ]))
        .unwrap();

        assert!(station.last_updated().is_none());
        assert_eq!(station.last_updated_display(), "unknown");
        assert!(station.coordinates().is_none());
    }

    #[test]
    fn update_time_is_formatted_locally() {
        let station = StationRecord::from_fields(fields(&[
            ("terminalName", "31003"),
            ("nbBikes", "2"),
            ("nbEmptyDocks", "9"),
            ("latestUpdateTime", "1400000000000"),
        ]))
        .unwrap();

        let expected = DateTime::from_timestamp_millis(1_400_000_000_000)
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(station.last_updated_display(), expected);
    }
}
