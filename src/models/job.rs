use super::ConditionKind;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Daily time-of-day range during which a job may alert.
///
/// When `end` is earlier than `start` the window crosses midnight: a
/// 22:00-02:00 window opens at 22:00 and closes at 02:00 the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ActiveWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        let parse = |label: &str, value: &str| {
            NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
                .map_err(|_| format!("{} '{}' is not a HH:MM:SS time", label, value))
        };
        Ok(Self::new(parse("Start", start)?, parse("End", end)?))
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    /// The window instance that opens on `date`.
    pub fn bounds_on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let start = date.and_time(self.start);
        let mut end = date.and_time(self.end);
        if self.wraps_midnight() {
            end += Duration::days(1);
        }
        (start, end)
    }

    /// Whether `now` falls inside the instance opening today or, for windows
    /// that cross midnight, the one that opened yesterday.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        let today = now.date();
        let within = |date: NaiveDate| {
            let (start, end) = self.bounds_on(date);
            start <= now && now <= end
        };

        if within(today) {
            return true;
        }

        self.wraps_midnight() && today.pred_opt().is_some_and(within)
    }
}

impl std::fmt::Display for ActiveWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// One alerting rule for one station.
///
/// A threshold of zero leaves that dimension unmonitored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawJob")]
pub struct Job {
    pub station_id: String,
    pub window: ActiveWindow,
    pub bike_less_than: u32,
    pub dock_less_than: u32,
}

impl Job {
    pub fn threshold(&self, kind: ConditionKind) -> Option<u32> {
        let value = match kind {
            ConditionKind::Bikes => self.bike_less_than,
            ConditionKind::Docks => self.dock_less_than,
        };
        (value > 0).then_some(value)
    }
}

// Job entries as written in conf.json. `null` counts as missing.
#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(rename = "Start")]
    start: Option<String>,
    #[serde(rename = "End")]
    end: Option<String>,
    #[serde(rename = "StationID")]
    station_id: Option<Value>,
    #[serde(rename = "BikeLessThan")]
    bike_less_than: Option<Value>,
    #[serde(rename = "DockLessThan")]
    dock_less_than: Option<Value>,
}

impl TryFrom<RawJob> for Job {
    type Error = String;

    fn try_from(raw: RawJob) -> Result<Self, Self::Error> {
        let start = raw.start.ok_or_else(|| missing("Start"))?;
        let end = raw.end.ok_or_else(|| missing("End"))?;
        let station_id = raw.station_id.ok_or_else(|| missing("StationID"))?;
        let bike_less_than = raw.bike_less_than.ok_or_else(|| missing("BikeLessThan"))?;
        let dock_less_than = raw.dock_less_than.ok_or_else(|| missing("DockLessThan"))?;

        let station_id = match station_id {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(format!("Invalid option StationID: {}", other)),
        };

        Ok(Self {
            window: ActiveWindow::parse(&start, &end)?,
            bike_less_than: parse_threshold("BikeLessThan", &bike_less_than)?,
            dock_less_than: parse_threshold("DockLessThan", &dock_less_than)?,
            station_id,
        })
    }
}

fn missing(option: &str) -> String {
    format!("Invalid option {} in job: value is required", option)
}

/// Thresholds may be numbers or numeric strings; a blank string disables.
fn parse_threshold(option: &str, value: &Value) -> Result<u32, String> {
    let invalid = || format!("Invalid option {}: {} is not a non-negative integer", option, value);
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(invalid),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
