use super::alert_log::{AlertKey, AlertLog};
use super::station_lookup::find_station;
use crate::error::{BikeAlertError, Result};
use crate::models::{Alert, ConditionKind, Job, StationRecord};
use chrono::NaiveDateTime;

/// Decides which alerts a job raises against a station snapshot.
///
/// The evaluator only proposes alerts. The caller delivers them and marks
/// the corresponding [`AlertKey`] sent, so a failed delivery leaves the
/// condition pending for the next cycle.
#[derive(Debug, Default)]
pub struct AlertEvaluator;

/// An alert proposed by the evaluator, with the log key it will settle.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAlert {
    pub key: AlertKey,
    pub alert: Alert,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        job: &Job,
        stations: &[StationRecord],
        now: NaiveDateTime,
        log: &mut AlertLog,
    ) -> Result<Vec<PendingAlert>> {
        let station = find_station(stations, &job.station_id)
            .ok_or_else(|| BikeAlertError::UnknownStation(job.station_id.clone()))?;

        if !job.window.contains(now) {
            tracing::trace!(station = %job.station_id, window = %job.window, "outside active window");
            return Ok(Vec::new());
        }

        let pending = ConditionKind::all()
            .iter()
            .filter_map(|kind| self.check_condition(job, station, *kind, log))
            .collect();

        Ok(pending)
    }

    fn check_condition(
        &self,
        job: &Job,
        station: &StationRecord,
        kind: ConditionKind,
        log: &mut AlertLog,
    ) -> Option<PendingAlert> {
        let threshold = job.threshold(kind)?;
        let key = AlertKey::new(station.terminal_name.clone(), kind);

        if log.track(&key) {
            return None;
        }

        let count = kind.count(station);
        if count >= threshold {
            return None;
        }

        tracing::debug!(
            station = %station.terminal_name,
            condition = %kind,
            count,
            threshold,
            "threshold crossed"
        );

        Some(PendingAlert {
            key,
            alert: Alert::new(kind, station, threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveWindow;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeMap;

    fn station(code: &str, bikes: u32, docks: u32) -> StationRecord {
        let fields: BTreeMap<String, String> = [
            ("id", "7".to_string()),
            ("name", format!("Station {}", code)),
            ("terminalName", code.to_string()),
            ("nbBikes", bikes.to_string()),
            ("nbEmptyDocks", docks.to_string()),
            ("latestUpdateTime", "1400000000000".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        StationRecord::from_fields(fields).unwrap()
    }

    fn job(code: &str, start: &str, end: &str, bikes: u32, docks: u32) -> Job {
        Job {
            station_id: code.to_string(),
            window: ActiveWindow::parse(start, end).unwrap(),
            bike_less_than: bikes,
            dock_less_than: docks,
        }
    }

    fn at(day: u32, time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap())
    }

    #[test]
    fn bike_shortage_inside_window_alerts() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("31000", "00:00:00", "23:59:59", 5, 0);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 3, 10)], at(1, "08:00:00"), &mut log)
            .unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].key, AlertKey::new("31000", ConditionKind::Bikes));
        assert_eq!(pending[0].alert.count, 3);
        assert_eq!(pending[0].alert.threshold, 5);
        // Proposing does not mark the entry sent.
        assert!(!log.is_sent(&pending[0].key));
    }

    #[test]
    fn both_conditions_are_independent() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("31000", "00:00:00", "23:59:59", 5, 2);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 1, 1)], at(1, "12:00:00"), &mut log)
            .unwrap();
        let kinds: Vec<ConditionKind> = pending.iter().map(|p| p.key.kind).collect();
        assert_eq!(kinds, vec![ConditionKind::Bikes, ConditionKind::Docks]);

        log.mark_sent(pending[0].key.clone());
        let pending = evaluator
            .evaluate(&job, &[station("31000", 1, 1)], at(1, "12:01:00"), &mut log)
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].key.kind, ConditionKind::Docks);
    }

    #[test]
    fn outside_window_is_silent_and_leaves_log_untouched() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("31000", "07:00:00", "09:00:00", 5, 5);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 0, 0)], at(1, "18:00:00"), &mut log)
            .unwrap();

        assert!(pending.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn overnight_window_alerts_after_midnight() {
        let evaluator = AlertEvaluator::new();
        let job = job("31000", "22:00:00", "02:00:00", 5, 0);
        let stations = [station("31000", 0, 10)];

        let mut log = AlertLog::new();
        assert_eq!(
            evaluator
                .evaluate(&job, &stations, at(2, "01:00:00"), &mut log)
                .unwrap()
                .len(),
            1
        );

        let mut log = AlertLog::new();
        assert!(evaluator
            .evaluate(&job, &stations, at(2, "12:00:00"), &mut log)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn zero_threshold_never_alerts() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("31000", "00:00:00", "23:59:59", 0, 0);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 0, 0)], at(1, "10:00:00"), &mut log)
            .unwrap();

        assert!(pending.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn count_at_threshold_does_not_alert() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("31000", "00:00:00", "23:59:59", 5, 0);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 5, 0)], at(1, "10:00:00"), &mut log)
            .unwrap();

        assert!(pending.is_empty());
        // Entry exists but is unsent.
        assert!(log.contains(&AlertKey::new("31000", ConditionKind::Bikes)));
        assert_eq!(log.sent_count(), 0);
    }

    #[test]
    fn sent_condition_is_not_proposed_again() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        log.mark_sent(AlertKey::new("31000", ConditionKind::Bikes));
        let job = job("31000", "00:00:00", "23:59:59", 5, 0);

        let pending = evaluator
            .evaluate(&job, &[station("31000", 0, 0)], at(1, "10:00:00"), &mut log)
            .unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn unknown_station_is_an_error() {
        let evaluator = AlertEvaluator::new();
        let mut log = AlertLog::new();
        let job = job("99999", "00:00:00", "23:59:59", 5, 5);

        let err = evaluator
            .evaluate(&job, &[station("31000", 0, 0)], at(1, "10:00:00"), &mut log)
            .unwrap_err();
        assert!(matches!(err, BikeAlertError::UnknownStation(ref code) if code == "99999"));
    }
}
