use super::StationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionKind {
    Bikes,
    Docks,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Bikes => "bikes",
            ConditionKind::Docks => "docks",
        }
    }

    pub fn all() -> &'static [ConditionKind] {
        &[ConditionKind::Bikes, ConditionKind::Docks]
    }

    /// Current count for this condition at `station`.
    pub fn count(&self, station: &StationRecord) -> u32 {
        match self {
            ConditionKind::Bikes => station.nb_bikes,
            ConditionKind::Docks => station.nb_empty_docks,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            ConditionKind::Bikes => "BikeShare Alert: Not enough Bikes",
            ConditionKind::Docks => "BikeShare Alert: Not enough Docks",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A threshold crossing ready to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: ConditionKind,
    pub station_id: String,
    pub station_name: String,
    pub count: u32,
    pub threshold: u32,
    pub last_update: String,
}

impl Alert {
    pub fn new(kind: ConditionKind, station: &StationRecord, threshold: u32) -> Self {
        Self {
            kind,
            station_id: station.terminal_name.clone(),
            station_name: station.name.clone(),
            count: kind.count(station),
            threshold,
            last_update: station.last_updated_display(),
        }
    }

    pub fn subject(&self) -> &'static str {
        self.kind.subject()
    }

    pub fn body(&self) -> String {
        format!(
            "Alert: The number of {} is {} now\n\
             Station Name: {}\n\
             Station ID: {}\n\
             Last Update Time: {}\n",
            self.kind, self.count, self.station_name, self.station_id, self.last_update
        )
    }
}
