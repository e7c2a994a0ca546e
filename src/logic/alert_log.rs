use crate::models::ConditionKind;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    pub station_id: String,
    pub kind: ConditionKind,
}

impl AlertKey {
    pub fn new(station_id: impl Into<String>, kind: ConditionKind) -> Self {
        Self {
            station_id: station_id.into(),
            kind,
        }
    }
}

impl std::fmt::Display for AlertKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.station_id, self.kind)
    }
}

/// Record of which (station, condition) alerts have gone out.
///
/// Sticky: once an entry is marked sent it stays sent for the life of the
/// log. Nothing un-marks an entry, so a condition that clears and comes back
/// does not alert again until the process restarts.
#[derive(Debug, Default)]
pub struct AlertLog {
    entries: HashMap<AlertKey, bool>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` if it has not been seen yet and report whether its
    /// alert has already been sent.
    pub fn track(&mut self, key: &AlertKey) -> bool {
        *self.entries.entry(key.clone()).or_insert(false)
    }

    #[cfg(test)]
    pub fn is_sent(&self, key: &AlertKey) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn contains(&self, key: &AlertKey) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mark_sent(&mut self, key: AlertKey) {
        self.entries.insert(key, true);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn sent_count(&self) -> usize {
        self.entries.values().filter(|sent| **sent).count()
    }
}
