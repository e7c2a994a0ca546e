/// Result of resolving a free-text address. Both members are `None` when
/// the geocoder found no match.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn is_resolved(&self) -> bool {
        self.as_pair().is_some()
    }
}
