use serde::Serialize;

/// Minimum, maximum and mean temperature observation over a selection of measurements.
///
/// Every field is `None` (serialized as `null`) when the selection is empty, e.g. a
/// start date past the end of the dataset or a start date later than the end date.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TemperatureStats {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
}

impl TemperatureStats {
    /// True when no measurement matched the query.
    pub fn is_empty(&self) -> bool {
        self.min_temp.is_none() && self.max_temp.is_none() && self.avg_temp.is_none()
    }
}
