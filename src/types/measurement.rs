use chrono::NaiveDate;
use serde::Serialize;

/// One day's precipitation reading, as returned by [`crate::ClimateStore::all_measurements`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Precipitation {
    pub date: NaiveDate,
    /// Missing readings are kept as `None` and serialize to `null`.
    pub prcp: Option<f64>,
}

/// One day's temperature observation ("tobs") at a station.
///
/// Serializes as a `[date, tobs]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureObservation(pub NaiveDate, pub f64);
