//! Defines the weather station record served by the stations endpoint.

use serde::Serialize;

/// A single weather-observation site.
///
/// Serializes to the `{"station": ..., "name": ...}` shape returned by
/// `/api/v1.0/stations`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Station {
    /// The unique station identifier (e.g., "USC00519281").
    pub station: String,
    /// Human readable station name (e.g., "WAIHEE 837.5, HI US").
    pub name: String,
}
