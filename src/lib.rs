//! Read-only JSON API over a local daily weather-observation dataset.
//!
//! The dataset (a station table and a measurement table) is loaded once with
//! [`DatasetLoader`] into a [`ClimateStore`], which answers the handful of fixed
//! queries behind the HTTP routes in [`server`].

mod dataset;
mod error;
pub mod server;
mod types;

pub use error::ClimateError;

pub use dataset::error::DatasetError;
pub use dataset::filtering::MeasurementFrameFilterExt;
pub use dataset::loader::DatasetLoader;
pub use dataset::store::{ClimateStore, TrailingYear};
pub use dataset::table::Table;

pub use types::date_window::{parse_iso_date, DateWindow, ISO_DATE_FORMAT, TRAILING_YEAR_DAYS};
pub use types::measurement::{Precipitation, TemperatureObservation};
pub use types::station::Station;
pub use types::temperature_stats::TemperatureStats;
