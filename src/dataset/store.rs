//! The in-memory climate dataset and the fixed set of queries the API runs against it.
//!
//! Both tables are loaded once (see [`crate::DatasetLoader`]) and never mutated. Every
//! query starts from a fresh `LazyFrame` over the shared data, so concurrent requests
//! need no coordination.

use crate::dataset::error::DatasetError;
use crate::dataset::filtering::MeasurementFrameFilterExt;
use crate::dataset::table::{DATE, NAME, PRCP, STATION, TOBS};
use crate::types::date_window::DateWindow;
use crate::types::measurement::{Precipitation, TemperatureObservation};
use crate::types::station::Station;
use crate::types::temperature_stats::TemperatureStats;
use bon::bon;
use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;

const COUNT: &str = "count";
const MIN_TEMP: &str = "min_temp";
const MAX_TEMP: &str = "max_temp";
const AVG_TEMP: &str = "avg_temp";

/// Temperature observations of the most active station over the trailing year of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingYear {
    /// Station with the most measurements.
    pub station: String,
    /// `[latest date - 365 days, latest date]`, where the latest date is taken over all stations.
    pub window: DateWindow,
    /// The station's observations inside `window`, in load order.
    pub observations: Vec<TemperatureObservation>,
}

/// Read-only handle over the station and measurement tables.
///
/// Cloning is cheap: polars frames share their column buffers.
#[derive(Debug, Clone)]
pub struct ClimateStore {
    stations: DataFrame,
    measurements: DataFrame,
}

#[bon]
impl ClimateStore {
    /// Wraps already-normalized frames. Use [`crate::DatasetLoader`] to read them from disk.
    pub(crate) fn new(stations: DataFrame, measurements: DataFrame) -> Self {
        Self {
            stations,
            measurements,
        }
    }

    pub fn stations(&self) -> &DataFrame {
        &self.stations
    }

    pub fn measurements(&self) -> &DataFrame {
        &self.measurements
    }

    fn measurement_frame(&self) -> LazyFrame {
        self.measurements.clone().lazy()
    }

    /// Every measurement's date and precipitation, in load order.
    pub fn all_measurements(&self) -> Result<Vec<Precipitation>, DatasetError> {
        let df = self
            .measurement_frame()
            .select([col(DATE), col(PRCP)])
            .collect()?;

        let dates = df.column(DATE)?.date()?;
        let prcp = df.column(PRCP)?.f64()?;

        Ok(dates
            .as_date_iter()
            .zip(prcp.into_iter())
            .filter_map(|(date, prcp)| date.map(|date| Precipitation { date, prcp }))
            .collect())
    }

    /// Every station, in load order.
    pub fn all_stations(&self) -> Result<Vec<Station>, DatasetError> {
        let ids = self.stations.column(STATION)?.str()?;
        let names = self.stations.column(NAME)?.str()?;

        Ok(ids
            .into_iter()
            .zip(names.into_iter())
            .filter_map(|(id, name)| {
                Some(Station {
                    station: id?.to_string(),
                    name: name.unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    /// The station with the highest number of measurements.
    ///
    /// Ties go to the lexicographically smallest station id. Returns `None` when
    /// there are no measurements.
    pub fn most_active_station(&self) -> Result<Option<String>, DatasetError> {
        let counts = self
            .measurement_frame()
            .group_by([col(STATION)])
            .agg([len().cast(DataType::Int64).alias(COUNT)])
            .collect()?;

        let ids = counts.column(STATION)?.str()?;
        let totals = counts.column(COUNT)?.i64()?;

        let mut best: Option<(&str, i64)> = None;
        for (id, total) in ids.into_iter().zip(totals.into_iter()) {
            let (Some(id), Some(total)) = (id, total) else {
                continue;
            };
            let replace = match best {
                None => true,
                Some((best_id, best_total)) => {
                    total > best_total || (total == best_total && id < best_id)
                }
            };
            if replace {
                best = Some((id, total));
            }
        }

        if let Some((id, total)) = best {
            debug!("Most active station is {} with {} measurements", id, total);
        }
        Ok(best.map(|(id, _)| id.to_string()))
    }

    /// The most recent measurement date across all stations.
    pub fn latest_date(&self) -> Result<Option<NaiveDate>, DatasetError> {
        let df = self
            .measurement_frame()
            .select([col(DATE).max()])
            .collect()?;
        let latest = df.column(DATE)?.date()?.as_date_iter().next().flatten();
        Ok(latest)
    }

    /// Min, max and mean temperature over measurements dated `start..=end`.
    ///
    /// `end` defaults to the end of the dataset and `station` to all stations.
    /// An empty selection is not an error: all fields of the result are `None`.
    ///
    /// ```no_run
    /// # use climate_api::{DatasetLoader, DatasetError};
    /// # use chrono::NaiveDate;
    /// # use std::path::Path;
    /// # fn main() -> Result<(), DatasetError> {
    /// let store = DatasetLoader::new(Path::new("resources")).load_blocking()?;
    /// let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
    /// let stats = store
    ///     .temperature_stats()
    ///     .start(start)
    ///     .station("USC00519281")
    ///     .call()?;
    /// println!("{:?}", stats);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn temperature_stats(
        &self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        station: Option<&str>,
    ) -> Result<TemperatureStats, DatasetError> {
        let mut frame = self.measurement_frame().filter_dates(start, end);
        if let Some(station) = station {
            frame = frame.filter_station(station);
        }

        let df = frame
            .select([
                col(TOBS).min().alias(MIN_TEMP),
                col(TOBS).max().alias(MAX_TEMP),
                col(TOBS).mean().alias(AVG_TEMP),
            ])
            .collect()?;

        Ok(TemperatureStats {
            min_temp: first_f64(&df, MIN_TEMP)?,
            max_temp: first_f64(&df, MAX_TEMP)?,
            avg_temp: first_f64(&df, AVG_TEMP)?,
        })
    }

    /// Raw `(date, tobs)` rows for one station inside `window`, in load order.
    pub fn temperature_observations(
        &self,
        station: &str,
        window: DateWindow,
    ) -> Result<Vec<TemperatureObservation>, DatasetError> {
        let df = self
            .measurement_frame()
            .filter_station(station)
            .filter_window(window)
            .select([col(DATE), col(TOBS)])
            .collect()?;

        let dates = df.column(DATE)?.date()?;
        let tobs = df.column(TOBS)?.f64()?;

        Ok(dates
            .as_date_iter()
            .zip(tobs.into_iter())
            .filter_map(|(date, tobs)| Some(TemperatureObservation(date?, tobs?)))
            .collect())
    }

    /// Observations of the most active station over the 365 days ending at the
    /// dataset's latest date. Returns `None` when there are no measurements.
    pub fn most_active_trailing_year(&self) -> Result<Option<TrailingYear>, DatasetError> {
        let Some(station) = self.most_active_station()? else {
            return Ok(None);
        };
        let Some(latest) = self.latest_date()? else {
            return Ok(None);
        };

        let window = DateWindow::trailing_year(latest);
        let observations = self.temperature_observations(&station, window)?;
        debug!(
            "{} observations for station {} in {}",
            observations.len(),
            station,
            window
        );

        Ok(Some(TrailingYear {
            station,
            window,
            observations,
        }))
    }
}

fn first_f64(df: &DataFrame, column: &str) -> Result<Option<f64>, DatasetError> {
    Ok(df.column(column)?.f64()?.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value, got None");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[tokio::test]
    async fn test_all_measurements_in_load_order() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let rows = store.all_measurements()?;

        assert_eq!(rows.len(), 8);
        assert_eq!(
            rows[0],
            Precipitation {
                date: date(2016, 8, 22),
                prcp: Some(0.4)
            }
        );
        // Missing precipitation stays missing.
        assert_eq!(
            rows[6],
            Precipitation {
                date: date(2017, 8, 22),
                prcp: None
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_all_stations() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let stations = store.all_stations()?;

        assert_eq!(stations.len(), 3);
        assert_eq!(
            stations[1],
            Station {
                station: "USC00519281".to_string(),
                name: "WAIHEE 837.5, HI US".to_string(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_most_active_station() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        assert_eq!(store.most_active_station()?.as_deref(), Some("USC00519281"));
        Ok(())
    }

    #[tokio::test]
    async fn test_most_active_station_tie_breaks_on_smallest_id(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(
            "station,name\nUSC002,Second\nUSC001,First\n",
            "station,date,prcp,tobs\n\
             USC002,2017-01-01,0.1,70.0\n\
             USC002,2017-01-02,0.1,71.0\n\
             USC001,2017-01-01,0.2,72.0\n\
             USC001,2017-01-02,0.2,73.0\n",
        )?;
        let store = crate::DatasetLoader::new(dir.path()).load().await?;
        assert_eq!(store.most_active_station()?.as_deref(), Some("USC001"));
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_date() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        assert_eq!(store.latest_date()?, Some(date(2017, 8, 23)));
        Ok(())
    }

    #[tokio::test]
    async fn test_temperature_stats_open_ended() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let stats = store.temperature_stats().start(date(2017, 8, 18)).call()?;

        // 79.0, 81.0, 76.0, 82.0 across three stations
        assert_eq!(stats.min_temp, Some(76.0));
        assert_eq!(stats.max_temp, Some(82.0));
        assert_close(stats.avg_temp, 79.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_temperature_stats_bounded() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let stats = store
            .temperature_stats()
            .start(date(2017, 1, 1))
            .end(date(2017, 8, 22))
            .call()?;

        // 62.0, 79.0, 76.0
        assert_eq!(stats.min_temp, Some(62.0));
        assert_eq!(stats.max_temp, Some(79.0));
        assert_close(stats.avg_temp, 217.0 / 3.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_temperature_stats_for_station() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let stats = store
            .temperature_stats()
            .start(date(2016, 1, 1))
            .station("USC00519397")
            .call()?;

        assert_eq!(stats.min_temp, Some(81.0));
        assert_eq!(stats.max_temp, Some(81.0));
        assert_close(stats.avg_temp, 81.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_temperature_stats_empty_selection() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;

        let after_dataset = store.temperature_stats().start(date(2018, 1, 1)).call()?;
        assert!(after_dataset.is_empty());

        let inverted = store
            .temperature_stats()
            .start(date(2017, 8, 23))
            .end(date(2017, 1, 1))
            .call()?;
        assert_eq!(inverted, TemperatureStats::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_most_active_trailing_year() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;
        let trailing = store
            .most_active_trailing_year()?
            .expect("dataset is not empty");

        assert_eq!(trailing.station, "USC00519281");
        assert_eq!(
            trailing.window,
            DateWindow::new(date(2016, 8, 23), date(2017, 8, 23))
        );
        // 2016-08-22 falls one day outside the window.
        assert_eq!(
            trailing.observations,
            vec![
                TemperatureObservation(date(2016, 8, 23), 77.0),
                TemperatureObservation(date(2017, 1, 10), 62.0),
                TemperatureObservation(date(2017, 8, 18), 79.0),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(fixtures::HAWAII_STATIONS, "station,date,prcp,tobs\n")?;
        let store = crate::DatasetLoader::new(dir.path()).load().await?;

        assert!(store.all_measurements()?.is_empty());
        assert_eq!(store.most_active_station()?, None);
        assert_eq!(store.latest_date()?, None);
        assert_eq!(store.most_active_trailing_year()?, None);
        assert!(store
            .temperature_stats()
            .start(date(2017, 1, 1))
            .call()?
            .is_empty());
        Ok(())
    }
}
