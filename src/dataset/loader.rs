use crate::dataset::error::DatasetError;
use crate::dataset::store::ClimateStore;
use crate::dataset::table::{Table, DATE, NAME, PRCP, STATION, TOBS};
use crate::types::date_window::ISO_DATE_FORMAT;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads the station and measurement tables from a dataset directory.
///
/// Each table is looked up as `<stem>.parquet` first and `<stem>.csv` (with a header
/// row) second. Columns are selected and cast to the fixed schema declared by
/// [`Table`], so the resulting [`ClimateStore`] never sees source-specific types.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    dir: PathBuf,
}

impl DatasetLoader {
    pub fn new(dir: &Path) -> DatasetLoader {
        DatasetLoader {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads both tables on the blocking pool.
    pub async fn load(&self) -> Result<ClimateStore, DatasetError> {
        let loader = self.clone();
        task::spawn_blocking(move || loader.load_blocking()).await?
    }

    /// Loads both tables on the current thread.
    pub fn load_blocking(&self) -> Result<ClimateStore, DatasetError> {
        let stations = normalize_stations(self.read_table(Table::Stations)?)?;
        let measurements = normalize_measurements(self.read_table(Table::Measurements)?)?;
        info!(
            "Loaded {} stations and {} measurements from {:?}",
            stations.height(),
            measurements.height(),
            self.dir
        );
        Ok(ClimateStore::new(stations, measurements))
    }

    fn read_table(&self, table: Table) -> Result<DataFrame, DatasetError> {
        let stem = table.file_stem();

        let parquet_path = self.dir.join(format!("{stem}.parquet"));
        if parquet_path.is_file() {
            debug!("Reading {} table from {:?}", table, parquet_path);
            let df = LazyFrame::scan_parquet(&parquet_path, Default::default())
                .and_then(|frame| frame.collect())
                .map_err(|e| DatasetError::ParquetScan(parquet_path.clone(), e))?;
            return require_columns(df, table);
        }

        let csv_path = self.dir.join(format!("{stem}.csv"));
        if csv_path.is_file() {
            debug!("Reading {} table from {:?}", table, csv_path);
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(csv_path.clone()))
                .and_then(|reader| reader.finish())
                .map_err(|e| DatasetError::CsvRead(csv_path.clone(), e))?;
            return require_columns(df, table);
        }

        Err(DatasetError::MissingFile {
            table,
            stem,
            dir: self.dir.clone(),
        })
    }
}

fn require_columns(df: DataFrame, table: Table) -> Result<DataFrame, DatasetError> {
    for &column in table.required_columns() {
        if df.column(column).is_err() {
            return Err(DatasetError::MissingColumn { table, column });
        }
    }
    Ok(df)
}

fn normalize_stations(df: DataFrame) -> Result<DataFrame, DatasetError> {
    df.lazy()
        .select([
            col(STATION).cast(DataType::String),
            col(NAME).cast(DataType::String),
        ])
        .collect()
        .map_err(|source| DatasetError::Normalize {
            table: Table::Stations,
            source,
        })
}

fn normalize_measurements(df: DataFrame) -> Result<DataFrame, DatasetError> {
    let table = Table::Measurements;
    let date_options = StrptimeOptions {
        format: Some(ISO_DATE_FORMAT.into()),
        strict: false,
        exact: true,
        cache: true,
    };

    let date = match df.column(DATE)?.dtype() {
        // Parquet timestamps keep their calendar day.
        DataType::Datetime(_, _) => col(DATE).cast(DataType::Date),
        // Round-trip through String so parquet Date columns and CSV text parse alike.
        _ => col(DATE)
            .cast(DataType::String)
            .str()
            .to_date(date_options),
    };

    let df = df
        .lazy()
        .select([
            col(STATION).cast(DataType::String),
            date,
            col(PRCP).cast(DataType::Float64),
            col(TOBS).cast(DataType::Float64),
        ])
        .collect()
        .map_err(|source| DatasetError::Normalize { table, source })?;

    // Non-strict parsing turns malformed dates into nulls, count them here.
    let count = df.column(DATE)?.null_count();
    if count > 0 {
        return Err(DatasetError::InvalidDates { table, count });
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures;
    use polars::prelude::{DataType, ParquetWriter, TimeUnit};

    #[tokio::test]
    async fn test_load_csv_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, store) = fixtures::hawaii_store().await?;

        assert_eq!(store.stations().height(), 3);
        assert_eq!(store.measurements().height(), 8);
        assert_eq!(store.measurements().column(DATE)?.dtype(), &DataType::Date);
        assert_eq!(store.measurements().column(PRCP)?.dtype(), &DataType::Float64);
        assert_eq!(store.measurements().column(TOBS)?.dtype(), &DataType::Float64);
        // Extra source columns (latitude, longitude, elevation) are dropped.
        assert_eq!(store.stations().width(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_integer_tobs_are_widened() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(
            fixtures::HAWAII_STATIONS,
            "station,date,prcp,tobs\nUSC00519281,2017-08-20,0.5,75\n",
        )?;
        let store = DatasetLoader::new(dir.path()).load().await?;
        let tobs = store.measurements().column(TOBS)?.f64()?;
        assert_eq!(tobs.get(0), Some(75.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let result = DatasetLoader::new(dir.path()).load().await;
        assert!(matches!(
            result,
            Err(DatasetError::MissingFile {
                table: Table::Stations,
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_column() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(
            fixtures::HAWAII_STATIONS,
            "station,date,tobs\nUSC00519281,2017-08-20,75.0\n",
        )?;
        let result = DatasetLoader::new(dir.path()).load().await;
        assert!(matches!(
            result,
            Err(DatasetError::MissingColumn {
                table: Table::Measurements,
                column: "prcp",
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_dataset_date() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(
            fixtures::HAWAII_STATIONS,
            "station,date,prcp,tobs\n\
             USC00519281,2017-08-20,0.5,75.0\n\
             USC00519281,2017-13-45,0.1,74.0\n",
        )?;
        let result = DatasetLoader::new(dir.path()).load().await;
        assert!(matches!(
            result,
            Err(DatasetError::InvalidDates { count: 1, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_parquet_preferred_over_csv() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(fixtures::HAWAII_STATIONS, fixtures::HAWAII_MEASUREMENTS)?;

        // A parquet copy holding only the first station wins over the CSV file.
        let mut subset = DatasetLoader::new(dir.path())
            .load()
            .await?
            .stations()
            .head(Some(1));
        let file = std::fs::File::create(dir.path().join("hawaii_stations.parquet"))?;
        ParquetWriter::new(file).finish(&mut subset)?;

        let store = DatasetLoader::new(dir.path()).load().await?;
        assert_eq!(store.stations().height(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_parquet_datetime_dates() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixtures::write_dataset(fixtures::HAWAII_STATIONS, fixtures::HAWAII_MEASUREMENTS)?;
        let csv_store = DatasetLoader::new(dir.path()).load().await?;

        let mut timestamped = csv_store
            .measurements()
            .clone()
            .lazy()
            .with_column(col(DATE).cast(DataType::Datetime(TimeUnit::Milliseconds, None)))
            .collect()?;
        let file = std::fs::File::create(dir.path().join("hawaii_measurements.parquet"))?;
        ParquetWriter::new(file).finish(&mut timestamped)?;

        let store = DatasetLoader::new(dir.path()).load().await?;
        assert_eq!(store.measurements().column(DATE)?.dtype(), &DataType::Date);
        assert_eq!(store.all_measurements()?, csv_store.all_measurements()?);
        Ok(())
    }
}
