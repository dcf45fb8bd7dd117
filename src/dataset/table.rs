//! Defines the two tables of the climate dataset and their fixed schemas.

use std::fmt;

pub(crate) const STATION: &str = "station";
pub(crate) const NAME: &str = "name";
pub(crate) const DATE: &str = "date";
pub(crate) const PRCP: &str = "prcp";
pub(crate) const TOBS: &str = "tobs";

/// The tables the dataset directory must provide.
///
/// The schema is declared here rather than discovered from the files; any extra
/// columns in the source files are dropped at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per station: `station`, `name`.
    Stations,
    /// One row per daily reading: `station`, `date`, `prcp`, `tobs`.
    Measurements,
}

impl Table {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Table::Stations => "station",
            Table::Measurements => "measurement",
        }
    }

    /// File name without extension, looked up as `.parquet` first, then `.csv`.
    pub(crate) fn file_stem(&self) -> &'static str {
        match self {
            Table::Stations => "hawaii_stations",
            Table::Measurements => "hawaii_measurements",
        }
    }

    pub(crate) fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Stations => &[STATION, NAME],
            Table::Measurements => &[STATION, DATE, PRCP, TOBS],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
