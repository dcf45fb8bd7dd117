use chrono::{Days, NaiveDate};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Date format used by the dataset and by the date path parameters.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the trailing window served by `/api/v1.0/tobs`.
pub const TRAILING_YEAR_DAYS: u64 = 365;

/// An inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The 365 days ending at `end`, both ends included.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use climate_api::DateWindow;
    ///
    /// let latest = NaiveDate::from_ymd_opt(2017, 8, 23).unwrap();
    /// let window = DateWindow::trailing_year(latest);
    /// assert_eq!(window.start, NaiveDate::from_ymd_opt(2016, 8, 23).unwrap());
    /// assert_eq!(window.end, latest);
    /// ```
    pub fn trailing_year(end: NaiveDate) -> Self {
        let start = end
            .checked_sub_days(Days::new(TRAILING_YEAR_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Parses a strict `YYYY-MM-DD` date, returning `None` for anything else.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    // chrono also accepts signs, padding spaces and single digit fields.
    if !is_iso_date_shape(raw.as_bytes()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).ok()
}

fn is_iso_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
