use crate::dataset::table::{DATE, STATION};
use crate::types::date_window::DateWindow;
use chrono::NaiveDate;
use polars::prelude::{col, lit, Expr, LazyFrame};

pub trait MeasurementFrameFilterExt {
    /// Keeps measurements dated on or after `start` and, if given, on or before `end`.
    ///
    /// A `start` later than `end` yields an empty frame rather than an error.
    fn filter_dates(self, start: NaiveDate, end: Option<NaiveDate>) -> LazyFrame;

    /// Keeps measurements inside an inclusive [`DateWindow`].
    fn filter_window(self, window: DateWindow) -> LazyFrame;

    /// Keeps measurements recorded by a single station.
    fn filter_station(self, station: &str) -> LazyFrame;
}

fn date_predicate(start: NaiveDate, end: Option<NaiveDate>) -> Expr {
    let after_start = col(DATE).gt_eq(lit(start));
    match end {
        Some(end) => after_start.and(col(DATE).lt_eq(lit(end))),
        None => after_start,
    }
}

impl MeasurementFrameFilterExt for LazyFrame {
    fn filter_dates(self, start: NaiveDate, end: Option<NaiveDate>) -> LazyFrame {
        self.filter(date_predicate(start, end))
    }

    fn filter_window(self, window: DateWindow) -> LazyFrame {
        self.filter_dates(window.start, Some(window.end))
    }

    fn filter_station(self, station: &str) -> LazyFrame {
        self.filter(col(STATION).eq(lit(station)))
    }
}
