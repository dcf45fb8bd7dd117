pub mod date_window;
pub mod measurement;
pub mod station;
pub mod temperature_stats;
