//! Route handlers. Each one runs a fixed store query and reshapes the result into
//! the route's JSON contract.

use crate::dataset::error::DatasetError;
use crate::dataset::store::ClimateStore;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::types::date_window::parse_iso_date;
use crate::types::measurement::TemperatureObservation;
use crate::types::station::Station;
use crate::types::temperature_stats::TemperatureStats;
use axum::extract::{Path, State};
use axum::response::{Html, Json};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task;

const HOME_HTML: &str = "Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/&lt;start&gt;<br/>\
/api/v1.0/&lt;start&gt;/&lt;end&gt;<br/>\
<br/>";

/// Precipitation keyed by ISO date; ISO strings sort chronologically.
type PrecipitationByDate = BTreeMap<String, Option<f64>>;

/// Runs a store query on the blocking pool; polars collects are CPU bound.
async fn run_query<T, F>(state: &Arc<AppState>, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ClimateStore) -> Result<T, DatasetError> + Send + 'static,
{
    let state = Arc::clone(state);
    let result = task::spawn_blocking(move || query(&state.store))
        .await
        .map_err(DatasetError::from)?;
    Ok(result?)
}

fn parse_date_param(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_iso_date(raw).ok_or_else(|| ApiError::InvalidDate(raw.to_string()))
}

/// GET / - list the available routes.
pub(crate) async fn home() -> Html<&'static str> {
    info!("Server received request for 'Home' page");
    Html(HOME_HTML)
}

/// GET /api/v1.0/precipitation
///
/// Maps every measurement date to its precipitation. When several stations report
/// the same date, the measurement loaded last wins.
pub(crate) async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationByDate>, ApiError> {
    info!("Server received request for 'precipitation' page");
    let rows = run_query(&state, |store| store.all_measurements()).await?;

    let mut by_date = PrecipitationByDate::new();
    for row in rows {
        by_date.insert(row.date.to_string(), row.prcp);
    }
    Ok(Json(by_date))
}

/// GET /api/v1.0/stations
pub(crate) async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Station>>, ApiError> {
    info!("Server received request for 'stations' page");
    let stations = run_query(&state, |store| store.all_stations()).await?;
    Ok(Json(stations))
}

/// GET /api/v1.0/tobs
///
/// `[date, tobs]` pairs of the most active station over the year ending at the
/// dataset's latest date. Empty when the dataset has no measurements.
pub(crate) async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, ApiError> {
    info!("Server received request for 'tobs' (temperature observation) page");
    let trailing = run_query(&state, |store| store.most_active_trailing_year()).await?;
    Ok(Json(
        trailing
            .map(|trailing| trailing.observations)
            .unwrap_or_default(),
    ))
}

/// GET /api/v1.0/:start
///
/// Stats over all stations, not just the most active one.
pub(crate) async fn stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<(String, Vec<TemperatureStats>)>, ApiError> {
    info!("Server received request for 'start' page ({})", start);
    let start_date = parse_date_param(&start)?;

    let stats = run_query(&state, move |store| {
        store.temperature_stats().start(start_date).call()
    })
    .await?;

    Ok(Json((format!("Start date:{start}"), vec![stats])))
}

/// GET /api/v1.0/:start/:end
///
/// Stats over all stations. `start` after `end` gives null stats, not an error.
pub(crate) async fn stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<(String, String, Vec<TemperatureStats>)>, ApiError> {
    info!("Server received request for 'start/end' page ({}, {})", start, end);
    let start_date = parse_date_param(&start)?;
    let end_date = parse_date_param(&end)?;

    let stats = run_query(&state, move |store| {
        store
            .temperature_stats()
            .start(start_date)
            .end(end_date)
            .call()
    })
    .await?;

    Ok(Json((
        format!("Start date:{start}"),
        format!("End date:{end}"),
        vec![stats],
    )))
}
