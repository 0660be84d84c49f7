mod common;

use common::{Workspace, fast_params, ramp};
use eodcast::application::forecaster::Forecaster;
use eodcast::application::ml::ForestModel;
use eodcast::application::service::{
    ForecastService, ResponseBody, STATUS_ERROR, STATUS_NOT_FOUND, STATUS_OK,
};
use eodcast::application::trainer::Trainer;
use eodcast::domain::errors::ForecastError;
use eodcast::domain::types::{HORIZON, WINDOW_SIZE};
use eodcast::infrastructure::{FileArtifactStore, RecentWindowCache, SnapshotDirectory};
use std::fs;

/// 70 days of ABC rising 1.00 -> 1.69, FLAT pinned at 2.5, SHORT only on the last 10 days.
fn seeded_workspace() -> Workspace {
    let ws = Workspace::new("forecast");
    let prices = ramp(70);
    let days: Vec<Vec<(&str, f64)>> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut rows = vec![("ABC", *p), ("FLAT", 2.5)];
            if i >= 60 {
                rows.push(("SHORT", 3.0 + i as f64 / 100.0));
            }
            rows
        })
        .collect();
    ws.write_days(&days);
    ws
}

fn train(ws: &Workspace, instruments: &[&str]) -> FileArtifactStore<ForestModel> {
    let snapshots = SnapshotDirectory::new(&ws.snapshots);
    let store = FileArtifactStore::<ForestModel>::new(&ws.models);
    let report = Trainer::new(&snapshots, &store, fast_params()).train_all(instruments);
    assert_eq!(report.trained.len(), instruments.len(), "{:?}", report);
    store
}

fn predictions(body: &ResponseBody) -> &[eodcast::domain::types::ForecastPoint] {
    match body {
        ResponseBody::Predictions { predictions } => predictions,
        ResponseBody::Error { error } => panic!("expected predictions, got error {}", error),
    }
}

fn error_message(body: &ResponseBody) -> &str {
    match body {
        ResponseBody::Error { error } => error,
        ResponseBody::Predictions { .. } => panic!("expected an error body"),
    }
}

#[test]
fn test_rising_instrument_forecast_shape() {
    let ws = seeded_workspace();
    let store = train(&ws, &["ABC"]);
    let snapshots = SnapshotDirectory::new(&ws.snapshots);

    let response = ForecastService::new(&snapshots, &store).handle("ABC");
    assert_eq!(response.status, STATUS_OK);

    let points = predictions(&response.body);
    assert_eq!(points.len(), HORIZON + 1);
    assert_eq!(points[0].price.to_bits(), 1.69f64.to_bits());
    for (day, point) in points.iter().enumerate() {
        assert_eq!(point.label, format!("Day {}", day));
        assert!(point.price.is_finite(), "Day {} is {}", day, point.price);
    }
}

#[test]
fn test_forecast_is_repeatable() {
    let ws = seeded_workspace();
    let store = train(&ws, &["ABC"]);
    let snapshots = SnapshotDirectory::new(&ws.snapshots);
    let forecaster = Forecaster::new(&snapshots, &store);

    let first = forecaster.forecast("ABC").unwrap();
    let second = forecaster.forecast("ABC").unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_model_is_not_found() {
    let ws = seeded_workspace();
    let store = FileArtifactStore::<ForestModel>::new(&ws.models);
    let snapshots = SnapshotDirectory::new(&ws.snapshots);

    let response = ForecastService::new(&snapshots, &store).handle("ABC");

    assert_eq!(response.status, STATUS_NOT_FOUND);
    assert!(error_message(&response.body).contains("No model or scaler found"));
}

#[test]
fn test_ten_days_of_history_is_insufficient() {
    let ws = seeded_workspace();
    let store = train(&ws, &["ABC"]);
    // reuse ABC's pair so SHORT has artifacts but only 10 days of prices
    fs::copy(store.model_path("ABC"), store.model_path("SHORT")).unwrap();
    fs::copy(store.scaler_path("ABC"), store.scaler_path("SHORT")).unwrap();
    let snapshots = SnapshotDirectory::new(&ws.snapshots);

    match Forecaster::new(&snapshots, &store).forecast("SHORT") {
        Err(ForecastError::InsufficientData {
            required,
            available,
            ..
        }) => {
            assert_eq!(required, WINDOW_SIZE);
            assert_eq!(available, 10);
        }
        other => panic!("expected insufficient data, got {:?}", other),
    }

    let response = ForecastService::new(&snapshots, &store).handle("SHORT");
    assert_eq!(response.status, STATUS_NOT_FOUND);
    assert!(error_message(&response.body).contains("Not enough data"));
}

#[test]
fn test_constant_instrument_forecasts_flat_line() {
    let ws = seeded_workspace();
    let store = train(&ws, &["FLAT"]);
    let snapshots = SnapshotDirectory::new(&ws.snapshots);

    let forecast = Forecaster::new(&snapshots, &store).forecast("FLAT").unwrap();

    assert_eq!(forecast.points.len(), HORIZON + 1);
    assert!(forecast.points.iter().all(|p| p.price == 2.5));
}

#[test]
fn test_tampered_model_is_a_processing_error() {
    let ws = seeded_workspace();
    let store = train(&ws, &["ABC"]);
    fs::write(store.model_path("ABC"), b"{\"trees\":[]}").unwrap();
    let snapshots = SnapshotDirectory::new(&ws.snapshots);

    let response = ForecastService::new(&snapshots, &store).handle("ABC");

    assert_eq!(response.status, STATUS_ERROR);
    let message = error_message(&response.body);
    assert!(message.contains("ABC"));
    assert!(message.contains("does not match"));
}

#[test]
fn test_cached_history_serves_same_forecast() {
    let ws = seeded_workspace();
    let store = train(&ws, &["ABC"]);
    let snapshots = SnapshotDirectory::new(&ws.snapshots);
    let cache = RecentWindowCache::new(SnapshotDirectory::new(&ws.snapshots));

    let direct = Forecaster::new(&snapshots, &store).forecast("ABC").unwrap();
    let cached = Forecaster::new(&cache, &store);
    let first = cached.forecast("ABC").unwrap();
    let second = cached.forecast("ABC").unwrap();

    assert_eq!(direct, first);
    assert_eq!(first, second);
    assert_eq!(cache.stats(), (1, 1));
}
