use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of consecutive prices fed to a model.
pub const WINDOW_SIZE: usize = 60;

/// Number of future periods produced per forecast.
pub const HORIZON: usize = 60;

/// One closing price observed on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Price history of a single instrument, ascending by date with at most one point per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub instrument: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from unordered points. Later points for an already seen date are dropped.
    pub fn new(instrument: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // stable sort keeps the first point of each date in front
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self {
            instrument: instrument.into(),
            points,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// A labelled price in a forecast: `Day 0` is the last actual close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "date")]
    pub label: String,
    #[serde(rename = "predictedPrice")]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub instrument: String,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Prepends the last known price to the predicted path and labels every step.
    pub fn new(instrument: impl Into<String>, last_known: f64, predicted: Vec<f64>) -> Self {
        let points = std::iter::once(last_known)
            .chain(predicted)
            .enumerate()
            .map(|(day, price)| ForecastPoint {
                label: format!("Day {}", day),
                price,
            })
            .collect();

        Self {
            instrument: instrument.into(),
            points,
        }
    }

    pub fn last_known(&self) -> Option<f64> {
        self.points.first().map(|p| p.price)
    }

    pub fn predicted(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().skip(1).map(|p| p.price)
    }
}

/// Bookkeeping recorded next to a trained artifact pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMeta {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
}

impl TrainingMeta {
    pub fn new(run_id: Uuid, samples: usize) -> Self {
        Self {
            run_id,
            trained_at: Utc::now(),
            samples,
        }
    }
}
