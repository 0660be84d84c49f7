use crate::application::forecaster::Forecaster;
use crate::domain::errors::ForecastError;
use crate::domain::ports::PriceHistory;
use crate::domain::repositories::ArtifactStore;
use crate::domain::types::ForecastPoint;
use serde::Serialize;
use tracing::{error, info, warn};

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_ERROR: u16 = 500;

/// JSON body handed to whatever transport serves forecasts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Predictions { predictions: Vec<ForecastPoint> },
    Error { error: String },
}

/// HTTP-style status plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ForecastResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    fn failure(status: u16, message: String) -> Self {
        Self {
            status,
            body: ResponseBody::Error { error: message },
        }
    }
}

/// Outermost boundary of a forecast request: every failure becomes a response.
pub struct ForecastService<'a, H: PriceHistory, S: ArtifactStore> {
    forecaster: Forecaster<'a, H, S>,
}

impl<'a, H: PriceHistory, S: ArtifactStore> ForecastService<'a, H, S> {
    pub fn new(history: &'a H, store: &'a S) -> Self {
        Self {
            forecaster: Forecaster::new(history, store),
        }
    }

    pub fn handle(&self, instrument: &str) -> ForecastResponse {
        match self.forecaster.forecast(instrument) {
            Ok(forecast) => {
                info!(
                    "Forecast served for {} ({} points)",
                    instrument,
                    forecast.points.len()
                );
                ForecastResponse {
                    status: STATUS_OK,
                    body: ResponseBody::Predictions {
                        predictions: forecast.points,
                    },
                }
            }
            Err(e) if e.is_not_found() => {
                warn!("{}", e);
                ForecastResponse::failure(STATUS_NOT_FOUND, e.to_string())
            }
            Err(e) => {
                error!("Error processing instrument {}: {}", instrument, e);
                let message = match e {
                    ForecastError::Processing { .. } => e.to_string(),
                    other => format!(
                        "An error occurred while processing instrument {}: {}",
                        instrument, other
                    ),
                };
                ForecastResponse::failure(STATUS_ERROR, message)
            }
        }
    }
}
