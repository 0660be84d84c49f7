// Windowed dataset construction
pub mod dataset;

// Forecasting loop and request boundary
pub mod forecaster;
pub mod service;

// Model implementations
pub mod ml;

// Offline training
pub mod trainer;
