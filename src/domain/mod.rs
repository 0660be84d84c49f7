// Domain-specific error types
pub mod errors;

// Port interfaces (models, price history)
pub mod ports;

// Repository traits
pub mod repositories;

// Min-max normalization
pub mod scaler;

// Core value types and constants
pub mod types;

// Windowed training examples
pub mod window;
