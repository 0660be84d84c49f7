pub mod forest_model;

pub use forest_model::{ForestModel, ForestParams};
