pub mod config;
pub mod dataset;
pub mod drift;
pub mod model;
pub mod output;
