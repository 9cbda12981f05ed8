pub mod aggregate;
pub mod charts;
pub mod config;
pub mod correlation;
pub mod dataset;
pub mod export;
pub mod geo;
pub mod report;
pub mod state;
