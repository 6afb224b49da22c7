pub mod config;
pub mod error;
pub mod guarantor;
pub mod telemetry;
