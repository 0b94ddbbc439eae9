pub mod csv;
pub mod diagnostic_config;
pub mod error;
pub mod report;
