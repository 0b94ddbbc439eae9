pub mod diagnostic_reporter;
