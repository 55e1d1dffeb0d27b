pub mod db;
pub mod notifier;
pub mod telemetry;
