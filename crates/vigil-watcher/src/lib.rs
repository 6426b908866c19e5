pub mod audio;
pub mod broadcast;
pub mod config;
pub mod poller;
pub mod tab;
pub mod telemetry;
