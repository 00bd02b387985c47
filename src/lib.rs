pub mod access_log;
pub mod api;
pub mod config;
pub mod upstream;
