pub mod config;
pub mod peer;
pub mod server;
