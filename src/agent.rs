pub mod base;
pub mod client;
pub mod config;
