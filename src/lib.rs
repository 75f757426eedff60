//! Toolkeeper backend library

pub mod clients;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod persistence;
pub mod routes;
pub mod services;

pub use config::schema::Settings;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, Startup, StartupError};
