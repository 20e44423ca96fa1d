// Serving Gateway - Library root for testing

pub mod config;
pub mod error;
pub mod http_client;
pub mod load_test;
pub mod middleware;
pub mod models;
pub mod routes;
