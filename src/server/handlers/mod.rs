//! HTTP request handlers for the web server.

mod api;

pub use api::{api_collector_data, api_hello, health};
