//! AdStream Finder: classify websites by streaming video and ad-network
//! presence.
//!
//! A [`collector::Collector`] visits each domain in a shared headless browser
//! session, records every network request, and runs the streaming and ad
//! classifiers. Results are stored as CSV by [`storage`] and served over HTTP
//! by [`server`].

pub mod browser;
pub mod collector;
pub mod config;
pub mod models;
pub mod server;
pub mod storage;
