//! Sizing advisor service: HTTP API over the advisor library

pub mod api;
pub mod config;
