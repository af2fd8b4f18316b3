//! slowtask - minimal HTTP service with Prometheus request instrumentation
//!
//! Serves a greeting, a simulated slow and sometimes failing task, and a
//! `/metrics` scrape endpoint. Every request is counted and timed by method,
//! route and status code.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod tasks;
pub mod telemetry;
