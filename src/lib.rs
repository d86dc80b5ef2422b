//! promgate - namespaced metrics gathering
//!
//! Exposes an application's runtime metrics for scraping while putting the
//! metric names of every upstream source under one namespace, and optionally
//! forwards the same metrics to Graphite on a fixed interval.
//!
//! # Features
//! - **process-metrics**: process memory/CPU collectors (default)
//!
//! # Architecture
//! - `metrics`: snapshot model, text exposition, gatherers and collectors
//! - `bridge`: Graphite push bridge
//! - `runtime`: service lifecycle, shutdown and registry selection
//! - `config`: configuration loading
//! - `system`: logging setup
//! - `cli`: command-line definitions

pub mod bridge;
pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod runtime;
pub mod system;
