//! Synthetic sea-surface-temperature pipeline.
//!
//! `generate_sst` writes a random (time, lat, lon) field to NetCDF;
//! `analyze_sst` reads it back chunk by chunk, subsets a region, computes
//! monthly and yearly means and renders them to PNG.

pub mod analyzer;
pub mod bbox;
pub mod cf_time;
pub mod chunks;
pub mod config;
pub mod date_gen;
pub mod generator;
pub mod grid;
pub mod lazy;
pub mod logging;
pub mod plot;
pub mod readers;
pub mod select;
pub mod utils;
pub mod writers;
