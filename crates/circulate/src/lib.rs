//! Application layer for the `circ` binary.
//!
//! This crate wires the core components (models, normalizer, ranker,
//! classifier, circulation rules) to concrete infrastructure: TOML
//! configuration, the JSON-file and SQLite store backends, schema
//! migrations, and one module per command verb.

pub mod catalog;
pub mod circulation;
pub mod config;
pub mod db;
pub mod json_store;
pub mod migrate;
pub mod review;
pub mod search;
pub mod sqlite_store;
pub mod store;
