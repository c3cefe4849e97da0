//! taskmaster - Single-User Task Tracking Library
//!
//! This library provides the core functionality for the taskmaster CLI:
//! a durable task store over one JSON blob, and a state controller that
//! mirrors it in memory with filters and aggregate statistics.
//!
//! # Core Concepts
//!
//! - **Task Store**: CRUD over the whole collection, newest first, seeded
//!   with sample tasks on first use
//! - **Blob Storage**: Key/value persistence behind a trait, file-backed by
//!   default
//! - **Controller**: Loading/error/filter state around store calls
//! - **Session**: The scope inside which a controller may be used
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `taskmaster.toml`
//! - `controller`: State controller, filters and stats views
//! - `error`: Error types and result aliases
//! - `filter`: Status/priority/search filters
//! - `format`: Display helpers for dates and labels
//! - `lock`: File locking and atomic writes
//! - `output`: JSON envelope and human output
//! - `session`: Controller scope
//! - `stats`: Aggregate counts
//! - `storage`: Blob storage backends
//! - `store`: The task store
//! - `task`: Task records, inputs and patches
//! - `validate`: Form-level field validation

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod format;
pub mod lock;
pub mod output;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod validate;

pub use error::{Error, Result};
