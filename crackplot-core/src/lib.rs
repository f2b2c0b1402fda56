//! # crackplot-core
//!
//! Core library for crackplot - a live chart of password-cracking progress.
//!
//! This library provides:
//! - A decoder for hashcat `--status-json` records
//! - Incremental, fragment-tolerant tailing of growing status files
//! - Merged, downsampled chart datasets for rendering
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows one way:
//! - **Ingest:** [`TailCoordinator`] polls each status file for appended
//!   bytes and folds decoded records into a per-file [`FileSeries`]
//! - **Project:** [`TailCoordinator::dataset`] merges the series under the
//!   current axis modes into a bounded [`dataset::MergedDataset`]
//! - **Render:** UIs draw the dataset; display toggles re-project without
//!   touching ingest state
//!
//! ## Example
//!
//! ```rust,no_run
//! use crackplot_core::{discover_inputs, Config, DisplayOptions, TailCoordinator};
//!
//! let config = Config::load().expect("failed to load config");
//! let paths = discover_inputs(&["cracking/*.json".to_string()]).expect("bad pattern");
//!
//! let mut coordinator = TailCoordinator::open(&paths, &config).expect("no readable input");
//! coordinator.refresh();
//! let dataset = coordinator.dataset(&DisplayOptions::default());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use dataset::{MergedDataset, MergedSeries};
pub use error::{Error, Result};
pub use ingest::{discover_inputs, RefreshOutcome, TailCoordinator};
pub use types::*;

// Public modules
pub mod config;
pub mod dataset;
pub mod downsample;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
