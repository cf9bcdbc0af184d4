//! # Export Module
//!
//! Turns playlists into a CSV table of audio features.
//!
//! - [`pipeline`] - Walks playlists, tracks and features in API order and
//!   skips whatever the API refuses to deliver
//! - [`sink`] - Row destinations; rows are flushed one by one so an aborted
//!   run keeps everything written so far

pub mod pipeline;
pub mod sink;

pub use pipeline::{AggregationPipeline, PlaylistOutcome, PlaylistReport, RunReport, RunSource};
pub use sink::{CsvFileSink, CsvSink, RowSink};
