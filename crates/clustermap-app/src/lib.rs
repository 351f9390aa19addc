//! ClusterMap Application
//!
//! Headless driver that runs one map session from a configuration file and
//! an event script, and reports the resulting state.

mod app;

pub use app::{App, AppError, Args, FrameSummary, Report};
