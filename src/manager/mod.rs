//! Scan manager for running scan sessions against an engine.
//!
//! The `ScanManager` creates the per-scan content handle and provider,
//! invokes the engine, and turns the engine's answer into a report or a
//! mechanism error.

mod scan_manager;

pub use scan_manager::{ScanManager, ScanManagerBuilder, ScanManagerConfig};
