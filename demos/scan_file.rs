//! Scans a file on disk with the mock engine.
//!
//! This example shows how to:
//! - Open a file as a content source
//! - Build a ScanManager around an engine
//! - Tell a failed scan apart from a verdict
//!
//! Run with: cargo run --example scan_file -- <path>

use scanstream::backends::MockEngine;
use scanstream::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: scan_file <path>")?;

    let engine = MockEngine::new().with_signature(b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR");
    let manager = ScanManager::builder()
        .with_engine(engine)
        .with_config(ScanManagerConfig::new().with_app_name("scan_file"))
        .build()?;

    let source = FileSource::open(&path)?;
    let context = ScanContext::new().with_source("cli");

    match manager.scan(path.clone(), source, context) {
        Ok(report) => {
            println!("{}: {}", report.content_name, report.verdict);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Err(e) => {
            eprintln!("{}: {}", path, e.user_message());
            std::process::exit(2);
        }
    }

    Ok(())
}
