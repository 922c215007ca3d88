// src/sink/mod.rs
// =============================================================================
// This module stores scraped records and exports them.
//
// Submodules:
// - records: the in-memory RecordSink and its CSV/JSON export
// =============================================================================

mod records;

pub use records::{ExportFormat, ExportStatus, RecordSink};
