// src/extract/mod.rs
// =============================================================================
// This module contains page extraction.
//
// Submodules:
// - html: content records and link discovery from HTML bodies
// =============================================================================

mod html;

pub use html::{normalize_url, ContentRecord, Extraction, Extractor, DEFAULT_CONTENT_MARKER};
